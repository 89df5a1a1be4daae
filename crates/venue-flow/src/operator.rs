//! The human (or script) answering at the decision gate.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use crate::error::GateResult;

#[async_trait]
pub trait Operator: Send {
    /// Show the current ranking and the menu.
    async fn present(&mut self, ranking: &str, menu: &str) -> GateResult<()>;

    /// Next menu answer; `None` when input is exhausted.
    async fn read_choice(&mut self) -> GateResult<Option<String>>;

    /// Free-text feedback for a redo; `None` when input is exhausted.
    async fn read_feedback(&mut self) -> GateResult<Option<String>>;

    /// Tell the operator their last answer was rejected.
    async fn notify(&mut self, message: &str) -> GateResult<()>;
}

/// Interactive operator on stdin/stdout.
pub struct ConsoleOperator {
    lines: Lines<BufReader<Stdin>>,
}

impl ConsoleOperator {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn print(&self, text: &str) -> GateResult<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(text.as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }
}

impl Default for ConsoleOperator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Operator for ConsoleOperator {
    async fn present(&mut self, ranking: &str, menu: &str) -> GateResult<()> {
        self.print(&format!("\n{ranking}\n{menu}\n> ")).await
    }

    async fn read_choice(&mut self) -> GateResult<Option<String>> {
        Ok(self.lines.next_line().await?)
    }

    async fn read_feedback(&mut self) -> GateResult<Option<String>> {
        self.print("Feedback for the scoring agent: ").await?;
        Ok(self.lines.next_line().await?)
    }

    async fn notify(&mut self, message: &str) -> GateResult<()> {
        self.print(&format!("{message}\n")).await
    }
}

/// Operator fed from fixed answer lists. Records what it was shown.
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    choices: VecDeque<String>,
    feedback: VecDeque<String>,
    presented: Vec<String>,
    notices: Vec<String>,
}

impl ScriptedOperator {
    pub fn new<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_feedback<I, S>(mut self, feedback: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feedback = feedback.into_iter().map(Into::into).collect();
        self
    }

    /// How many times the gate was shown.
    pub fn presentations(&self) -> usize {
        self.presented.len()
    }

    /// Rankings shown, in order.
    pub fn presented(&self) -> &[String] {
        &self.presented
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }
}

#[async_trait]
impl Operator for ScriptedOperator {
    async fn present(&mut self, ranking: &str, _menu: &str) -> GateResult<()> {
        self.presented.push(ranking.to_string());
        Ok(())
    }

    async fn read_choice(&mut self) -> GateResult<Option<String>> {
        Ok(self.choices.pop_front())
    }

    async fn read_feedback(&mut self) -> GateResult<Option<String>> {
        Ok(self.feedback.pop_front())
    }

    async fn notify(&mut self, message: &str) -> GateResult<()> {
        self.notices.push(message.to_string());
        Ok(())
    }
}
