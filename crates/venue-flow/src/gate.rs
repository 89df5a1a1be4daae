//! Human decision gate between scoring and drafting.
//!
//! ```text
//! awaiting-choice ──1──▶ quit (terminal)
//!        │ ──2──▶ redo scoring with feedback ──▶ awaiting-choice
//!        └ ──3──▶ proceed to drafting
//! ```
//!
//! A run paused at the gate is captured in a [`DecisionCheckpoint`] so the
//! decision can arrive from another process.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;
use venue_core::{PipelineState, PipelineStep, ScoredVenue};

use crate::artifacts::write_json;
use crate::error::{FlowError, GateError, GateResult, Result};
use crate::operator::Operator;

pub const MENU: &str = "\
What would you like to do?
  1. Quit
  2. Redo scoring with feedback
  3. Proceed to email drafting";

/// Menu selection, before any feedback is collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    Quit,
    Redo,
    Proceed,
}

impl Choice {
    pub fn name(&self) -> &'static str {
        match self {
            Choice::Quit => "quit",
            Choice::Redo => "redo",
            Choice::Proceed => "proceed",
        }
    }
}

/// Operator decision at the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "choice", rename_all = "snake_case")]
pub enum Decision {
    Quit,
    Redo { feedback: String },
    Proceed,
}

impl Decision {
    /// Combine a menu choice with feedback. Feedback only matters for redo.
    pub fn from_choice(choice: Choice, feedback: Option<String>) -> Self {
        match choice {
            Choice::Quit => Decision::Quit,
            Choice::Redo => Decision::Redo {
                feedback: feedback.unwrap_or_default(),
            },
            Choice::Proceed => Decision::Proceed,
        }
    }

    pub fn choice(&self) -> Choice {
        match self {
            Decision::Quit => Choice::Quit,
            Decision::Redo { .. } => Choice::Redo,
            Decision::Proceed => Choice::Proceed,
        }
    }
}

/// Accepts `1`/`quit`/`q`, `2`/`redo`/`r`, `3`/`proceed`/`p`,
/// case-insensitively.
pub fn parse_choice(raw: &str) -> GateResult<Choice> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "quit" | "q" => Ok(Choice::Quit),
        "2" | "redo" | "r" => Ok(Choice::Redo),
        "3" | "proceed" | "p" => Ok(Choice::Proceed),
        _ => Err(GateError::InvalidChoice {
            input: raw.trim().to_string(),
        }),
    }
}

/// Plain-text ranking table.
pub fn render_ranking(ranked: &[ScoredVenue]) -> String {
    if ranked.is_empty() {
        return "No venues were scored.\n".to_string();
    }
    let mut out = String::from("Ranked venues:\n");
    for (i, venue) in ranked.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {} ({:.1} km) score {:.1}",
            i + 1,
            venue.name(),
            venue.venue.distance_km,
            venue.score
        );
        if !venue.reason.trim().is_empty() {
            let _ = writeln!(out, "     {}", venue.reason.trim());
        }
    }
    out
}

/// Show the ranking and ask until a valid choice arrives. End of input
/// counts as quit.
pub async fn decide(operator: &mut dyn Operator, ranked: &[ScoredVenue]) -> GateResult<Decision> {
    let ranking = render_ranking(ranked);
    loop {
        operator.present(&ranking, MENU).await?;
        let Some(raw) = operator.read_choice().await? else {
            return Ok(Decision::Quit);
        };
        let choice = match parse_choice(&raw) {
            Ok(choice) => choice,
            Err(e) => {
                warn!(input = %raw.trim(), "invalid gate choice");
                operator.notify(&e.to_string()).await?;
                continue;
            }
        };
        let feedback = match choice {
            Choice::Redo => operator.read_feedback().await?,
            _ => None,
        };
        return Ok(Decision::from_choice(choice, feedback));
    }
}

/// A run paused at the gate, with a digest of its state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionCheckpoint {
    pub checkpoint_id: Uuid,
    pub run_dir: PathBuf,
    pub created_at: DateTime<Utc>,
    /// SHA-256 of the serialized state.
    pub state_digest: String,
    pub state: PipelineState,
}

impl DecisionCheckpoint {
    pub fn create(state: PipelineState, run_dir: impl Into<PathBuf>) -> Result<Self> {
        let state_digest = state.digest()?;
        Ok(Self {
            checkpoint_id: Uuid::new_v4(),
            run_dir: run_dir.into(),
            created_at: Utc::now(),
            state_digest,
            state,
        })
    }

    /// Recompute the digest and require the state to be paused at the gate.
    pub fn verify(&self) -> Result<()> {
        let actual = self.state.digest()?;
        if actual != self.state_digest {
            return Err(FlowError::CheckpointMismatch {
                expected: self.state_digest.clone(),
                actual,
            });
        }
        if self.state.current_step != PipelineStep::AwaitingDecision {
            return Err(FlowError::CheckpointNotPending(
                self.state.current_step.to_string(),
            ));
        }
        Ok(())
    }

    pub fn ranking(&self) -> &[ScoredVenue] {
        &self.state.hydrated_venues
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    /// Read and verify a checkpoint.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| FlowError::io(path, e))?;
        let checkpoint: Self = serde_json::from_str(&raw)?;
        checkpoint.verify()?;
        Ok(checkpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::ScriptedOperator;
    use tempfile::TempDir;
    use venue_core::{InputData, Venue, VenueScore};

    fn paused_state() -> PipelineState {
        let mut state = PipelineState::new(InputData::new("1 Main St", 1.0)).unwrap();
        state.append_venues(vec![Venue::new("a", "Loft", "bar", "x", 0.4)]);
        state.replace_scores(vec![VenueScore::for_id("a", 88.0, "central")]);
        state.set_step(PipelineStep::AwaitingDecision);
        state
    }

    #[test]
    fn test_parse_choice_aliases() {
        for (raw, expected) in [
            ("1", Choice::Quit),
            (" Q ", Choice::Quit),
            ("redo", Choice::Redo),
            ("R", Choice::Redo),
            ("3", Choice::Proceed),
            ("Proceed", Choice::Proceed),
        ] {
            assert_eq!(parse_choice(raw).unwrap(), expected, "input {raw:?}");
        }
        assert!(matches!(
            parse_choice("4"),
            Err(GateError::InvalidChoice { .. })
        ));
        assert!(parse_choice("").is_err());
    }

    #[test]
    fn test_render_ranking() {
        let state = paused_state();
        let table = render_ranking(&state.hydrated_venues);
        assert!(table.contains("  1. Loft (0.4 km) score 88.0"));
        assert!(table.contains("central"));
        assert_eq!(render_ranking(&[]), "No venues were scored.\n");
    }

    #[tokio::test]
    async fn test_invalid_choice_reprompts() {
        let state = paused_state();
        let mut operator = ScriptedOperator::new(["7", "maybe", "2"]).with_feedback(["more parking"]);

        let decision = decide(&mut operator, &state.hydrated_venues).await.unwrap();

        assert_eq!(
            decision,
            Decision::Redo {
                feedback: "more parking".into()
            }
        );
        assert_eq!(operator.presentations(), 3);
        assert_eq!(operator.notices().len(), 2);
    }

    #[tokio::test]
    async fn test_end_of_input_quits() {
        let mut operator = ScriptedOperator::new(Vec::<String>::new());
        let decision = decide(&mut operator, &[]).await.unwrap();
        assert_eq!(decision, Decision::Quit);
    }

    #[test]
    fn test_checkpoint_roundtrip_and_tamper_detection() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("checkpoint.json");
        let checkpoint = DecisionCheckpoint::create(paused_state(), tmp.path()).unwrap();
        checkpoint.save(&path).unwrap();

        let loaded = DecisionCheckpoint::load(&path).unwrap();
        assert_eq!(loaded, checkpoint);

        let mut value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        value["state"]["scored_venues_feedback"] = "edited by hand".into();
        std::fs::write(&path, value.to_string()).unwrap();

        assert!(matches!(
            DecisionCheckpoint::load(&path),
            Err(FlowError::CheckpointMismatch { .. })
        ));
    }

    #[test]
    fn test_checkpoint_requires_pending_state() {
        let mut state = paused_state();
        state.set_step(PipelineStep::Completed);
        let checkpoint = DecisionCheckpoint::create(state, "/tmp/run").unwrap();
        assert!(matches!(
            checkpoint.verify(),
            Err(FlowError::CheckpointNotPending(_))
        ));
    }

    #[test]
    fn test_decision_serde_shape() {
        let json = serde_json::to_value(Decision::Redo {
            feedback: "x".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"choice": "redo", "feedback": "x"}));
    }
}
