//! Pipeline orchestrator.
//!
//! Owns the [`PipelineState`] and sequences the stages:
//!
//! ```text
//! search ──▶ scoring ──▶ gate ──quit──▶ (write state) done
//!               ▲          │
//!               └──redo────┤
//!                          └─proceed──▶ drafting ──▶ (write state) done
//! ```
//!
//! Stages return values; only this module folds them into the state,
//! between stage boundaries.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, Instrument};
use venue_agents::{EmailDrafter, TemplateDrafter, VenueScorer, VenueSearcher};
use venue_core::{obs, EmailTemplate, InputData, PipelineState, PipelineStep};

use crate::artifacts::{write_report, write_state, RunLayout, SearchReport};
use crate::config::PipelineConfig;
use crate::drafting::{run_drafting_stage, DraftPlan};
use crate::error::Result;
use crate::gate::{decide, Decision, DecisionCheckpoint};
use crate::operator::Operator;
use crate::scoring::run_scoring_stage;
use crate::search::run_search_stage;

/// External capabilities the pipeline calls out to.
#[derive(Clone)]
pub struct Capabilities {
    pub searcher: Arc<dyn VenueSearcher>,
    pub scorer: Arc<dyn VenueScorer>,
    /// Used when the input carries no literal template.
    pub drafter: Arc<dyn EmailDrafter>,
}

/// Where a run stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Paused at the gate; the checkpoint is also on disk.
    AwaitingDecision(DecisionCheckpoint),
    Completed(PipelineState),
    Quit(PipelineState),
}

impl PipelineOutcome {
    pub fn state(&self) -> &PipelineState {
        match self {
            PipelineOutcome::AwaitingDecision(checkpoint) => &checkpoint.state,
            PipelineOutcome::Completed(state) | PipelineOutcome::Quit(state) => state,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PipelineOutcome::AwaitingDecision(_))
    }
}

pub struct VenuePipeline {
    config: PipelineConfig,
    capabilities: Capabilities,
}

impl VenuePipeline {
    pub fn new(config: PipelineConfig, capabilities: Capabilities) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            capabilities,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Validate the input, search, score, and pause at the gate.
    pub async fn start(&self, input: InputData) -> Result<PipelineOutcome> {
        let mut state = PipelineState::new(input)?;
        let run_id = state.run_id.to_string();
        let layout = RunLayout::create(&self.config.output_root, state.created_at)?;

        async {
            obs::emit_pipeline_started(
                &run_id,
                &state.input_data.address,
                state.input_data.radius_km,
            );
            self.search(&mut state).await;
            self.score(&mut state).await;
            self.await_decision(state, &layout)
        }
        .instrument(obs::run_span(&run_id))
        .await
    }

    /// Apply an operator decision to a paused run.
    pub async fn resume(
        &self,
        checkpoint: DecisionCheckpoint,
        decision: Decision,
    ) -> Result<PipelineOutcome> {
        checkpoint.verify()?;
        let layout = RunLayout::open(&checkpoint.run_dir)?;
        let mut state = checkpoint.state;
        let run_id = state.run_id.to_string();

        async {
            obs::emit_gate_decided(&run_id, decision.choice().name());
            match decision {
                Decision::Quit => self.finish(state, PipelineStep::Quit, &layout),
                Decision::Redo { feedback } => {
                    state.append_feedback(&feedback);
                    self.score(&mut state).await;
                    self.await_decision(state, &layout)
                }
                Decision::Proceed => {
                    self.draft(&mut state, &layout).await?;
                    self.finish(state, PipelineStep::Completed, &layout)
                }
            }
        }
        .instrument(obs::run_span(&run_id))
        .await
    }

    /// Run to a terminal outcome, asking `operator` at every gate.
    pub async fn run_interactive(
        &self,
        input: InputData,
        operator: &mut dyn Operator,
    ) -> Result<PipelineOutcome> {
        let mut outcome = self.start(input).await?;
        loop {
            match outcome {
                PipelineOutcome::AwaitingDecision(checkpoint) => {
                    let decision = decide(operator, checkpoint.ranking()).await?;
                    outcome = self.resume(checkpoint, decision).await?;
                }
                terminal => return Ok(terminal),
            }
        }
    }

    async fn search(&self, state: &mut PipelineState) {
        state.set_step(PipelineStep::Searching);
        let outcome = run_search_stage(
            Arc::clone(&self.capabilities.searcher),
            &state.input_data,
            self.config.request_timeout,
        )
        .await;
        let added = state.append_venues(outcome.venues);
        info!(step = %state.current_step, progress = state.progress, venues = added, "search complete");
    }

    async fn score(&self, state: &mut PipelineState) {
        state.set_step(PipelineStep::Scoring);
        let feedback = state.scored_venues_feedback.clone();
        let outcome = run_scoring_stage(
            Arc::clone(&self.capabilities.scorer),
            &state.venues,
            &state.input_data,
            Some(feedback.as_str()),
            self.config.fan_out(),
        )
        .await;
        let report = state.replace_scores(outcome.scores);
        obs::emit_merge_completed(&report);
        info!(
            step = %state.current_step,
            progress = state.progress,
            pass = state.scoring_passes,
            ranked = state.hydrated_venues.len(),
            "scoring complete"
        );
    }

    fn await_decision(&self, mut state: PipelineState, layout: &RunLayout) -> Result<PipelineOutcome> {
        state.set_step(PipelineStep::AwaitingDecision);
        state.rehydrate();
        let checkpoint = DecisionCheckpoint::create(state, layout.root())?;
        let path = layout.checkpoint_path();
        checkpoint.save(&path)?;
        obs::emit_gate_awaiting(
            &checkpoint.state.run_id.to_string(),
            checkpoint.state.hydrated_venues.len(),
            &path.display().to_string(),
        );
        Ok(PipelineOutcome::AwaitingDecision(checkpoint))
    }

    async fn draft(&self, state: &mut PipelineState, layout: &RunLayout) -> Result<()> {
        state.set_step(PipelineStep::Drafting);
        let (drafter, template): (Arc<dyn EmailDrafter>, EmailTemplate) =
            match state.input_data.literal_template() {
                Some(text) => (
                    Arc::new(TemplateDrafter) as Arc<dyn EmailDrafter>,
                    EmailTemplate::new(text),
                ),
                None => (
                    Arc::clone(&self.capabilities.drafter),
                    EmailTemplate::builtin(),
                ),
            };

        let outcome = run_drafting_stage(
            drafter,
            DraftPlan {
                venues: state.top_venues(self.config.top_k),
                input: &state.input_data,
                template,
                shortlist_size: self.config.shortlist_size,
            },
            layout,
            self.config.fan_out(),
        )
        .await?;

        for email in outcome.emails {
            state.record_email(email.venue_name, email.body);
        }
        Ok(())
    }

    fn finish(
        &self,
        mut state: PipelineState,
        step: PipelineStep,
        layout: &RunLayout,
    ) -> Result<PipelineOutcome> {
        state.set_step(step);
        // A terminal checkpoint no longer verifies.
        DecisionCheckpoint::create(state.clone(), layout.root())?.save(&layout.checkpoint_path())?;
        if step == PipelineStep::Completed || self.config.write_state_on_quit {
            write_state(layout, &state)?;
            write_report(layout, &SearchReport::from_state(&state))?;
        }
        obs::emit_pipeline_finished(
            &state.run_id.to_string(),
            step.name(),
            state.venues.len(),
            state.generated_emails.len(),
        );
        info!(finished_at = %Utc::now(), "pipeline finished");
        Ok(match step {
            PipelineStep::Quit => PipelineOutcome::Quit(state),
            _ => PipelineOutcome::Completed(state),
        })
    }
}
