//! Structured lifecycle events for pipeline runs.
//!
//! Every event carries a stable `event` field so log consumers can filter
//! on it. Verbosity is controlled through `RUST_LOG`.

use tracing::{info, warn};

use crate::merge::MergeReport;

/// RAII guard that enters a run-scoped span for the duration of a run.
///
/// ```ignore
/// let _span = RunSpan::enter("5f1c…");
/// // every event logged here carries run_id
/// ```
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    pub fn enter(run_id: &str) -> Self {
        Self {
            _span: run_span(run_id).entered(),
        }
    }
}

/// The run-scoped span, for instrumenting futures that cross `.await`.
pub fn run_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("venue.run", run_id = %run_id)
}

pub fn emit_pipeline_started(run_id: &str, address: &str, radius_km: f64) {
    info!(event = "pipeline.started", run_id = %run_id, address = %address, radius_km = radius_km);
}

pub fn emit_stage_started(stage: &str, items: usize) {
    info!(event = "stage.started", stage = %stage, items = items);
}

/// Stage finished. `failed` counts items skipped because of per-item errors.
pub fn emit_stage_finished(stage: &str, succeeded: usize, failed: usize, duration_ms: u64) {
    if failed > 0 {
        warn!(
            event = "stage.finished",
            stage = %stage,
            succeeded = succeeded,
            failed = failed,
            duration_ms = duration_ms,
        );
    } else {
        info!(
            event = "stage.finished",
            stage = %stage,
            succeeded = succeeded,
            failed = failed,
            duration_ms = duration_ms,
        );
    }
}

/// Merge finished. Dropped scores are logged at warn level: a dropped
/// score is a venue missing from the ranking.
pub fn emit_merge_completed(report: &MergeReport) {
    if report.dropped_scores > 0 {
        warn!(
            event = "merge.completed",
            scored = report.scored.len(),
            dropped_scores = report.dropped_scores,
            unscored_venues = report.unscored_venues,
            duplicate_venues = report.duplicate_venues,
        );
    } else {
        info!(
            event = "merge.completed",
            scored = report.scored.len(),
            dropped_scores = 0usize,
            unscored_venues = report.unscored_venues,
            duplicate_venues = report.duplicate_venues,
        );
    }
}

pub fn emit_gate_awaiting(run_id: &str, ranked: usize, checkpoint: &str) {
    info!(event = "gate.awaiting", run_id = %run_id, ranked = ranked, checkpoint = %checkpoint);
}

pub fn emit_gate_decided(run_id: &str, decision: &str) {
    info!(event = "gate.decided", run_id = %run_id, decision = %decision);
}

pub fn emit_artifact_written(kind: &str, path: &std::path::Path) {
    info!(event = "artifact.written", kind = %kind, path = %path.display());
}

pub fn emit_pipeline_finished(run_id: &str, outcome: &str, venues: usize, emails: usize) {
    info!(
        event = "pipeline.finished",
        run_id = %run_id,
        outcome = %outcome,
        venues = venues,
        emails = emails,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_span_create() {
        let _span = RunSpan::enter("test-run-id");
        emit_stage_started("search", 1);
        emit_merge_completed(&MergeReport::default());
    }
}
