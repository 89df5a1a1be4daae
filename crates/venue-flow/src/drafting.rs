//! Email drafting stage.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};
use venue_agents::{DraftRequest, EmailDrafter};
use venue_core::{obs, EmailTemplate, InputData, ScoredVenue};

use crate::artifacts::{write_email, RunLayout};
use crate::error::Result;
use crate::fanout::{gather_bounded, FanOutConfig};

/// One successful draft and where it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftedEmail {
    pub venue_name: String,
    pub body: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftingOutcome {
    /// Successful drafts in ranking order.
    pub emails: Vec<DraftedEmail>,
    pub failed: usize,
}

/// What to draft and how.
pub struct DraftPlan<'a> {
    /// Ranked venues to draft for, best first.
    pub venues: &'a [ScoredVenue],
    pub input: &'a InputData,
    pub template: EmailTemplate,
    /// Venues ranked below this index get the general wording.
    pub shortlist_size: usize,
}

/// Draft every planned venue concurrently, then write the successful
/// drafts in ranking order.
///
/// A failed draft is skipped. A failed file write aborts the stage.
pub async fn run_drafting_stage(
    drafter: Arc<dyn EmailDrafter>,
    plan: DraftPlan<'_>,
    layout: &RunLayout,
    fan_out: FanOutConfig,
) -> Result<DraftingOutcome> {
    let started = Instant::now();
    obs::emit_stage_started("drafting", plan.venues.len());

    let requests: Vec<DraftRequest> = plan
        .venues
        .iter()
        .enumerate()
        .map(|(rank, venue)| DraftRequest {
            venue: venue.clone(),
            input: plan.input.clone(),
            shortlisted: rank < plan.shortlist_size,
            template: plan.template.clone(),
        })
        .collect();
    let names: Vec<String> = plan.venues.iter().map(|v| v.name().to_string()).collect();

    let outcomes = gather_bounded(requests, fan_out, move |request| {
        let drafter = Arc::clone(&drafter);
        async move { drafter.draft(&request).await }
    })
    .await;

    let mut outcome = DraftingOutcome::default();
    for (name, result) in names.into_iter().zip(outcomes) {
        match result {
            Ok(body) => {
                let path = write_email(layout, &name, &body)?;
                debug!(venue = %name, path = %path.display(), "email drafted");
                outcome.emails.push(DraftedEmail {
                    venue_name: name,
                    body,
                    path,
                });
            }
            Err(e) => {
                warn!(venue = %name, error = %e, "skipping venue: draft failed");
                outcome.failed += 1;
            }
        }
    }

    obs::emit_stage_finished(
        "drafting",
        outcome.emails.len(),
        outcome.failed,
        started.elapsed().as_millis() as u64,
    );
    Ok(outcome)
}
