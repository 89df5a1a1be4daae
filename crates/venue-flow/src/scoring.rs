//! Venue scoring stage: one request per venue, bounded fan-out.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};
use venue_agents::{ScoreRequest, VenueScorer};
use venue_core::{obs, ExternalPayload, InputData, Venue, VenueScore};

use crate::error::ItemError;
use crate::fanout::{gather_bounded, FanOutConfig};

/// One scoring pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringOutcome {
    /// One score per venue that scored successfully, in venue order.
    pub scores: Vec<VenueScore>,
    /// Venues skipped because their request failed, timed out or
    /// returned no usable score.
    pub failed: usize,
}

/// Score every venue. `feedback` is attached to every request.
///
/// Failures are per venue: the outcome may hold fewer scores than there
/// are venues. Callers join scores by key, never by position.
pub async fn run_scoring_stage(
    scorer: Arc<dyn VenueScorer>,
    venues: &[Venue],
    input: &InputData,
    feedback: Option<&str>,
    fan_out: FanOutConfig,
) -> ScoringOutcome {
    let started = Instant::now();
    obs::emit_stage_started("scoring", venues.len());

    let input = input.clone();
    let feedback = feedback
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string);
    let names: Vec<String> = venues.iter().map(|v| v.name.clone()).collect();

    let outcomes = gather_bounded(venues.to_vec(), fan_out, move |venue| {
        let scorer = Arc::clone(&scorer);
        let request = ScoreRequest {
            venue,
            input: input.clone(),
            feedback: feedback.clone(),
        };
        async move {
            let raw = scorer.score(&request).await?;
            decode_score(&raw, &request.venue)
        }
    })
    .await;

    let mut outcome = ScoringOutcome::default();
    for (name, result) in names.iter().zip(outcomes) {
        match result {
            Ok(score) => {
                debug!(venue = %name, score = score.score, "venue scored");
                outcome.scores.push(score);
            }
            Err(e) => {
                warn!(venue = %name, error = %e, "skipping venue: no usable score");
                outcome.failed += 1;
            }
        }
    }

    obs::emit_stage_finished(
        "scoring",
        outcome.scores.len(),
        outcome.failed,
        started.elapsed().as_millis() as u64,
    );
    outcome
}

/// Read the first record of a scoring response. A score carrying no key
/// at all is attributed to the venue it was requested for.
pub fn decode_score(raw: &str, venue: &Venue) -> Result<VenueScore, ItemError> {
    let record = ExternalPayload::decode(raw)
        .into_records()?
        .into_iter()
        .next()
        .ok_or(ItemError::Empty)?;
    let mut score = VenueScore::from_value(&record)?;
    if !score.has_key() {
        score.id = venue.id.clone();
    }
    Ok(score)
}
