//! Pipeline state: the aggregate threaded through every stage of a run.
//!
//! Owned by the orchestrator. Stages return values; only the orchestrator
//! folds them into the state, between stage boundaries.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::{InputData, Result, ScoredVenue, Venue, VenueScore};
use crate::merge::{combine_venues_with_scores, normalize_key, MergeReport};
use crate::naming::venue_slug;

/// Coarse position of a run within the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    Initialized,
    Searching,
    Scoring,
    AwaitingDecision,
    Drafting,
    Completed,
    Quit,
}

impl PipelineStep {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineStep::Initialized => "initialized",
            PipelineStep::Searching => "searching",
            PipelineStep::Scoring => "scoring",
            PipelineStep::AwaitingDecision => "awaiting_decision",
            PipelineStep::Drafting => "drafting",
            PipelineStep::Completed => "completed",
            PipelineStep::Quit => "quit",
        }
    }

    /// Progress fraction reported when the step is entered.
    pub fn progress(&self) -> f32 {
        match self {
            PipelineStep::Initialized => 0.0,
            PipelineStep::Searching => 0.2,
            PipelineStep::Scoring => 0.5,
            PipelineStep::AwaitingDecision => 0.7,
            PipelineStep::Drafting => 0.8,
            PipelineStep::Completed | PipelineStep::Quit => 1.0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStep::Completed | PipelineStep::Quit)
    }
}

impl std::fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// State of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    pub run_id: Uuid,
    pub input_data: InputData,
    /// Venues in arrival order. Append-only.
    pub venues: Vec<Venue>,
    /// Scores of the latest scoring pass only.
    pub venue_scores: Vec<VenueScore>,
    /// Venues joined with their scores, sorted by score descending.
    pub hydrated_venues: Vec<ScoredVenue>,
    /// Operator feedback accumulated across redo cycles.
    pub scored_venues_feedback: String,
    /// Venue name to drafted email body.
    pub generated_emails: BTreeMap<String, String>,
    pub current_step: PipelineStep,
    pub progress: f32,
    pub scoring_passes: u32,
    /// Scores from the latest pass that matched no venue.
    pub dropped_scores: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PipelineState {
    /// Fresh state for a run. Fails fast on missing or invalid input.
    pub fn new(input_data: InputData) -> Result<Self> {
        input_data.validate()?;
        let now = Utc::now();
        Ok(Self {
            run_id: Uuid::new_v4(),
            input_data,
            venues: Vec::new(),
            venue_scores: Vec::new(),
            hydrated_venues: Vec::new(),
            scored_venues_feedback: String::new(),
            generated_emails: BTreeMap::new(),
            current_step: PipelineStep::Initialized,
            progress: PipelineStep::Initialized.progress(),
            scoring_passes: 0,
            dropped_scores: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Move to `step` and update progress.
    pub fn set_step(&mut self, step: PipelineStep) {
        self.current_step = step;
        self.progress = step.progress();
        self.updated_at = Utc::now();
    }

    /// Append venues in arrival order. Venues without an id get one
    /// derived from their name, suffixed when it collides with any id in
    /// the run, including explicit ids later in the same batch.
    pub fn append_venues(&mut self, venues: impl IntoIterator<Item = Venue>) -> usize {
        let mut incoming: Vec<Venue> = venues.into_iter().collect();
        let mut taken: HashSet<String> = self
            .venues
            .iter()
            .chain(incoming.iter())
            .filter_map(|v| normalize_key(&v.id))
            .collect();

        for venue in incoming.iter_mut().filter(|v| !v.has_id()) {
            let base = venue_slug(&venue.name);
            let mut candidate = base.clone();
            let mut n = 2;
            while taken.contains(&candidate) {
                candidate = format!("{base}_{n}");
                n += 1;
            }
            taken.insert(candidate.clone());
            venue.id = candidate;
        }

        let added = incoming.len();
        self.venues.append(&mut incoming);
        self.updated_at = Utc::now();
        added
    }

    /// Replace the whole score list with a new pass and re-derive the
    /// hydrated list. Prior scores are discarded.
    pub fn replace_scores(&mut self, scores: Vec<VenueScore>) -> MergeReport {
        self.venue_scores = scores;
        self.scoring_passes += 1;
        self.rehydrate()
    }

    /// Recompute the hydrated list from the current venues and scores.
    pub fn rehydrate(&mut self) -> MergeReport {
        let report = combine_venues_with_scores(&self.venues, &self.venue_scores);
        self.hydrated_venues = report.scored.clone();
        self.dropped_scores = report.dropped_scores;
        self.updated_at = Utc::now();
        report
    }

    /// Append operator feedback. Earlier feedback is kept.
    pub fn append_feedback(&mut self, feedback: &str) {
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return;
        }
        if !self.scored_venues_feedback.is_empty() {
            self.scored_venues_feedback.push('\n');
        }
        self.scored_venues_feedback.push_str(feedback);
        self.updated_at = Utc::now();
    }

    pub fn record_email(&mut self, venue_name: impl Into<String>, body: impl Into<String>) {
        self.generated_emails.insert(venue_name.into(), body.into());
        self.updated_at = Utc::now();
    }

    /// The `k` best-ranked venues, or all of them.
    pub fn top_venues(&self, k: Option<usize>) -> &[ScoredVenue] {
        let n = k.map_or(self.hydrated_venues.len(), |k| k.min(self.hydrated_venues.len()));
        &self.hydrated_venues[..n]
    }

    /// SHA-256 over the canonical JSON serialization.
    pub fn digest(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}
