//! Capability contracts consumed by the pipeline stages.
//!
//! Each capability returns the raw response text. Decoding happens once,
//! in the stage, through `venue_core::ExternalPayload`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use venue_core::{EmailTemplate, InputData, ScoredVenue, Venue};

use crate::error::Result;

/// Find venues around the input address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub input: InputData,
}

/// Score one venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub venue: Venue,
    pub input: InputData,
    /// Operator feedback accumulated over redo cycles, if any.
    pub feedback: Option<String>,
}

/// Draft the outreach email for one ranked venue.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftRequest {
    pub venue: ScoredVenue,
    pub input: InputData,
    /// Ranked within the shortlist: selects the proceed wording.
    pub shortlisted: bool,
    /// Literal template to fill, or the style guide handed to a model.
    pub template: EmailTemplate,
}

#[async_trait]
pub trait VenueSearcher: Send + Sync {
    /// Raw search response: usually a JSON list of venue records.
    async fn search(&self, request: &SearchRequest) -> Result<String>;
}

#[async_trait]
pub trait VenueScorer: Send + Sync {
    /// Raw scoring response: usually one JSON score record.
    async fn score(&self, request: &ScoreRequest) -> Result<String>;
}

#[async_trait]
pub trait EmailDrafter: Send + Sync {
    /// Email body text.
    async fn draft(&self, request: &DraftRequest) -> Result<String>;
}
