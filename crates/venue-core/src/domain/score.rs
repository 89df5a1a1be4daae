//! Scores and hydrated (scored) venue records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ValidationError;
use super::lenient;
use super::venue::Venue;

/// One scoring verdict for one venue.
///
/// Joined to its venue by `id` when both sides carry one, otherwise by
/// normalized `name`. A score with neither is kept in state but can never
/// be joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueScore {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub score: f64,
    #[serde(default)]
    pub reason: String,
}

impl VenueScore {
    /// Score keyed by venue id.
    pub fn for_id(id: impl Into<String>, score: f64, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            score,
            reason: reason.into(),
        }
    }

    /// Score keyed by venue name only.
    pub fn for_name(name: impl Into<String>, score: f64, reason: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            score,
            reason: reason.into(),
        }
    }

    /// Validate one scoring response. Accepts the legacy `venue_id` and
    /// `total_score` spellings.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let obj = value.as_object().ok_or(ValidationError::NotAnObject)?;
        Ok(Self {
            id: lenient::opt_string(obj, &["id", "venue_id"]).unwrap_or_default(),
            name: lenient::opt_string(obj, &["name", "venue_name"]).unwrap_or_default(),
            score: lenient::required_number(obj, "score", &["score", "total_score"])?,
            reason: lenient::opt_string(obj, &["reason", "justification", "recommendations"])
                .unwrap_or_default(),
        })
    }

    /// Whether the score carries any join key at all.
    pub fn has_key(&self) -> bool {
        !self.id.trim().is_empty() || !self.name.trim().is_empty()
    }
}

/// A venue enriched with its score and justification.
///
/// Derived data: rebuilt wholesale every time scoring completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredVenue {
    #[serde(flatten)]
    pub venue: Venue,
    pub score: f64,
    pub reason: String,
}

impl ScoredVenue {
    pub fn new(venue: Venue, score: &VenueScore) -> Self {
        Self {
            venue,
            score: score.score,
            reason: score.reason.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.venue.name
    }
}
