//! Pipeline input parameters.

use serde::{Deserialize, Serialize};

use super::error::{Result, VenueError};

/// Parameters for one pipeline run. Immutable once the pipeline starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputData {
    /// Street address the search is centred on.
    pub address: String,
    /// Search radius in kilometres.
    pub radius_km: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiktok_url: Option<String>,
    /// Literal outreach template. Empty or absent asks the drafting model
    /// to author the email instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_template: Option<String>,
}

impl InputData {
    /// Input with only the required fields set.
    pub fn new(address: impl Into<String>, radius_km: f64) -> Self {
        Self {
            address: address.into(),
            radius_km,
            event_date: None,
            event_time: None,
            sender_name: None,
            sender_email: None,
            linkedin_url: None,
            instagram_url: None,
            tiktok_url: None,
            email_template: None,
        }
    }

    /// Check that every required field is present and usable.
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(VenueError::MissingInput("address"));
        }
        if !self.radius_km.is_finite() || self.radius_km <= 0.0 {
            return Err(VenueError::InvalidInput {
                field: "radius_km",
                reason: format!("must be a positive number of kilometres, got {}", self.radius_km),
            });
        }
        Ok(())
    }

    /// The literal template to substitute, if one was supplied.
    pub fn literal_template(&self) -> Option<&str> {
        self.email_template
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}
