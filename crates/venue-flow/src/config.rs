//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};
use crate::fanout::FanOutConfig;

/// Settings for one pipeline. Passed to [`crate::VenuePipeline::new`];
/// nothing is read from the environment here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory under which `search_<timestamp>` run directories go.
    pub output_root: PathBuf,
    /// Upper bound on concurrent capability calls within a stage.
    pub max_concurrent: usize,
    /// Per-request time limit. A timed-out request is a per-item failure.
    pub request_timeout: Duration,
    /// Draft only the `k` best-ranked venues.
    pub top_k: Option<usize>,
    /// Venues ranked within this many get the proceed wording.
    pub shortlist_size: usize,
    /// Persist state and report when the operator quits.
    pub write_state_on_quit: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("outputs"),
            max_concurrent: 4,
            request_timeout: Duration::from_secs(120),
            top_k: None,
            shortlist_size: 3,
            write_state_on_quit: true,
        }
    }
}

impl PipelineConfig {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent == 0 {
            return Err(FlowError::InvalidConfig(
                "max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(FlowError::InvalidConfig(
                "request_timeout must be greater than zero".to_string(),
            ));
        }
        if self.top_k == Some(0) {
            return Err(FlowError::InvalidConfig(
                "top_k must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn fan_out(&self) -> FanOutConfig {
        FanOutConfig {
            max_concurrent: self.max_concurrent,
            item_timeout: Some(self.request_timeout),
        }
    }
}
