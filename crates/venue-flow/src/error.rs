//! Error types for stage orchestration.

use std::path::PathBuf;

use thiserror::Error;
use venue_agents::AgentError;
use venue_core::{MalformedResult, ValidationError, VenueError};

/// Errors that terminate a pipeline run.
///
/// Per-item capability failures never surface here; stages log and skip
/// them.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("missing required input: {0}")]
    MissingInput(&'static str),

    #[error("invalid input {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("checkpoint digest mismatch: expected {expected}, got {actual}")]
    CheckpointMismatch { expected: String, actual: String },

    #[error("checkpoint is not awaiting a decision (step: {0})")]
    CheckpointNotPending(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Gate(#[from] GateError),
}

impl FlowError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FlowError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<VenueError> for FlowError {
    fn from(err: VenueError) -> Self {
        match err {
            VenueError::MissingInput(field) => FlowError::MissingInput(field),
            VenueError::InvalidInput { field, reason } => FlowError::InvalidInput { field, reason },
            VenueError::Serialization(e) => FlowError::Serialization(e),
        }
    }
}

/// Errors at the human decision gate.
#[derive(Debug, Error)]
pub enum GateError {
    /// Recoverable: the operator is prompted again.
    #[error("invalid choice {input:?}: enter 1 (quit), 2 (redo) or 3 (proceed)")]
    InvalidChoice { input: String },

    #[error("operator I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single fan-out item produced nothing.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Malformed(#[from] MalformedResult),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("response contained no records")]
    Empty,
}

/// Result type for orchestration.
pub type Result<T> = std::result::Result<T, FlowError>;

/// Result type for gate interaction.
pub type GateResult<T> = std::result::Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_maps_through() {
        let err: FlowError = VenueError::MissingInput("address").into();
        assert!(matches!(err, FlowError::MissingInput("address")));
        assert_eq!(err.to_string(), "missing required input: address");
    }

    #[test]
    fn test_invalid_choice_message() {
        let err = GateError::InvalidChoice { input: "7".into() };
        assert!(err.to_string().contains("\"7\""));
    }
}
