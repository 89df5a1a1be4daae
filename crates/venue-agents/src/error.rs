//! Error types for external capabilities.

use thiserror::Error;

/// Failure of a single capability call.
///
/// Stages treat every variant as a per-item failure: the item is skipped
/// and the run continues.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Required credential not configured
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    /// Transport failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success status from the remote API
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The API answered but returned no usable content
    #[error("empty response from {0}")]
    EmptyResponse(&'static str),

    /// The API answered with a body we could not read
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Injected failure (test fakes)
    #[error("scripted failure: {0}")]
    Scripted(String),
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        AgentError::Http(err.to_string())
    }
}

/// Result type for capability calls.
pub type Result<T> = std::result::Result<T, AgentError>;
