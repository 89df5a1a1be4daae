//! Domain-level error taxonomy for Venue Scout.

/// Errors produced when a single external record fails shape validation.
///
/// These never abort a stage: the offending record is dropped and the
/// reason is logged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Venue Scout domain errors.
#[derive(Debug, thiserror::Error)]
pub enum VenueError {
    #[error("missing required input: {0}")]
    MissingInput(&'static str),

    #[error("invalid input {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for Venue Scout domain operations.
pub type Result<T> = std::result::Result<T, VenueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_display() {
        let err = VenueError::MissingInput("address");
        assert_eq!(err.to_string(), "missing required input: address");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::MissingField { field: "name" };
        assert_eq!(err.to_string(), "missing required field: name");
    }
}
