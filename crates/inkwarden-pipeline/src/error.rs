//! Error types for the section pipeline

use inkwarden_tracker::ErrorCode;
use thiserror::Error;

/// Errors that abort a section
///
/// Under-delivered promises, leftover smells and short sections are
/// warnings on the outcome, not errors.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The drafting call failed and there is no earlier draft to keep
    #[error("Model error ({provider}): {message}")]
    Model {
        /// Provider that failed
        provider: String,
        /// Provider error message
        message: String,
    },

    /// A blocking model task panicked or was cancelled
    #[error("Task join error: {0}")]
    Join(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Code to record when this error ends the run
    pub fn code(&self) -> ErrorCode {
        match self {
            PipelineError::Model { .. } => ErrorCode::ModelError,
            PipelineError::Join(_) | PipelineError::Config(_) => ErrorCode::UnknownError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let err = PipelineError::Model {
            provider: "mock".into(),
            message: "boom".into(),
        };
        assert_eq!(err.code(), ErrorCode::ModelError);
        assert_eq!(err.to_string(), "Model error (mock): boom");
        assert_eq!(PipelineError::Join("x".into()).code(), ErrorCode::UnknownError);
    }
}
