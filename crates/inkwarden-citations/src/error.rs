//! Citation scrubber error types

use thiserror::Error;

/// Errors raised by the citation stage
///
/// Scrubbing itself never fails; only the strict rewrite talks to a model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CitationError {
    /// The strict rewrite call failed
    #[error("Strict rewrite failed: {0}")]
    Rewrite(String),

    /// The model answered with nothing usable
    #[error("Strict rewrite returned empty content")]
    EmptyRewrite,
}

impl CitationError {
    /// Stable error code for run tracking
    pub fn code(&self) -> &'static str {
        "MODEL_ERROR"
    }
}
