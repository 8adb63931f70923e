//! Source verifier error types

use inkwarden_domain::ContentDomain;
use thiserror::Error;

/// Errors that abort source discovery
///
/// A single candidate failing a check is not an error: it is reported as a
/// [`Rejection`](crate::Rejection) and the batch carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Fewer verified sources than the domain requires
    #[error("Source minimum not met for {domain}: required {required}, available {available}")]
    SourceMinimumNotMet {
        /// Document domain
        domain: ContentDomain,
        /// Required verified sources
        required: usize,
        /// Verified sources found
        available: usize,
    },

    /// A source failed syntactic validation at construction
    #[error("Invalid source URL {url}: {reason}")]
    InvalidSource {
        /// Offending URL
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SourceError {
    /// Stable error code for run tracking
    pub fn code(&self) -> &'static str {
        match self {
            SourceError::SourceMinimumNotMet { .. } => "SOURCE_MINIMUM_NOT_MET",
            SourceError::InvalidSource { .. } => "FORMAT_INVALID",
            SourceError::Client(_) | SourceError::Config(_) => "UNKNOWN_ERROR",
        }
    }
}
