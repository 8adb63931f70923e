//! Error types for run tracking

use thiserror::Error;

/// Errors that can occur when setting up the run tracker
///
/// Recording against an unknown or finished run is not an error; those
/// calls are no-ops.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
