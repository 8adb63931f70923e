//! Promise engine error types

use thiserror::Error;

/// Errors that can occur when building promises
///
/// Under-delivery is not an error: reconciliation reports it as an outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromiseError {
    /// A promise must commit to at least two items
    #[error("Promise count must be at least 2, got {0}")]
    CountTooSmall(u32),

    /// A promise needs a display label
    #[error("Promise label is empty")]
    EmptyLabel,
}
