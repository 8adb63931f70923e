//! Quality engine error types

use thiserror::Error;

/// Errors that can occur while building rules or loading configuration
///
/// Rule evaluation itself never fails: an absent pattern is a zero-count
/// result, not an error.
#[derive(Error, Debug)]
pub enum QualityError {
    /// A rule pattern failed to compile
    #[error("Invalid pattern for rule {rule_id}: {source}")]
    InvalidPattern {
        /// Rule being built
        rule_id: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// Two rules share an id
    #[error("Duplicate rule id: {0}")]
    DuplicateRuleId(String),

    /// Unknown rule id in configuration
    #[error("Unknown rule id: {0}")]
    UnknownRule(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
