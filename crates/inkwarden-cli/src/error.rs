//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source verification error (including an unmet source minimum)
    #[error("Source error: {0}")]
    Source(#[from] inkwarden_sources::SourceError),

    /// Quality registry error
    #[error("Quality error: {0}")]
    Quality(#[from] inkwarden_quality::QualityError),

    /// Section pipeline error
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] inkwarden_pipeline::PipelineError),

    /// Model provider error
    #[error("Model error: {0}")]
    Llm(#[from] inkwarden_llm::LlmError),

    /// Run tracker error
    #[error("Tracker error: {0}")]
    Tracker(#[from] inkwarden_tracker::TrackerError),

    /// Some article runs failed
    #[error("{failed} of {total} run(s) failed")]
    RunsFailed {
        /// Failed runs
        failed: usize,
        /// Runs attempted
        total: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
