//! Inkwarden Section Pipeline
//!
//! Writes one article section through every trust and quality step,
//! reporting each step into the run tracker.
//!
//! # Architecture
//!
//! ```text
//! prompt → model → clean → inject → strict rewrite (if it smells)
//!        → scrub → promise reconcile → length check (one retry)
//! ```
//!
//! Sections are independent: an orchestrator may run several concurrently
//! against one tracker, while the steps inside a section stay sequential.
//! Model calls are blocking and run under `spawn_blocking`.
//!
//! # Example Usage
//!
//! ```
//! use inkwarden_pipeline::{PipelineConfig, SectionPipeline, SectionRequest};
//! use inkwarden_llm::MockProvider;
//! use inkwarden_sources::Whitelist;
//! use inkwarden_tracker::{FinishRun, RunTracker, TrackerConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tracker = RunTracker::new(TrackerConfig::default())?;
//! let pipeline = SectionPipeline::new(MockProvider::new("<p>...</p>"), PipelineConfig::default())?;
//! let sources = Arc::new(Whitelist::new());
//!
//! let run_id = tracker.start("article", "mock", [("keyword", "失眠")]);
//! let request = SectionRequest::new("睡前習慣", "睡前三十分鐘該做什麼").with_keyword("失眠");
//! match pipeline.run(&tracker, &run_id, &request, &sources).await {
//!     Ok(outcome) => {
//!         println!("{} chars, warnings: {:?}", outcome.char_count(), outcome.warnings);
//!         tracker.finish(&run_id, FinishRun::succeeded(None));
//!     }
//!     Err(e) => {
//!         tracker.finish(&run_id, FinishRun::failed(e.code()));
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod prompt;
mod section;
mod types;


pub use config::{PipelineConfig, MAX_STRICT_REWRITES};
pub use error::PipelineError;
pub use prompt::PromptBuilder;
pub use section::{stages, SectionPipeline};
pub use types::{SectionOutcome, SectionRequest};
