//! Inkwarden Run Tracker
//!
//! Process-lifetime observability for generation runs: stage events,
//! retries, provider fallbacks, token usage and the final quality score,
//! aggregated into windowed statistics.
//!
//! # Overview
//!
//! A run moves through two states:
//!
//! | State | Entered by | Mutable | Held in |
//! |-------|------------|---------|---------|
//! | **active** | `start` | yes | guarded map keyed by run id |
//! | **completed** | `finish` | no | bounded ring buffer (oldest evicted) |
//!
//! The tracker is an owned value, not a global: construct one per process
//! (or per test) and share it by reference or `Arc`. Retry and fallback
//! reasons are closed enums ([`RetryReason`], [`FallbackReason`]) so
//! aggregation never parses free text. The tracker never decides whether to
//! retry; it only records what the orchestrator did.
//!
//! Every transition emits one `tracing` event: `pipeline.started`,
//! `pipeline.stage`, `pipeline.retry`, `pipeline.fallback`,
//! `pipeline.finished`.
//!
//! # Configuration
//!
//! ```toml
//! [tracker]
//! max_completed_runs = 1000
//! sla_target_ms = 300000
//! default_window_minutes = 1440
//! ```
//!
//! `INKWARDEN_SLA_MS` overrides `sla_target_ms`.
//!
//! # Cancellation
//!
//! An aborted run must still be closed with [`FinishRun::cancelled`], or it
//! stays active for the life of the process.

#![warn(missing_docs)]

mod clock;
mod codes;
mod config;
mod error;
mod record;
mod summary;
mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use codes::{ErrorCode, FallbackReason, QualityBucket, RetryReason, StageStatus};
pub use config::{TrackerConfig, SLA_ENV};
pub use error::TrackerError;
pub use record::{FinishRun, RunId, RunRecord, StageEvent, StageRecord};
pub use summary::{RunSummary, SlaSummary, TokenSummary};
pub use tracker::RunTracker;
