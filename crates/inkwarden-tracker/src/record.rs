//! Run records and the events that build them

use crate::codes::{ErrorCode, FallbackReason, QualityBucket, RetryReason, StageStatus};
use chrono::{DateTime, Utc};
use inkwarden_domain::TokenUsage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new time-ordered run id
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run_{}", self.0.simple())
    }
}

impl std::str::FromStr for RunId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let raw = raw.strip_prefix("run_").unwrap_or(raw);
        Uuid::parse_str(raw)
            .map(RunId)
            .map_err(|e| format!("Invalid run id '{}': {}", s, e))
    }
}

impl From<RunId> for String {
    fn from(id: RunId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for RunId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// One stage event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    /// Stage name (`generate`, `scrub`, `promise`, ...)
    pub stage: String,
    /// Outcome
    pub status: StageStatus,
    /// Time spent, when measured
    pub duration_ms: Option<u64>,
    /// Failure code, when it failed
    pub error_code: Option<ErrorCode>,
    /// When the event was recorded
    pub ts: DateTime<Utc>,
}

/// Stage event as reported by the orchestrator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageEvent {
    /// Stage name
    pub stage: String,
    /// Outcome
    pub status: StageStatus,
    /// Time spent
    pub duration_ms: Option<u64>,
    /// Failure code
    pub error_code: Option<ErrorCode>,
}

impl StageEvent {
    /// A stage that completed normally
    pub fn ok(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            ..Default::default()
        }
    }

    /// A stage accepted with a warning
    pub fn warn(stage: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            stage: stage.into(),
            status: StageStatus::Warn,
            duration_ms: None,
            error_code: Some(code),
        }
    }

    /// A failed stage
    pub fn error(stage: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            stage: stage.into(),
            status: StageStatus::Error,
            duration_ms: None,
            error_code: Some(code),
        }
    }

    /// Attach a duration
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FinishRun {
    /// Whether the run produced an accepted document
    pub success: bool,
    /// Failure code for unsuccessful runs
    pub error_code: Option<ErrorCode>,
    /// Final quality score (0-100)
    pub quality_score: Option<f64>,
}

impl FinishRun {
    /// A successful run
    pub fn succeeded(quality_score: Option<f64>) -> Self {
        Self {
            success: true,
            error_code: None,
            quality_score,
        }
    }

    /// A failed run
    pub fn failed(code: ErrorCode) -> Self {
        Self {
            success: false,
            error_code: Some(code),
            quality_score: None,
        }
    }

    /// A run aborted by the orchestrator
    pub fn cancelled() -> Self {
        Self::failed(ErrorCode::Cancelled)
    }
}

/// Lifecycle of one generation run
///
/// Mutable while active; frozen once finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Run id
    pub run_id: RunId,
    /// Pipeline name
    pub pipeline: String,
    /// Primary model provider
    pub provider: String,
    /// Free-form caller metadata
    pub meta: BTreeMap<String, String>,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// Stage events in order
    pub stages: Vec<StageRecord>,
    /// Retries attempted
    pub retries: u32,
    /// Reason per retry
    pub retry_reasons: Vec<RetryReason>,
    /// Provider switches
    pub fallbacks: u32,
    /// Reason per switch
    pub fallback_reasons: Vec<FallbackReason>,
    /// Accumulated token usage
    pub usage: TokenUsage,
    /// Failure code
    pub error_code: Option<ErrorCode>,
    /// Final quality score
    pub quality_score: Option<f64>,
    /// Band of `quality_score`
    pub quality_bucket: QualityBucket,
    /// `None` while active
    pub success: Option<bool>,
    /// `None` while active
    pub duration_ms: Option<u64>,
}

impl RunRecord {
    pub(crate) fn start(
        pipeline: String,
        provider: String,
        meta: BTreeMap<String, String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id: RunId::new(),
            pipeline,
            provider,
            meta,
            started_at,
            stages: Vec::new(),
            retries: 0,
            retry_reasons: Vec::new(),
            fallbacks: 0,
            fallback_reasons: Vec::new(),
            usage: TokenUsage::default(),
            error_code: None,
            quality_score: None,
            quality_bucket: QualityBucket::Unknown,
            success: None,
            duration_ms: None,
        }
    }

    pub(crate) fn finish(&mut self, outcome: FinishRun, finished_at: DateTime<Utc>) {
        let elapsed = (finished_at - self.started_at).num_milliseconds().max(0);
        self.success = Some(outcome.success);
        self.error_code = outcome.error_code;
        self.duration_ms = Some(elapsed as u64);
        self.quality_score = outcome.quality_score.filter(|s| s.is_finite());
        self.quality_bucket = QualityBucket::from_score(self.quality_score);
    }

    /// Whether the run finished successfully
    pub fn succeeded(&self) -> bool {
        self.success == Some(true)
    }

    /// Whether `finish` has been applied
    pub fn is_finished(&self) -> bool {
        self.success.is_some()
    }
}
