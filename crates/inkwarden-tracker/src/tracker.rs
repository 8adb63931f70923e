//! Run lifecycle tracking

use crate::clock::{Clock, SystemClock};
use crate::codes::{FallbackReason, RetryReason, StageStatus};
use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::record::{FinishRun, RunId, RunRecord, StageEvent, StageRecord};
use crate::summary::RunSummary;
use inkwarden_domain::TokenUsage;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error, info, warn};

/// Owns every run record for its lifetime
///
/// A run is active from [`start`](Self::start) until [`finish`](Self::finish),
/// then frozen into a ring buffer of completed runs; past capacity the
/// oldest run is evicted in the same critical section as the insert.
/// Recording against an unknown or finished run is a no-op.
///
/// Active and completed runs sit behind separate locks. `finish` and
/// [`summary`](Self::summary) take both, always active first, so a run is
/// seen exactly once: either active or completed.
///
/// # Examples
///
/// ```
/// use inkwarden_tracker::{FinishRun, RetryReason, RunTracker, StageEvent, TrackerConfig};
///
/// let tracker = RunTracker::new(TrackerConfig::default()).unwrap();
/// let run = tracker.start("article", "gemini", [("keyword", "睡眠")]);
/// tracker.record_stage(&run, StageEvent::ok("outline").with_duration_ms(1200));
/// tracker.record_retry(&run, "section", RetryReason::SectionContentTooShort, None);
///
/// let record = tracker.finish(&run, FinishRun::succeeded(Some(88.0))).unwrap();
/// assert_eq!(record.retries, 1);
/// assert!(tracker.finish(&run, FinishRun::succeeded(None)).is_none());
///
/// let summary = tracker.summary(None);
/// assert_eq!(summary.total_runs, 1);
/// assert_eq!(summary.retry_rate, 1.0);
/// ```
#[derive(Debug)]
pub struct RunTracker<C: Clock = SystemClock> {
    config: TrackerConfig,
    clock: C,
    active: RwLock<HashMap<RunId, RunRecord>>,
    completed: RwLock<VecDeque<RunRecord>>,
}

impl RunTracker<SystemClock> {
    /// Create a tracker on the wall clock
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Config` for an invalid configuration.
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> RunTracker<C> {
    /// Create a tracker on a custom clock
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Config` for an invalid configuration.
    pub fn with_clock(config: TrackerConfig, clock: C) -> Result<Self, TrackerError> {
        config.validate().map_err(TrackerError::Config)?;
        let capacity = config.max_completed_runs.min(1024);
        Ok(Self {
            config,
            clock,
            active: RwLock::new(HashMap::new()),
            completed: RwLock::new(VecDeque::with_capacity(capacity)),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Open a run
    pub fn start<K, V>(
        &self,
        pipeline: impl Into<String>,
        provider: impl Into<String>,
        meta: impl IntoIterator<Item = (K, V)>,
    ) -> RunId
    where
        K: Into<String>,
        V: Into<String>,
    {
        let meta: BTreeMap<String, String> = meta.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        let run = RunRecord::start(pipeline.into(), provider.into(), meta, self.clock.now());
        let run_id = run.run_id;

        info!(
            run_id = %run_id,
            pipeline = %run.pipeline,
            provider = %run.provider,
            meta = ?run.meta,
            "pipeline.started"
        );
        self.write_active().insert(run_id, run);
        run_id
    }

    /// Append a stage event; false if the run is not active
    pub fn record_stage(&self, run_id: &RunId, event: StageEvent) -> bool {
        let ts = self.clock.now();
        self.with_active(run_id, |run| {
            match event.status {
                StageStatus::Error => error!(
                    run_id = %run_id,
                    pipeline = %run.pipeline,
                    stage = %event.stage,
                    status = %event.status,
                    duration_ms = ?event.duration_ms,
                    error_code = ?event.error_code,
                    "pipeline.stage"
                ),
                _ => info!(
                    run_id = %run_id,
                    pipeline = %run.pipeline,
                    stage = %event.stage,
                    status = %event.status,
                    duration_ms = ?event.duration_ms,
                    error_code = ?event.error_code,
                    "pipeline.stage"
                ),
            }
            run.stages.push(StageRecord {
                stage: event.stage,
                status: event.status,
                duration_ms: event.duration_ms,
                error_code: event.error_code,
                ts,
            });
        })
    }

    /// Count a retry; false if the run is not active
    pub fn record_retry(&self, run_id: &RunId, stage: &str, reason: RetryReason, provider: Option<&str>) -> bool {
        self.with_active(run_id, |run| {
            run.retries += 1;
            run.retry_reasons.push(reason);
            warn!(
                run_id = %run_id,
                pipeline = %run.pipeline,
                stage,
                provider = provider.unwrap_or(run.provider.as_str()),
                reason_code = %reason,
                retry_count = run.retries,
                "pipeline.retry"
            );
        })
    }

    /// Count a provider switch; false if the run is not active
    pub fn record_fallback(&self, run_id: &RunId, from_provider: &str, to_provider: &str, reason: FallbackReason) -> bool {
        self.with_active(run_id, |run| {
            run.fallbacks += 1;
            run.fallback_reasons.push(reason);
            warn!(
                run_id = %run_id,
                pipeline = %run.pipeline,
                from_provider,
                to_provider,
                reason_code = %reason,
                fallback_count = run.fallbacks,
                "pipeline.fallback"
            );
        })
    }

    /// Add token usage; false if the run is not active
    pub fn record_tokens(&self, run_id: &RunId, usage: TokenUsage) -> bool {
        self.with_active(run_id, |run| {
            run.usage += usage;
            debug!(run_id = %run_id, total_tokens = run.usage.total(), "tokens recorded");
        })
    }

    /// Close a run and move it to the completed buffer
    ///
    /// Returns `None` for an unknown run id or a run already finished.
    pub fn finish(&self, run_id: &RunId, outcome: FinishRun) -> Option<RunRecord> {
        let mut active = self.write_active();
        let mut run = active.remove(run_id)?;
        run.finish(outcome, self.clock.now());

        if run.succeeded() {
            info!(
                run_id = %run_id,
                pipeline = %run.pipeline,
                success = true,
                duration_ms = ?run.duration_ms,
                retries = run.retries,
                fallbacks = run.fallbacks,
                total_tokens = run.usage.total(),
                quality_score = ?run.quality_score,
                quality_bucket = %run.quality_bucket,
                "pipeline.finished"
            );
        } else {
            error!(
                run_id = %run_id,
                pipeline = %run.pipeline,
                success = false,
                error_code = ?run.error_code,
                duration_ms = ?run.duration_ms,
                retries = run.retries,
                fallbacks = run.fallbacks,
                total_tokens = run.usage.total(),
                "pipeline.finished"
            );
        }

        let mut completed = self.write_completed();
        completed.push_back(run.clone());
        while completed.len() > self.config.max_completed_runs {
            completed.pop_front();
        }
        drop(completed);
        drop(active);
        Some(run)
    }

    /// Statistics over runs started within the trailing window
    ///
    /// `None` uses the configured default window. Never mutates state.
    pub fn summary(&self, window_minutes: Option<u64>) -> RunSummary {
        let window_minutes = window_minutes.unwrap_or(self.config.default_window_minutes);

        let active = self.read_active();
        let completed = self.read_completed();
        RunSummary::within_window(
            completed.iter(),
            self.clock.now(),
            window_minutes,
            self.config.sla_target_ms,
            active.len(),
        )
    }

    /// Snapshot of an active run
    pub fn active_run(&self, run_id: &RunId) -> Option<RunRecord> {
        self.read_active().get(run_id).cloned()
    }

    /// Number of active runs
    pub fn active_runs(&self) -> usize {
        self.read_active().len()
    }

    /// Up to `limit` most recent completed runs, newest first
    pub fn recent(&self, limit: usize) -> Vec<RunRecord> {
        self.read_completed().iter().rev().take(limit).cloned().collect()
    }

    /// Number of completed runs held
    pub fn completed_runs(&self) -> usize {
        self.read_completed().len()
    }

    fn with_active<F>(&self, run_id: &RunId, update: F) -> bool
    where
        F: FnOnce(&mut RunRecord),
    {
        match self.write_active().get_mut(run_id) {
            Some(run) => {
                update(run);
                true
            }
            None => {
                debug!(run_id = %run_id, "ignoring event for inactive run");
                false
            }
        }
    }

    // A poisoned lock only follows a panic while recording; the data is still usable.
    fn read_active(&self) -> RwLockReadGuard<'_, HashMap<RunId, RunRecord>> {
        self.active.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_active(&self) -> RwLockWriteGuard<'_, HashMap<RunId, RunRecord>> {
        self.active.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_completed(&self) -> RwLockReadGuard<'_, VecDeque<RunRecord>> {
        self.completed.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_completed(&self) -> RwLockWriteGuard<'_, VecDeque<RunRecord>> {
        self.completed.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
