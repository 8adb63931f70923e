//! Configuration for run tracking
//!
//! Defines the completed-run capacity, the SLA target and the default
//! summary window.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding [`TrackerConfig::sla_target_ms`]
pub const SLA_ENV: &str = "INKWARDEN_SLA_MS";

/// Configuration for the run tracker (`[tracker]` table)
///
/// # Examples
///
/// ```
/// use inkwarden_tracker::TrackerConfig;
///
/// let config = TrackerConfig::default();
/// assert_eq!(config.max_completed_runs, 1000);
/// assert_eq!(config.sla_target_ms, 300_000);
///
/// let config = TrackerConfig::interactive();
/// assert_eq!(config.sla_target_ms, 60_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Completed runs kept in memory; the oldest are evicted first
    /// Default: 1000
    pub max_completed_runs: usize,

    /// A successful run within this duration meets the SLA
    /// Default: 300000 (five minutes)
    pub sla_target_ms: u64,

    /// Window used when a summary does not name one
    /// Default: 1440 (one day)
    pub default_window_minutes: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_completed_runs: 1000,
            sla_target_ms: 300_000,
            default_window_minutes: 60 * 24,
        }
    }
}

impl TrackerConfig {
    /// Short SLA and window for interactive generation
    ///
    /// - SLA: one minute
    /// - Window: one hour
    pub fn interactive() -> Self {
        Self {
            max_completed_runs: 200,
            sla_target_ms: 60_000,
            default_window_minutes: 60,
        }
    }

    /// Long SLA for batch generation
    ///
    /// - SLA: fifteen minutes
    /// - Window: one week
    pub fn batch() -> Self {
        Self {
            max_completed_runs: 5000,
            sla_target_ms: 15 * 60_000,
            default_window_minutes: 7 * 24 * 60,
        }
    }

    /// Get the SLA target as Duration
    pub fn sla_target(&self) -> Duration {
        Duration::from_millis(self.sla_target_ms)
    }

    /// Override the SLA target from a raw value (typically `INKWARDEN_SLA_MS`)
    pub fn with_sla_override(mut self, raw: Option<&str>) -> Result<Self, String> {
        if let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) {
            self.sla_target_ms = raw
                .parse()
                .map_err(|_| format!("{} must be a whole number of milliseconds, got '{}'", SLA_ENV, raw))?;
        }
        Ok(self)
    }

    /// Apply environment overrides
    pub fn with_env(self) -> Result<Self, String> {
        let raw = std::env::var(SLA_ENV).ok();
        self.with_sla_override(raw.as_deref())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_completed_runs == 0 {
            return Err("max_completed_runs must be > 0".to_string());
        }
        if self.sla_target_ms == 0 {
            return Err("sla_target_ms must be > 0".to_string());
        }
        if self.default_window_minutes == 0 {
            return Err("default_window_minutes must be > 0".to_string());
        }
        Ok(())
    }

    /// Load from TOML
    pub fn from_toml(s: &str) -> Result<Self, String> {
        toml::from_str(s).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize TOML: {}", e))
    }
}
