//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use inkwarden_llm::ollama;
use inkwarden_pipeline::PipelineConfig;
use inkwarden_quality::{get_rules, QualityConfig};
use inkwarden_sources::VerifierConfig;
use inkwarden_tracker::TrackerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// CLI configuration (`inkwarden.toml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output settings
    pub settings: Settings,

    /// Source verification
    pub verifier: VerifierConfig,

    /// Run tracking
    pub tracker: TrackerConfig,

    /// Section pipeline, including the citation stage
    pub pipeline: PipelineConfig,

    /// Gate policy and disabled rules
    pub gate: QualityConfig,

    /// Model used by `run`
    pub model: ModelSettings,
}

/// Model endpoint for the section pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Ollama base URL
    pub endpoint: String,

    /// Primary model
    pub model: String,

    /// Model for the length retry; no fallback when unset
    pub fallback_model: Option<String>,

    /// Attempts per request on transient failures
    pub max_retries: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            endpoint: ollama::DEFAULT_ENDPOINT.to_string(),
            model: "llama3".to_string(),
            fallback_model: None,
            max_retries: ollama::DEFAULT_MAX_RETRIES,
        }
    }
}

impl ModelSettings {
    /// Validate the table.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("endpoint must not be empty".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.fallback_model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return Err("fallback_model must not be empty when set".to_string());
        }
        if self.max_retries == 0 {
            return Err("max_retries must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enable colored output
    pub color: bool,

    /// Default output format
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".inkwarden").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist; the default path is optional and
    /// defaults apply when it is missing. `INKWARDEN_SLA_MS` is applied
    /// last.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Self::path()?;
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    debug!(path = %path.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };
        config.with_env()
    }

    /// Parse a configuration file without validating it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Serialize configuration to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Apply environment overrides and validate.
    pub fn with_env(mut self) -> Result<Self> {
        self.tracker = self.tracker.with_env().map_err(CliError::Config)?;
        self.validate()?;
        Ok(self)
    }

    /// Validate every table.
    pub fn validate(&self) -> Result<()> {
        self.verifier
            .validate()
            .map_err(|e| CliError::Config(format!("[verifier] {}", e)))?;
        self.tracker
            .validate()
            .map_err(|e| CliError::Config(format!("[tracker] {}", e)))?;
        self.pipeline
            .validate()
            .map_err(|e| CliError::Config(format!("[pipeline] {}", e)))?;
        self.gate
            .validate(get_rules())
            .map_err(|e| CliError::Config(format!("[gate] {}", e)))?;
        self.model
            .validate()
            .map_err(|e| CliError::Config(format!("[model] {}", e)))?;
        Ok(())
    }
}
