//! Configuration for the section pipeline

use inkwarden_citations::CitationConfig;
use serde::{Deserialize, Serialize};

/// Upper bound on strict rewrites per draft
pub const MAX_STRICT_REWRITES: u32 = 3;

/// Section pipeline configuration (`[pipeline]` table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Plain-text characters below which a section is retried once
    pub min_section_chars: usize,

    /// Strict rewrites allowed per draft when it smells
    pub max_strict_rewrites: u32,

    /// Run the length retry on the fallback provider when one is set
    pub fallback_on_short: bool,

    /// Citation stage settings
    pub citations: CitationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_section_chars: 200,
            max_strict_rewrites: 1,
            fallback_on_short: true,
            citations: CitationConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Longer sections, two rewrite attempts, label substitution
    pub fn strict() -> Self {
        Self {
            min_section_chars: 300,
            max_strict_rewrites: 2,
            fallback_on_short: true,
            citations: CitationConfig::attributing(),
        }
    }

    /// Short sections accepted, no rewrites
    pub fn lenient() -> Self {
        Self {
            min_section_chars: 120,
            max_strict_rewrites: 0,
            fallback_on_short: false,
            citations: CitationConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_section_chars == 0 {
            return Err("min_section_chars must be greater than 0".to_string());
        }
        if self.max_strict_rewrites > MAX_STRICT_REWRITES {
            return Err(format!(
                "max_strict_rewrites cannot exceed {}",
                MAX_STRICT_REWRITES
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
