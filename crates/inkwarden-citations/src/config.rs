//! Citation stage configuration

use serde::{Deserialize, Serialize};

/// What replaces a link whose URL is not on the whitelist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Substitution {
    /// Drop the wrapper, keep the visible text
    #[default]
    RetainText,
    /// Replace the visible text with a whitelisted institution label,
    /// round-robin; falls back to `RetainText` for an empty whitelist
    InstitutionLabel,
}

/// Citation stage configuration (`[citations]` table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitationConfig {
    /// Handling of links outside the whitelist
    pub substitution: Substitution,

    /// Flag unsourced statistics ("根據調查", "35%") as a smell
    pub flag_statistics: bool,

    /// Flag listicle and booklist cues as a smell
    pub flag_listicles: bool,
}

impl Default for CitationConfig {
    fn default() -> Self {
        Self {
            substitution: Substitution::RetainText,
            flag_statistics: true,
            flag_listicles: true,
        }
    }
}

impl CitationConfig {
    /// Substitute unlisted link text with whitelisted labels
    pub fn attributing() -> Self {
        Self {
            substitution: Substitution::InstitutionLabel,
            ..Self::default()
        }
    }

    /// Whether any smell detector is enabled
    pub fn detects_smells(&self) -> bool {
        self.flag_statistics || self.flag_listicles
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
