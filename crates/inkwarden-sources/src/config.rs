//! Configuration for the Source Verifier

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Content-farm, blog-platform and raw-gazette hosts never used as sources
pub const DEFAULT_BLOCKED_DOMAINS: &[&str] = &[
    "kknews.cc",
    "read01.com",
    "ppfocus.com",
    "zhuanlan.zhihu.com",
    "pixnet.net",
    "xuite.net",
    "blogspot.com",
    "wordpress.com",
    "dailyheadlines.cc",
    "twgreatdaily.com",
    "ppg.ly.gov.tw",
    "gazette.nat.gov.tw",
];

/// Body phrases that mark an HTTP 200 as a missing page
pub const DEFAULT_SOFT_404_PHRASES: &[&str] = &[
    "網址不存在",
    "page not found",
    "404 not found",
    "找不到網頁",
    "頁面不存在",
    "無法找到該頁面",
    "sorry, the page you are looking for could not be found",
];

/// Configuration for the Source Verifier (`[verifier]` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Timeout for one accessibility fetch (seconds)
    pub access_timeout_secs: u64,

    /// Run the live accessibility layer
    pub check_accessibility: bool,

    /// Concurrent checks in a batch
    pub max_concurrency: usize,

    /// Characters of page text kept for deep reading
    pub content_excerpt_chars: usize,

    /// Minimum keyword-token overlap ratio (0.0-1.0)
    pub relevance_threshold: f64,

    /// Credibility points removed from irrelevant sources
    pub relevance_penalty: u8,

    /// Host substrings rejected by the format layer
    pub blocked_domains: Vec<String>,

    /// Lowercase body phrases treated as a missing page
    pub soft_404_phrases: Vec<String>,

    /// Sources kept after ranking
    pub max_sources: usize,

    /// User-Agent sent with accessibility fetches
    pub user_agent: String,
}

impl VerifierConfig {
    /// Get the accessibility timeout as a Duration
    pub fn access_timeout(&self) -> Duration {
        Duration::from_secs(self.access_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.access_timeout_secs == 0 {
            return Err("access_timeout_secs must be greater than 0".to_string());
        }
        if !(1..=16).contains(&self.max_concurrency) {
            return Err("max_concurrency must be between 1 and 16".to_string());
        }
        if self.content_excerpt_chars == 0 {
            return Err("content_excerpt_chars must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.relevance_threshold) {
            return Err("relevance_threshold must be between 0.0 and 1.0".to_string());
        }
        if self.relevance_penalty > 100 {
            return Err("relevance_penalty cannot exceed 100".to_string());
        }
        if self.max_sources == 0 {
            return Err("max_sources must be greater than 0".to_string());
        }
        if self.user_agent.trim().is_empty() {
            return Err("user_agent cannot be empty".to_string());
        }
        Ok(())
    }

    /// Offline preset: format and relevance layers only
    pub fn offline() -> Self {
        Self {
            check_accessibility: false,
            ..Self::default()
        }
    }

    /// Strict preset: higher relevance bar and a bigger penalty
    pub fn strict() -> Self {
        Self {
            relevance_threshold: 0.5,
            relevance_penalty: 30,
            max_concurrency: 3,
            ..Self::default()
        }
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

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            access_timeout_secs: 5,
            check_accessibility: true,
            max_concurrency: 4,
            content_excerpt_chars: 1500,
            relevance_threshold: 0.3,
            relevance_penalty: 15,
            blocked_domains: DEFAULT_BLOCKED_DOMAINS.iter().map(|d| d.to_string()).collect(),
            soft_404_phrases: DEFAULT_SOFT_404_PHRASES.iter().map(|p| p.to_string()).collect(),
            max_sources: 3,
            user_agent: concat!("inkwarden-verifier/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = VerifierConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.access_timeout(), Duration::from_secs(5));
        assert_eq!(config.blocked_domains.len(), DEFAULT_BLOCKED_DOMAINS.len());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(VerifierConfig::offline().validate().is_ok());
        assert!(!VerifierConfig::offline().check_accessibility);
        assert!(VerifierConfig::strict().validate().is_ok());
    }

    #[test]
    fn test_invalid_concurrency() {
        let mut config = VerifierConfig::default();
        config.max_concurrency = 0;
        assert!(config.validate().is_err());
        config.max_concurrency = 17;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_threshold() {
        let mut config = VerifierConfig::default();
        config.relevance_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = VerifierConfig::from_toml("max_sources = 5\ncheck_accessibility = false").unwrap();
        assert_eq!(config.max_sources, 5);
        assert!(!config.check_accessibility);
        assert_eq!(config.access_timeout_secs, 5);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = VerifierConfig::strict();
        let parsed = VerifierConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
