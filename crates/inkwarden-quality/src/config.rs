//! Quality gate configuration

use crate::error::QualityError;
use crate::gate::GatePolicy;
use crate::rules::RuleRegistry;
use serde::{Deserialize, Serialize};

/// Gate configuration (`[gate]` table)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Strictness applied to reports
    pub policy: GatePolicy,

    /// Rule ids excluded from evaluation
    pub disabled_rules: Vec<String>,
}

impl QualityConfig {
    /// Reject on any warn finding, no rules disabled
    pub fn strict() -> Self {
        Self {
            policy: GatePolicy::FailOnWarn,
            disabled_rules: Vec::new(),
        }
    }

    /// Reject only on errors and skip the informational filler check
    pub fn permissive() -> Self {
        Self {
            policy: GatePolicy::FailOnError,
            disabled_rules: vec!["style.ai_filler".to_string()],
        }
    }

    /// Validate against a registry
    pub fn validate(&self, registry: &RuleRegistry) -> Result<(), String> {
        if let Some(unknown) = self.disabled_rules.iter().find(|id| registry.get(id).is_none()) {
            return Err(format!("disabled_rules names unknown rule '{}'", unknown));
        }
        Ok(())
    }

    /// Registry with the disabled rules removed
    pub fn apply(&self, registry: &RuleRegistry) -> Result<RuleRegistry, QualityError> {
        registry.without(&self.disabled_rules)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::get_rules;

    #[test]
    fn test_default_config() {
        let config = QualityConfig::default();
        assert_eq!(config.policy, GatePolicy::FailOnError);
        assert!(config.disabled_rules.is_empty());
        assert!(config.validate(get_rules()).is_ok());
    }

    #[test]
    fn test_presets_validate() {
        assert!(QualityConfig::strict().validate(get_rules()).is_ok());
        assert!(QualityConfig::permissive().validate(get_rules()).is_ok());
    }

    #[test]
    fn test_unknown_rule_rejected() {
        let config = QualityConfig {
            disabled_rules: vec!["no.such.rule".to_string()],
            ..Default::default()
        };
        assert!(config.validate(get_rules()).is_err());
        assert!(config.apply(get_rules()).is_err());
    }

    #[test]
    fn test_apply_removes_rules() {
        let registry = QualityConfig::permissive().apply(get_rules()).unwrap();
        assert!(registry.get("style.ai_filler").is_none());
        assert_eq!(registry.len(), get_rules().len() - 1);
    }

    #[test]
    fn test_toml_roundtrip() {
        let toml = r#"
            policy = "fail-on-warn"
            disabled_rules = ["tone.chicken_soup"]
        "#;
        let config = QualityConfig::from_toml(toml).unwrap();
        assert_eq!(config.policy, GatePolicy::FailOnWarn);
        assert_eq!(config.disabled_rules, vec!["tone.chicken_soup"]);

        let back = QualityConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = QualityConfig::from_toml("").unwrap();
        assert_eq!(config, QualityConfig::default());
    }
}
