//! Accept/reject decisions over a quality report

use crate::report::QualityReport;
use crate::rules::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operator-selected strictness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GatePolicy {
    /// Reject only on error findings (same as `report.pass`)
    #[default]
    FailOnError,
    /// Reject on error or warn findings
    FailOnWarn,
    /// Reject on any finding
    FailOnInfo,
}

impl GatePolicy {
    /// Whether a finding of `severity` blocks under this policy
    pub fn blocks(&self, severity: Severity) -> bool {
        match self {
            GatePolicy::FailOnError => severity == Severity::Error,
            GatePolicy::FailOnWarn => severity != Severity::Info,
            GatePolicy::FailOnInfo => true,
        }
    }

    /// Kebab-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            GatePolicy::FailOnError => "fail-on-error",
            GatePolicy::FailOnWarn => "fail-on-warn",
            GatePolicy::FailOnInfo => "fail-on-info",
        }
    }

    /// Evaluate a report
    pub fn evaluate(&self, report: &QualityReport) -> GateDecision {
        let blocking: Vec<String> = report
            .findings()
            .iter()
            .filter(|f| self.blocks(f.severity))
            .map(|f| f.rule_id.clone())
            .collect();
        GateDecision {
            accepted: blocking.is_empty(),
            policy: *self,
            blocking,
        }
    }
}

impl fmt::Display for GatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-on-error" | "error" => Ok(GatePolicy::FailOnError),
            "fail-on-warn" | "warn" => Ok(GatePolicy::FailOnWarn),
            "fail-on-info" | "info" => Ok(GatePolicy::FailOnInfo),
            other => Err(format!(
                "unknown gate policy '{}' (expected fail-on-error, fail-on-warn or fail-on-info)",
                other
            )),
        }
    }
}

/// Outcome of a gate evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDecision {
    /// Whether the document is accepted
    pub accepted: bool,
    /// Policy applied
    pub policy: GatePolicy,
    /// Rule ids that blocked acceptance
    pub blocking: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{FieldHits, Finding};
    use chrono::Utc;
    use inkwarden_domain::ContentDomain;

    fn finding(id: &str, severity: Severity) -> Finding {
        Finding {
            rule_id: id.to_string(),
            severity,
            message: String::new(),
            total_count: 1,
            fields: vec![FieldHits {
                field: "title".to_string(),
                count: 1,
                samples: vec![],
            }],
        }
    }

    fn report(findings: Vec<Finding>) -> QualityReport {
        QualityReport::from_findings(findings, ContentDomain::General, Utc::now())
    }

    #[test]
    fn test_fail_on_error_matches_pass() {
        let warn_only = report(vec![finding("w", Severity::Warn)]);
        let decision = GatePolicy::FailOnError.evaluate(&warn_only);
        assert!(decision.accepted);
        assert_eq!(decision.accepted, warn_only.pass());

        let with_error = report(vec![finding("e", Severity::Error)]);
        assert!(!GatePolicy::FailOnError.evaluate(&with_error).accepted);
    }

    #[test]
    fn test_fail_on_warn() {
        let r = report(vec![finding("i", Severity::Info), finding("w", Severity::Warn)]);
        let decision = GatePolicy::FailOnWarn.evaluate(&r);
        assert!(!decision.accepted);
        assert_eq!(decision.blocking, vec!["w"]);
    }

    #[test]
    fn test_fail_on_info() {
        let r = report(vec![finding("i", Severity::Info)]);
        assert!(!GatePolicy::FailOnInfo.evaluate(&r).accepted);
        assert!(GatePolicy::FailOnInfo.evaluate(&report(vec![])).accepted);
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!("fail-on-warn".parse::<GatePolicy>().unwrap(), GatePolicy::FailOnWarn);
        assert_eq!("ERROR".parse::<GatePolicy>().unwrap(), GatePolicy::FailOnError);
        assert!("sometimes".parse::<GatePolicy>().is_err());
        assert_eq!(GatePolicy::default().to_string(), "fail-on-error");
    }
}
