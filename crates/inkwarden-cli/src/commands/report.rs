//! Report command implementation.

use super::{parse_document, read_input, Outcome};
use crate::cli::ReportArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use inkwarden_domain::{ContentDomain, Document};
use inkwarden_quality::{get_rules, GateDecision, GatePolicy, QualityConfig, QualityReport, ReportGenerator};
use tracing::info;

/// Execute the report command.
pub async fn execute_report(args: ReportArgs, config: &Config, formatter: &Formatter) -> Result<Outcome> {
    let doc = parse_document(&read_input(&args.document)?)?;
    let domain = args
        .domain
        .unwrap_or_else(|| ContentDomain::detect(args.keyword.as_deref().unwrap_or(""), &doc.title));
    let policy = args.policy.unwrap_or(config.gate.policy);

    let (report, decision) = gate(&doc, domain, &config.gate, policy)?;
    println!("{}", formatter.format_report(&report, &decision)?);

    Ok(outcome(&decision))
}

/// Build the report with the configured registry and apply `policy`.
pub(crate) fn gate(
    doc: &Document,
    domain: ContentDomain,
    gate: &QualityConfig,
    policy: GatePolicy,
) -> Result<(QualityReport, GateDecision)> {
    let registry = gate.apply(get_rules())?;
    let report = ReportGenerator::new(&registry).generate(doc, domain);
    let decision = policy.evaluate(&report);

    info!(
        domain = %domain,
        findings = report.summary().total,
        errors = report.summary().error,
        policy = %policy,
        accepted = decision.accepted,
        "quality gate evaluated"
    );
    Ok((report, decision))
}

pub(crate) fn outcome(decision: &GateDecision) -> Outcome {
    if decision.accepted {
        Outcome::Accepted
    } else {
        Outcome::GateFailed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwarden_domain::Section;

    fn doc_with_anchor() -> Document {
        Document {
            title: "睡眠指南".to_string(),
            sections: vec![Section::new(
                "睡前習慣",
                "<p>詳見 <a href=\"https://fake.example\">這裡</a></p>",
            )],
            ..Default::default()
        }
    }

    #[test]
    fn test_anchor_fails_gate() {
        let (report, decision) = gate(
            &doc_with_anchor(),
            ContentDomain::Health,
            &QualityConfig::default(),
            GatePolicy::FailOnError,
        )
        .unwrap();
        assert!(!report.pass());
        assert_eq!(outcome(&decision), Outcome::GateFailed);
    }

    #[test]
    fn test_disabled_rule_is_skipped() {
        let config = QualityConfig {
            disabled_rules: vec!["format.no_anchor_tags".to_string()],
            ..Default::default()
        };
        let (report, _) = gate(&doc_with_anchor(), ContentDomain::Health, &config, GatePolicy::FailOnError).unwrap();
        assert!(report.finding("format.no_anchor_tags").is_none());
    }

    #[test]
    fn test_empty_document_passes() {
        let (report, decision) = gate(
            &Document::default(),
            ContentDomain::General,
            &QualityConfig::default(),
            GatePolicy::FailOnError,
        )
        .unwrap();
        assert!(report.pass());
        assert_eq!(outcome(&decision), Outcome::Accepted);
    }
}
