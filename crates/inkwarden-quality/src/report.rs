//! Quality report generation

use crate::rules::{get_rules, RuleRegistry, Scope, Severity};
use chrono::{DateTime, Utc};
use inkwarden_domain::{ContentDomain, ContentField, Document, FieldKind};
use serde::{Deserialize, Serialize};

/// Field name used for article-scope findings
pub const ARTICLE_FIELD: &str = "article";

/// Hits of one rule in one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldHits {
    /// Field path, or `article` for article-scope rules
    pub field: String,
    /// Hits in this field
    pub count: usize,
    /// Bounded samples
    pub samples: Vec<String>,
}

/// One rule's result against one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Rule id
    pub rule_id: String,
    /// Rule severity
    pub severity: Severity,
    /// Rule guidance
    pub message: String,
    /// Sum of `fields[].count`
    pub total_count: usize,
    /// Per-field hits, in field order
    pub fields: Vec<FieldHits>,
}

/// Finding counts by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of findings
    pub total: usize,
    /// Error findings
    pub error: usize,
    /// Warn findings
    pub warn: usize,
    /// Info findings
    pub info: usize,
}

impl ReportSummary {
    fn from_findings(findings: &[Finding]) -> Self {
        findings.iter().fold(Self::default(), |mut acc, f| {
            acc.total += 1;
            match f.severity {
                Severity::Error => acc.error += 1,
                Severity::Warn => acc.warn += 1,
                Severity::Info => acc.info += 1,
            }
            acc
        })
    }

    /// Count for one severity
    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Error => self.error,
            Severity::Warn => self.warn,
            Severity::Info => self.info,
        }
    }
}

/// Aggregate verdict for one document
///
/// `pass` and `summary` are always derived from `findings`; deserializing
/// recomputes them, so a stored report can't carry an inconsistent verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ReportWire")]
pub struct QualityReport {
    pass: bool,
    summary: ReportSummary,
    findings: Vec<Finding>,
    domain: ContentDomain,
    generated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ReportWire {
    #[serde(default)]
    findings: Vec<Finding>,
    #[serde(default)]
    domain: ContentDomain,
    generated_at: DateTime<Utc>,
}

impl From<ReportWire> for QualityReport {
    fn from(wire: ReportWire) -> Self {
        QualityReport::from_findings(wire.findings, wire.domain, wire.generated_at)
    }
}

impl QualityReport {
    /// Build a report, computing `pass` and `summary`
    pub fn from_findings(findings: Vec<Finding>, domain: ContentDomain, generated_at: DateTime<Utc>) -> Self {
        let summary = ReportSummary::from_findings(&findings);
        Self {
            pass: summary.error == 0,
            summary,
            findings,
            domain,
            generated_at,
        }
    }

    /// True iff there are no error findings
    pub fn pass(&self) -> bool {
        self.pass
    }

    /// Counts by severity
    pub fn summary(&self) -> &ReportSummary {
        &self.summary
    }

    /// Findings in rule order
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Domain the report was generated for
    pub fn domain(&self) -> ContentDomain {
        self.domain
    }

    /// Generation timestamp
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Finding for one rule, if it fired
    pub fn finding(&self, rule_id: &str) -> Option<&Finding> {
        self.findings.iter().find(|f| f.rule_id == rule_id)
    }

    /// Score in [0, 100]: 100 less a fixed deduction per finding
    ///
    /// Each finding counts once regardless of how many hits it has.
    pub fn score(&self) -> f64 {
        let deduction = SCORE_PENALTY_ERROR * self.summary.error
            + SCORE_PENALTY_WARN * self.summary.warn
            + SCORE_PENALTY_INFO * self.summary.info;
        100usize.saturating_sub(deduction) as f64
    }
}

/// Score deducted per error finding
pub const SCORE_PENALTY_ERROR: usize = 25;
/// Score deducted per warn finding
pub const SCORE_PENALTY_WARN: usize = 8;
/// Score deducted per info finding
pub const SCORE_PENALTY_INFO: usize = 2;

/// Evaluates a registry against documents
///
/// Holds no mutable state; one generator can serve concurrent callers.
#[derive(Debug, Clone, Copy)]
pub struct ReportGenerator<'r> {
    registry: &'r RuleRegistry,
}

impl<'r> ReportGenerator<'r> {
    /// Create a generator over `registry`
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self { registry }
    }

    /// Evaluate every applicable rule
    ///
    /// Output depends only on the document, the domain and the registry.
    pub fn findings(&self, doc: &Document, domain: ContentDomain) -> Vec<Finding> {
        let fields = doc.fields();
        let article = article_text(&fields);

        self.registry
            .rules()
            .iter()
            .filter(|rule| rule.applies_to(domain))
            .filter_map(|rule| {
                let hits: Vec<FieldHits> = match rule.scope {
                    Scope::Field => fields
                        .iter()
                        .filter_map(|field| {
                            let result = rule.scan(field_input(field));
                            result.is_hit().then(|| FieldHits {
                                field: field.name.clone(),
                                count: result.count,
                                samples: result.samples,
                            })
                        })
                        .collect(),
                    Scope::Article => {
                        let result = rule.scan(&article);
                        if result.is_hit() {
                            vec![FieldHits {
                                field: ARTICLE_FIELD.to_string(),
                                count: result.count,
                                samples: result.samples,
                            }]
                        } else {
                            Vec::new()
                        }
                    }
                };

                let total_count: usize = hits.iter().map(|h| h.count).sum();
                (total_count > 0).then(|| Finding {
                    rule_id: rule.id.clone(),
                    severity: rule.severity,
                    message: rule.message.clone(),
                    total_count,
                    fields: hits,
                })
            })
            .collect()
    }

    /// Generate a report stamped with the current time
    pub fn generate(&self, doc: &Document, domain: ContentDomain) -> QualityReport {
        self.generate_at(doc, domain, Utc::now())
    }

    /// Generate a report with an explicit timestamp
    pub fn generate_at(&self, doc: &Document, domain: ContentDomain, now: DateTime<Utc>) -> QualityReport {
        QualityReport::from_findings(self.findings(doc, domain), domain, now)
    }
}

/// Generate a report with the built-in rules
///
/// # Examples
///
/// ```
/// use inkwarden_domain::{ContentDomain, Document, Section};
/// use inkwarden_quality::generate_report;
///
/// let mut doc = Document::default();
/// doc.title = "東京自由行".to_string();
/// doc.sections.push(Section::new("交通", r#"<p>詳見 <a href="https://x.tw">官網</a></p>"#));
///
/// let report = generate_report(&doc, ContentDomain::General);
/// assert!(!report.pass());
/// assert!(report.finding("format.no_anchor_tags").is_some());
/// ```
pub fn generate_report(doc: &Document, domain: ContentDomain) -> QualityReport {
    ReportGenerator::new(get_rules()).generate(doc, domain)
}

fn field_input(field: &ContentField) -> &str {
    match field.kind {
        FieldKind::Html => &field.value,
        FieldKind::PlainText => field.value.trim(),
    }
}

fn article_text(fields: &[ContentField]) -> String {
    fields
        .iter()
        .map(|f| f.value.as_str())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwarden_domain::Section;

    fn doc_with(html: &str) -> Document {
        Document {
            title: "測試文章".to_string(),
            sections: vec![Section::new("段落", html)],
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_document_passes() {
        let report = generate_report(&doc_with("<p>這是一段乾淨的內容。</p>"), ContentDomain::General);
        assert!(report.pass());
        assert_eq!(report.summary().total, 0);
        assert!(report.findings().is_empty());
    }

    #[test]
    fn test_anchor_fails_gate() {
        let report = generate_report(
            &doc_with(r#"<p>請看 <a href="https://a.example/x">這裡</a></p>"#),
            ContentDomain::General,
        );
        assert!(!report.pass());
        let anchor = report.finding("format.no_anchor_tags").unwrap();
        assert_eq!(anchor.total_count, 1);
        assert_eq!(anchor.fields[0].field, "content.sections[0].html");

        // the URL lives in an attribute; plain text is stripped of it
        let urls = report.finding("format.no_raw_urls").unwrap();
        assert_eq!(urls.fields.len(), 1);
    }

    #[test]
    fn test_empty_anchor_is_still_flagged() {
        let report = generate_report(&doc_with(r#"<a href="https://x.example"></a>"#), ContentDomain::General);
        assert!(!report.pass());
        let anchor = report.finding("format.no_anchor_tags").unwrap();
        assert_eq!(anchor.fields[0].field, "content.sections[0].html");
    }

    #[test]
    fn test_counts_aggregate_across_fields() {
        let doc = Document {
            title: "您的旅程".to_string(),
            sections: vec![Section::new("段落", "<p>您好</p>")],
            ..Default::default()
        };
        let report = generate_report(&doc, ContentDomain::General);
        let finding = report.finding("taiwan.pronoun.avoid_nin").unwrap();
        // title, section html, section plain text
        assert_eq!(finding.fields.len(), 3);
        assert_eq!(finding.total_count, finding.fields.iter().map(|f| f.count).sum::<usize>());
        assert_eq!(finding.severity, Severity::Warn);
        assert!(report.pass());
    }

    #[test]
    fn test_score_deducts_per_finding() {
        assert_eq!(generate_report(&Document::default(), ContentDomain::General).score(), 100.0);

        let finding = |rule_id: &str, severity| Finding {
            rule_id: rule_id.to_string(),
            severity,
            message: String::new(),
            total_count: 3,
            fields: Vec::new(),
        };
        let report = QualityReport::from_findings(
            vec![finding("a", Severity::Error), finding("b", Severity::Warn), finding("c", Severity::Info)],
            ContentDomain::General,
            Utc::now(),
        );
        assert_eq!(report.score(), 65.0);

        let report = QualityReport::from_findings(
            (0..5).map(|i| finding(&format!("e{}", i), Severity::Error)).collect(),
            ContentDomain::General,
            Utc::now(),
        );
        assert_eq!(report.score(), 0.0);
    }

    #[test]
    fn test_summary_matches_findings() {
        let report = generate_report(
            &doc_with("<p>在這篇文章中，我們將深入探討 https://x.example/a 的內容，立即行動！</p>"),
            ContentDomain::General,
        );
        let summary = report.summary();
        assert_eq!(summary.total, report.findings().len());
        assert_eq!(summary.error + summary.warn + summary.info, summary.total);
        assert_eq!(report.pass(), summary.error == 0);
        assert_eq!(summary.count(Severity::Error), 1);
    }

    #[test]
    fn test_generate_at_is_stable() {
        let doc = doc_with("<p>眾所周知，你值得更好的。</p>");
        let now = Utc::now();
        let generator = ReportGenerator::new(get_rules());
        assert_eq!(
            generator.generate_at(&doc, ContentDomain::General, now),
            generator.generate_at(&doc, ContentDomain::General, now)
        );
    }

    #[test]
    fn test_deserialize_recomputes_verdict() {
        let json = r#"{
            "pass": true,
            "summary": {"total": 0, "error": 0, "warn": 0, "info": 0},
            "findings": [{
                "rule_id": "format.no_raw_urls",
                "severity": "error",
                "message": "m",
                "total_count": 1,
                "fields": [{"field": "title", "count": 1, "samples": ["https://x"]}]
            }],
            "domain": "travel",
            "generated_at": "2025-01-01T00:00:00Z"
        }"#;
        let report: QualityReport = serde_json::from_str(json).unwrap();
        assert!(!report.pass());
        assert_eq!(report.summary().error, 1);
        assert_eq!(report.domain(), ContentDomain::Travel);
    }

    #[test]
    fn test_serialized_shape() {
        let report = generate_report(&doc_with("<p>ok</p>"), ContentDomain::Health);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["pass"], true);
        assert_eq!(value["summary"]["total"], 0);
        assert_eq!(value["domain"], "health");
        assert!(value["generated_at"].is_string());
    }
}
