//! Output formatting for the CLI.

use crate::commands::run::ArticleRun;
use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use inkwarden_citations::ScrubStats;
use inkwarden_domain::Document;
use inkwarden_promise::Promise;
use inkwarden_quality::{GateDecision, QualityReport};
use inkwarden_sources::BatchReport;
use inkwarden_tracker::RunSummary;
use std::collections::BTreeSet;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Samples shown per finding in table output
const TABLE_SAMPLES: usize = 2;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Whether output is machine-readable.
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Format a quality report and the gate decision over it.
    pub fn format_report(&self, report: &QualityReport, decision: &GateDecision) -> Result<String> {
        if self.is_json() {
            let value = serde_json::json!({
                "report": report,
                "gate": decision,
            });
            return Ok(serde_json::to_string_pretty(&value)?);
        }

        let summary = report.summary();
        let mut out = Vec::new();
        let verdict = if report.pass() {
            self.success("PASS")
        } else {
            self.error("FAIL")
        };
        out.push(format!(
            "{}  domain={}  findings={} (error {}, warn {}, info {})",
            verdict,
            report.domain(),
            summary.total,
            summary.error,
            summary.warn,
            summary.info
        ));

        if !report.findings().is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Rule", "Severity", "Count", "Fields", "Samples"]);
            for finding in report.findings() {
                let fields = finding
                    .fields
                    .iter()
                    .map(|f| format!("{}×{}", f.field, f.count))
                    .collect::<Vec<_>>()
                    .join(", ");
                let samples = finding
                    .fields
                    .iter()
                    .flat_map(|f| f.samples.iter())
                    .take(TABLE_SAMPLES)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(" | ");
                builder.push_record([
                    finding.rule_id.clone(),
                    finding.severity.to_string(),
                    finding.total_count.to_string(),
                    fields,
                    samples,
                ]);
            }
            out.push(self.table(builder));
        }

        out.push(if decision.accepted {
            self.success(&format!("Gate accepted ({})", decision.policy))
        } else {
            self.error(&format!(
                "Gate rejected ({}): {}",
                decision.policy,
                decision.blocking.join(", ")
            ))
        });
        Ok(out.join("\n"))
    }

    /// Format a scrubbed document, optionally with the gate over it.
    pub fn format_scrub(
        &self,
        document: &Document,
        stats: &ScrubStats,
        gate: Option<(&QualityReport, &GateDecision)>,
    ) -> Result<String> {
        if self.is_json() {
            let mut value = serde_json::json!({
                "document": document,
                "scrub": stats,
            });
            if let Some((report, decision)) = gate {
                value["report"] = serde_json::to_value(report)?;
                value["gate"] = serde_json::to_value(decision)?;
            }
            return Ok(serde_json::to_string_pretty(&value)?);
        }

        let mut builder = Builder::default();
        builder.push_record(["Links", "Whitelisted", "Unlisted", "Relabeled", "Unwrapped", "Bare URLs"]);
        builder.push_record([
            stats.total.to_string(),
            stats.valid.to_string(),
            stats.invalid.to_string(),
            stats.replaced.to_string(),
            stats.removed.to_string(),
            stats.bare_urls_removed.to_string(),
        ]);

        let headline = if stats.is_clean() {
            self.success("No links found")
        } else {
            self.warning("Links removed")
        };
        let mut out = format!("{}\n{}", headline, self.table(builder));
        if let Some((report, decision)) = gate {
            out.push('\n');
            out.push_str(&self.format_report(report, decision)?);
        }
        Ok(out)
    }

    /// Format a source verification batch.
    pub fn format_verification(&self, report: &BatchReport) -> Result<String> {
        if self.is_json() {
            let value = serde_json::json!({
                "whitelist": report.whitelist,
                "rejections": report.rejections,
                "low_relevance": report.low_relevance,
                "duplicates": report.duplicates,
            });
            return Ok(serde_json::to_string_pretty(&value)?);
        }

        let mut out = Vec::new();
        if report.whitelist.is_empty() {
            out.push(self.warning("No sources verified."));
        } else {
            let mut builder = Builder::default();
            builder.push_record(["#", "Source", "URL", "Score", "Type", "Relevant"]);
            for (idx, source) in report.whitelist.iter().enumerate() {
                let relevant = if report.low_relevance.iter().any(|u| u == source.url()) {
                    "no"
                } else {
                    "yes"
                };
                builder.push_record([
                    (idx + 1).to_string(),
                    source.label().to_string(),
                    source.url().to_string(),
                    source.credibility_score().to_string(),
                    source.institution_type().to_string(),
                    relevant.to_string(),
                ]);
            }
            out.push(self.table(builder));
        }

        if !report.rejections.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Rejected URL", "Code", "Reason"]);
            for rejection in &report.rejections {
                builder.push_record([
                    rejection.url.clone(),
                    rejection.code.as_str().to_string(),
                    rejection.reason.clone(),
                ]);
            }
            out.push(self.table(builder));
        }
        if report.duplicates > 0 {
            out.push(self.info(&format!("{} duplicate candidate(s) skipped", report.duplicates)));
        }
        Ok(out.join("\n"))
    }

    /// Format a heading promise and, when content was given, its delivery.
    pub fn format_promise(
        &self,
        heading: &str,
        promise: Option<&Promise>,
        delivered: Option<&BTreeSet<u32>>,
        guard: &str,
    ) -> Result<String> {
        let missing = match (promise, delivered) {
            (Some(p), Some(d)) => Some(p.missing(d)),
            _ => None,
        };

        if self.is_json() {
            let value = serde_json::json!({
                "heading": heading,
                "promise": promise,
                "enforced": promise.map(|p| p.kind.is_enforced()),
                "delivered": delivered,
                "missing": missing,
                "guard": guard,
            });
            return Ok(serde_json::to_string_pretty(&value)?);
        }

        let Some(promise) = promise else {
            return Ok(self.info(&format!("「{}」 makes no countable promise", heading)));
        };
        let mut out = vec![format!(
            "Promise: {} × {} ({})",
            promise.count,
            promise.label,
            promise.kind.as_str()
        )];
        match (delivered, missing) {
            (Some(delivered), Some(missing)) if missing.is_empty() => {
                out.push(self.success(&format!("Delivered {} of {}", delivered.len(), promise.count)));
            }
            (Some(delivered), Some(missing)) => {
                out.push(self.warning(&format!(
                    "Delivered {} of {}, missing {:?}",
                    delivered.len(),
                    promise.count,
                    missing
                )));
            }
            _ => out.push(guard.trim().to_string()),
        }
        Ok(out.join("\n"))
    }

    /// Format a finished article run.
    pub fn format_run(&self, run: &ArticleRun) -> Result<String> {
        if self.is_json() {
            return Ok(serde_json::to_string_pretty(run)?);
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Heading", "Chars", "Rewrites", "Retried", "Warnings"]);
        for (idx, outcome) in run.sections.iter().enumerate() {
            let warnings: Vec<&str> = outcome.warnings.iter().map(|w| w.as_str()).collect();
            let retried = match (outcome.retried, outcome.fell_back) {
                (true, true) => "fallback",
                (true, false) => "yes",
                _ => "no",
            };
            builder.push_record([
                (idx + 1).to_string(),
                outcome.section.heading.clone(),
                outcome.char_count().to_string(),
                outcome.rewrites.to_string(),
                retried.to_string(),
                warnings.join(", "),
            ]);
        }

        let record = &run.record;
        let mut out = vec![
            self.info(&format!("{}  run={}", run.document.title, record.run_id)),
            self.table(builder),
            format!(
                "provider={}  tokens={}  retries={}  fallbacks={}  duration={}ms  score={}",
                record.provider,
                record.usage.total(),
                record.retries,
                record.fallbacks,
                record.duration_ms.unwrap_or(0),
                record.quality_score.map_or_else(|| "-".to_string(), |s| format!("{:.0}", s)),
            ),
        ];
        out.push(self.format_report(&run.report, &run.gate)?);
        Ok(out.join("\n"))
    }

    /// Format a run summary.
    pub fn format_summary(&self, summary: &RunSummary) -> Result<String> {
        if self.is_json() {
            return Ok(serde_json::to_string_pretty(summary)?);
        }
        Ok(summary.render())
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
