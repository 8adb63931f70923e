//! Inkwarden Quality Engine
//!
//! Deterministic rule checks over generated documents and the pass/fail
//! report built from them.
//!
//! The engine provides:
//! - Pattern matchers (literal phrases, regexes, minimum-occurrence checks)
//! - A versioned rule registry (tone, format, filler and travel rules)
//! - Report generation with per-field and article-wide scopes
//! - Gate policies for CLI or API callers
//! - The Taiwan-style normalization table the tone rules derive from
//!
//! Nothing here performs I/O; a report is a pure function of the document,
//! the domain and the registry.
//!
//! # Examples
//!
//! ```
//! use inkwarden_domain::{ContentDomain, Document, Section};
//! use inkwarden_quality::{generate_report, GatePolicy};
//!
//! let doc = Document {
//!     title: "東京自由行".to_string(),
//!     sections: vec![Section::new("行程", "<p>在這篇文章中，我們會介紹交通。</p>")],
//!     ..Default::default()
//! };
//!
//! let report = generate_report(&doc, ContentDomain::General);
//! assert!(report.pass());
//! assert!(report.finding("tone.template.opening").is_some());
//! assert!(!GatePolicy::FailOnWarn.evaluate(&report).accepted);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod gate;
pub mod itinerary;
pub mod matchers;
pub mod normalization;
mod report;
mod rules;

pub use config::QualityConfig;
pub use error::QualityError;
pub use gate::{GateDecision, GatePolicy};
pub use itinerary::ItineraryConsistency;
pub use matchers::{IncludesAny, MatchResult, Matcher, RegexAny, RequireAtLeast};
pub use normalization::{normalization_rules, normalize_text, NormalizationRule};
pub use report::{
    generate_report, FieldHits, Finding, QualityReport, ReportGenerator, ReportSummary, ARTICLE_FIELD,
    SCORE_PENALTY_ERROR, SCORE_PENALTY_INFO, SCORE_PENALTY_WARN,
};
pub use rules::{get_rules, QualityRule, RuleRegistry, Scope, Severity, RULESET_VERSION};
