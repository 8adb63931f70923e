//! Request and response types for the section pipeline

use inkwarden_citations::ScrubStats;
use inkwarden_domain::{Section, TokenUsage};
use inkwarden_promise::{extract_promise, Promise, ReconcileOutcome};
use inkwarden_tracker::ErrorCode;
use serde::Serialize;

/// Request to write one section
#[derive(Debug, Clone)]
pub struct SectionRequest {
    /// Section heading (H2 text)
    pub heading: String,

    /// What the section should cover
    pub brief: String,

    /// Primary keyword of the article
    pub keyword: String,

    /// Delivery commitment made by the heading
    pub promise: Option<Promise>,
}

impl SectionRequest {
    /// Create a request; the promise is read from the heading
    pub fn new(heading: impl Into<String>, brief: impl Into<String>) -> Self {
        let heading = heading.into();
        let promise = extract_promise(&heading);
        Self {
            heading,
            brief: brief.into(),
            keyword: String::new(),
            promise,
        }
    }

    /// Set the article keyword
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }
}

/// Accepted section plus how it got there
#[derive(Debug, Clone, Serialize)]
pub struct SectionOutcome {
    /// Scrubbed section
    pub section: Section,

    /// Token usage of every call made for this section
    pub usage: TokenUsage,

    /// Links and URLs removed
    pub scrub: ScrubStats,

    /// Strict rewrites applied to the accepted draft
    pub rewrites: u32,

    /// Promise reconciliation result, when the heading made one
    pub promise: Option<ReconcileOutcome>,

    /// Whether the length retry ran
    pub retried: bool,

    /// Whether the length retry ran on the fallback provider
    pub fell_back: bool,

    /// Conditions accepted with a warning, in the order they occurred
    pub warnings: Vec<ErrorCode>,
}

impl SectionOutcome {
    /// Plain-text length in characters
    pub fn char_count(&self) -> usize {
        self.section.plain_text.chars().count()
    }

    /// Whether the section was accepted without warnings
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwarden_promise::PromiseKind;

    #[test]
    fn test_request_reads_promise_from_heading() {
        let request = SectionRequest::new("5大迷思", "破除常見誤解");
        let promise = request.promise.unwrap();
        assert_eq!(promise.kind, PromiseKind::Myth);
        assert_eq!(promise.count, 5);

        assert!(SectionRequest::new("睡前習慣", "").promise.is_none());
    }

    #[test]
    fn test_outcome_counts_characters() {
        let outcome = SectionOutcome {
            section: Section::new("標題", "<p>早睡早起</p>"),
            usage: TokenUsage::default(),
            scrub: ScrubStats::default(),
            rewrites: 0,
            promise: None,
            retried: false,
            fell_back: false,
            warnings: Vec::new(),
        };
        assert_eq!(outcome.char_count(), 4);
        assert!(outcome.is_clean());
    }
}
