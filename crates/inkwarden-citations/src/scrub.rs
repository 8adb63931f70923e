//! Whitelist enforcement over rendered output
//!
//! Every link-like construct is taken apart: anchors lose their markup and
//! keep (or swap) their visible text, bare URLs are deleted. Nothing that
//! looks like a link survives, whitelisted or not.

use crate::config::Substitution;
use inkwarden_domain::html::strip_html;
use inkwarden_domain::Document;
use inkwarden_sources::Whitelist;
use regex::{Captures, Regex};
use serde::Serialize;
use std::ops::AddAssign;
use std::sync::OnceLock;
use tracing::{debug, info};

fn anchor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>").expect("anchor regex must compile"))
}

fn href_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).expect("href regex must compile")
    })
}

fn stray_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</?a\b[^>]*>").expect("anchor tag regex must compile"))
}

fn bare_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)https?://[[:graph:]&&[^"'<>]]*"#).expect("url regex must compile"))
}

/// Counters for one scrub pass
///
/// `total == valid + invalid` and `invalid == replaced + removed` always
/// hold; bare URLs are counted apart from anchors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScrubStats {
    /// Anchors found
    pub total: usize,
    /// Anchors pointing at a whitelisted URL
    pub valid: usize,
    /// Anchors pointing anywhere else (or nowhere)
    pub invalid: usize,
    /// Invalid anchors whose text was swapped for a whitelisted label
    pub replaced: usize,
    /// Invalid anchors unwrapped to their own text
    pub removed: usize,
    /// Bare URLs deleted
    pub bare_urls_removed: usize,
}

impl ScrubStats {
    /// Whether the pass changed anything
    pub fn is_clean(&self) -> bool {
        self.total == 0 && self.bare_urls_removed == 0
    }
}

impl AddAssign for ScrubStats {
    fn add_assign(&mut self, rhs: Self) {
        self.total += rhs.total;
        self.valid += rhs.valid;
        self.invalid += rhs.invalid;
        self.replaced += rhs.replaced;
        self.removed += rhs.removed;
        self.bare_urls_removed += rhs.bare_urls_removed;
    }
}

/// Scrubbed text with its counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrubOutcome {
    /// Text with no link markup and no URLs
    pub text: String,
    /// What was found and done
    pub stats: ScrubStats,
}

/// Scrub with the default policy: unlisted links keep their visible text
///
/// # Examples
///
/// ```
/// use inkwarden_citations::scrub_and_repair;
/// use inkwarden_sources::Whitelist;
///
/// let out = scrub_and_repair(r#"見<a href="https://fake.example/1">官方說明</a>"#, &Whitelist::new());
/// assert_eq!(out.text, "見官方說明");
/// assert_eq!(out.stats.removed, 1);
/// ```
pub fn scrub_and_repair(text: &str, whitelist: &Whitelist) -> ScrubOutcome {
    Scrubber::new(whitelist, Substitution::RetainText).scrub(text)
}

/// Scrub every HTML body, the title and the meta description of a document
///
/// Plain-text renditions are re-derived from the scrubbed HTML.
pub fn scrub_document(doc: &mut Document, whitelist: &Whitelist, substitution: Substitution) -> ScrubStats {
    let mut scrubber = Scrubber::new(whitelist, substitution);
    let mut stats = ScrubStats::default();

    for plain in [&mut doc.title, &mut doc.meta_description] {
        let outcome = scrubber.scrub(plain);
        *plain = strip_html(&outcome.text);
        stats += outcome.stats;
    }
    doc.map_html(|html| {
        let outcome = scrubber.scrub(html);
        stats += outcome.stats;
        outcome.text
    });

    if !stats.is_clean() {
        info!(
            anchors = stats.total,
            invalid = stats.invalid,
            bare_urls = stats.bare_urls_removed,
            "scrubbed links from document"
        );
    }
    stats
}

/// Stateful scrubber; the label rotation carries across calls
#[derive(Debug)]
pub struct Scrubber<'w> {
    whitelist: &'w Whitelist,
    substitution: Substitution,
    next_label: usize,
}

impl<'w> Scrubber<'w> {
    /// Create a scrubber over a run's whitelist
    pub fn new(whitelist: &'w Whitelist, substitution: Substitution) -> Self {
        Self {
            whitelist,
            substitution,
            next_label: 0,
        }
    }

    /// Remove every link and URL from `text`
    pub fn scrub(&mut self, text: &str) -> ScrubOutcome {
        let mut stats = ScrubStats::default();

        let text = anchor_re()
            .replace_all(text, |caps: &Captures<'_>| {
                let href = extract_href(&caps[1]);
                let visible = strip_html(&caps[2]);
                self.repair(href.as_deref(), visible, &mut stats)
            })
            .into_owned();

        // unclosed or orphaned tags the anchor pattern could not pair up
        let text = stray_tag_re()
            .replace_all(&text, |caps: &Captures<'_>| {
                if !caps[0].starts_with("</") {
                    stats.total += 1;
                    stats.invalid += 1;
                    stats.removed += 1;
                }
                ""
            })
            .into_owned();

        let text = bare_url_re()
            .replace_all(&text, |caps: &Captures<'_>| {
                debug!(url = &caps[0], "removed bare url");
                stats.bare_urls_removed += 1;
                ""
            })
            .into_owned();

        ScrubOutcome { text, stats }
    }

    fn repair(&mut self, href: Option<&str>, visible: String, stats: &mut ScrubStats) -> String {
        stats.total += 1;
        if let Some(url) = href.filter(|u| self.whitelist.contains_url(u)) {
            debug!(url = %url, "unwrapped whitelisted link");
            stats.valid += 1;
            return visible;
        }

        stats.invalid += 1;
        debug!(url = href.unwrap_or(""), "link not on whitelist");
        if self.substitution == Substitution::InstitutionLabel && !self.whitelist.is_empty() {
            let sources = self.whitelist.sources();
            let label = sources[self.next_label % sources.len()].label().to_string();
            self.next_label += 1;
            stats.replaced += 1;
            return label;
        }
        stats.removed += 1;
        visible
    }
}

fn extract_href(attrs: &str) -> Option<String> {
    let caps = href_re().captures(attrs)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| m.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwarden_domain::{InstitutionType, Section, SourceCandidate};
    use inkwarden_sources::VerifiedSource;

    fn whitelist() -> Whitelist {
        vec![
            VerifiedSource::new(
                SourceCandidate::new("首頁", "https://www.hpa.gov.tw/sleep", "")
                    .with_institution("國民健康署", InstitutionType::Government),
                90,
            )
            .unwrap(),
            VerifiedSource::new(SourceCandidate::new("睡眠指引", "https://www.sleep.org.tw/guide", ""), 70).unwrap(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_whitelisted_link_keeps_text() {
        let out = scrub_and_repair(r#"<p>參考<a href="https://www.hpa.gov.tw/sleep" target="_blank">衛教資訊</a>。</p>"#, &whitelist());
        assert_eq!(out.text, "<p>參考衛教資訊。</p>");
        assert_eq!(out.stats.valid, 1);
        assert_eq!(out.stats.invalid, 0);
    }

    #[test]
    fn test_unlisted_link_retains_text_by_default() {
        let out = scrub_and_repair(r#"<a href='https://fake.example/9'><b>研究</b>指出</a>"#, &whitelist());
        assert_eq!(out.text, "研究 指出");
        assert_eq!(out.stats.removed, 1);
        assert_eq!(out.stats.replaced, 0);
    }

    #[test]
    fn test_label_substitution_round_robin() {
        let list = whitelist();
        let mut scrubber = Scrubber::new(&list, Substitution::InstitutionLabel);
        let text = r#"<a href="https://a.example">甲</a>、<a href="https://b.example">乙</a>、<a href="https://c.example">丙</a>"#;
        let out = scrubber.scrub(text);
        assert_eq!(out.text, "國民健康署、睡眠指引、國民健康署");
        assert_eq!(out.stats.replaced, 3);
        assert_eq!(out.stats.invalid, 3);
    }

    #[test]
    fn test_label_substitution_needs_sources() {
        let empty = Whitelist::new();
        let out = Scrubber::new(&empty, Substitution::InstitutionLabel).scrub(r#"<a href="https://x.example">文字</a>"#);
        assert_eq!(out.text, "文字");
        assert_eq!(out.stats.removed, 1);
    }

    #[test]
    fn test_bare_urls_removed() {
        let out = scrub_and_repair("詳見 https://www.hpa.gov.tw/sleep 或 HTTP://x.tw/a?b=1。", &whitelist());
        assert_eq!(out.text, "詳見  或 。");
        assert_eq!(out.stats.bare_urls_removed, 2);
        assert_eq!(out.stats.total, 0);
    }

    #[test]
    fn test_url_inside_link_text_removed() {
        let out = scrub_and_repair(r#"<a href="https://fake.example">https://fake.example</a>"#, &Whitelist::new());
        assert_eq!(out.text, "");
        assert_eq!(out.stats.removed, 1);
        assert_eq!(out.stats.bare_urls_removed, 1);
    }

    #[test]
    fn test_unclosed_anchor_removed() {
        let out = scrub_and_repair(r#"<p><a href="https://x.example">斷掉的連結</p>"#, &Whitelist::new());
        assert_eq!(out.text, "<p>斷掉的連結</p>");
        assert_eq!(out.stats.total, 1);
        assert_eq!(out.stats.removed, 1);
    }

    #[test]
    fn test_anchor_without_href() {
        let out = scrub_and_repair("<a name=\"top\">頂端</a>", &whitelist());
        assert_eq!(out.text, "頂端");
        assert_eq!(out.stats.invalid, 1);
    }

    #[test]
    fn test_abbr_is_not_an_anchor() {
        let out = scrub_and_repair("<abbr>WHO</abbr>", &whitelist());
        assert_eq!(out.text, "<abbr>WHO</abbr>");
        assert!(out.stats.is_clean());
    }

    #[test]
    fn test_scrub_document_rederives_plain_text() {
        let mut doc = Document {
            title: "睡眠指南 https://x.tw".to_string(),
            sections: vec![Section::new("重點", r#"<p>見<a href="https://fake.example">說明</a></p>"#)],
            ..Default::default()
        };
        let stats = scrub_document(&mut doc, &whitelist(), Substitution::RetainText);

        assert_eq!(doc.title, "睡眠指南");
        assert_eq!(doc.sections[0].html, "<p>見說明</p>");
        assert_eq!(doc.sections[0].plain_text, "見說明");
        assert_eq!(stats.total, 1);
        assert_eq!(stats.bare_urls_removed, 1);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn fragment() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("文字".to_string()),
            Just(" ".to_string()),
            Just("<p>".to_string()),
            Just("</p>".to_string()),
            Just("<a href=\"https://fake.example/1\">".to_string()),
            Just("<A HREF='http://x.tw'>".to_string()),
            Just("</a>".to_string()),
            Just("https://www.org.gov.tw/x".to_string()),
            Just("http://".to_string()),
            Just("<abbr>".to_string()),
        ]
    }

    proptest! {
        /// Property: no anchor tag and no URL scheme survive a scrub
        #[test]
        fn prop_scrub_leaves_no_links(parts in prop::collection::vec(fragment(), 0..12)) {
            let input = parts.concat();
            let out = scrub_and_repair(&input, &Whitelist::new());
            let lower = out.text.to_lowercase();
            prop_assert!(!stray_tag_re().is_match(&out.text));
            prop_assert!(!lower.contains("http://") && !lower.contains("https://"));
        }

        /// Property: the counters always add up
        #[test]
        fn prop_stats_are_consistent(parts in prop::collection::vec(fragment(), 0..12)) {
            let out = scrub_and_repair(&parts.concat(), &Whitelist::new());
            prop_assert_eq!(out.stats.total, out.stats.valid + out.stats.invalid);
            prop_assert_eq!(out.stats.invalid, out.stats.replaced + out.stats.removed);
        }
    }
}
