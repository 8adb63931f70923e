//! Scrub and rewrite scenarios across the source, model and quality crates

use inkwarden_citations::{
    clean_markdown_artifacts, inject, refine_if_smelly, scrub_and_repair, scrub_document, CitationConfig, Substitution,
};
use inkwarden_domain::{Block, ContentDomain, Document, Section, SourceCandidate};
use inkwarden_llm::{LlmError, MockProvider};
use inkwarden_quality::generate_report;
use inkwarden_sources::{VerifiedSource, Whitelist};

fn org_whitelist() -> Whitelist {
    std::iter::once(
        VerifiedSource::new(SourceCandidate::new("協會說明", "https://www.org.gov.tw/x", ""), 80).unwrap(),
    )
    .collect()
}

#[test]
fn test_fabricated_link_scrubbed_before_report() {
    let whitelist = org_whitelist();
    let html = r#"<p>依據<a href="https://totally-fake.example/123123">官方最新統計</a>，規律作息最重要。</p>"#;

    let out = scrub_and_repair(html, &whitelist);
    assert_eq!(out.text, "<p>依據官方最新統計，規律作息最重要。</p>");
    assert_eq!(out.stats.total, 1);
    assert_eq!(out.stats.invalid, 1);
    assert_eq!(out.stats.removed, 1);

    let doc = Document {
        title: "睡眠衛教".to_string(),
        sections: vec![Section::new("作息", out.text)],
        ..Default::default()
    };
    let report = generate_report(&doc, ContentDomain::Health);
    assert!(report.finding("format.no_anchor_tags").is_none());
    assert!(report.finding("format.no_raw_urls").is_none());
}

#[test]
fn test_unscrubbed_link_fails_report() {
    let doc = Document {
        sections: vec![Section::new("作息", r#"<p><a href="https://totally-fake.example/123123">連結</a></p>"#)],
        ..Default::default()
    };
    let report = generate_report(&doc, ContentDomain::Health);
    assert!(!report.pass());
    assert!(report.finding("format.no_anchor_tags").is_some());
    assert!(report.finding("format.no_raw_urls").is_some());
}

#[test]
fn test_document_scrub_clears_every_field() {
    let whitelist = org_whitelist();
    let mut doc = Document {
        title: "指南".to_string(),
        meta_description: "完整說明請見 https://totally-fake.example".to_string(),
        introduction: Some(Block::from_html(r#"<p><a href="https://www.org.gov.tw/x">協會</a>建議</p>"#)),
        sections: vec![
            Section::new("一", r#"<p><a href="https://a.example">甲</a></p>"#),
            Section::new("二", r#"<p><a href="https://b.example">乙</a> https://c.example/x</p>"#),
        ],
        conclusion: None,
    };

    let stats = scrub_document(&mut doc, &whitelist, Substitution::InstitutionLabel);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.valid, 1);
    assert_eq!(stats.replaced, 2);
    assert_eq!(stats.bare_urls_removed, 2);

    assert_eq!(doc.meta_description, "完整說明請見");
    assert_eq!(doc.introduction.as_ref().unwrap().plain_text, "協會建議");
    assert_eq!(doc.sections[0].html, "<p>協會說明</p>");

    let report = generate_report(&doc, ContentDomain::General);
    assert!(report.finding("format.no_anchor_tags").is_none());
    assert!(report.finding("format.no_raw_urls").is_none());
}

#[test]
fn test_smelly_draft_is_rewritten_once() {
    let provider = MockProvider::default();
    provider.push_response("```html\n<h2>睡眠</h2>\n<p>規律作息有助於入睡。</p>\n```");

    let draft = "<p>根據調查，超過 80% 的人睡不好。</p>";
    let refinement = refine_if_smelly(&provider, "睡眠", draft, &org_whitelist(), &CitationConfig::default(), 1);

    assert_eq!(refinement.content, "<p>規律作息有助於入睡。</p>");
    assert_eq!(refinement.rewrites, 1);
    assert!(refinement.remaining.is_clean());
    assert_eq!(provider.call_count(), 1);
    assert!(provider.prompts()[0].contains("超過 80%"));
    assert!(provider.prompts()[0].contains("https://www.org.gov.tw/x"));
}

#[test]
fn test_rewrite_is_bounded() {
    let provider = MockProvider::new("<p>仍有 90% 的人失眠。</p>");
    let refinement = refine_if_smelly(&provider, "睡眠", "<p>50% 的人</p>", &Whitelist::new(), &CitationConfig::default(), 2);

    assert_eq!(provider.call_count(), 2);
    assert_eq!(refinement.rewrites, 2);
    assert!(!refinement.remaining.is_clean());
    assert_eq!(refinement.content, "<p>仍有 90% 的人失眠。</p>");
}

#[test]
fn test_failed_rewrite_keeps_draft() {
    let provider = MockProvider::default();
    provider.push_error(LlmError::RateLimitExceeded);

    let draft = "<p>TOP 5 必看懶人包</p>";
    let refinement = refine_if_smelly(&provider, "推薦", draft, &Whitelist::new(), &CitationConfig::default(), 3);

    assert_eq!(refinement.content, draft);
    assert_eq!(refinement.rewrites, 0);
    assert_eq!(refinement.attempts, 1);
    assert!(refinement.warning.unwrap().contains("Rate limit"));
}

#[test]
fn test_clean_draft_skips_model() {
    let provider = MockProvider::default();
    let refinement = refine_if_smelly(&provider, "作息", "<p>早睡早起。</p>", &Whitelist::new(), &CitationConfig::default(), 1);
    assert_eq!(provider.call_count(), 0);
    assert_eq!(refinement.content, "<p>早睡早起。</p>");
}

#[test]
fn test_model_output_pipeline_order() {
    let whitelist = org_whitelist();
    let raw = "```html\n<p>參考協會資料[1]，詳見 https://www.org.gov.tw/x 。</p>\n```";
    let html = inject(&clean_markdown_artifacts(raw), &whitelist);
    let out = scrub_and_repair(&html, &whitelist);

    assert_eq!(out.text, "<p>參考協會資料，詳見  。</p>");
    assert_eq!(out.stats.bare_urls_removed, 1);
}
