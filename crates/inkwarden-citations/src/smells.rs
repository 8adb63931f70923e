//! Hallucination smells and the bounded strict rewrite
//!
//! Unsourced statistics and listicle cues are the usual signs of a model
//! inventing facts. A smelly draft goes back to the model once (or up to the
//! configured bound) under a strict-editor prompt; a failed rewrite keeps
//! the draft.

use crate::config::CitationConfig;
use crate::error::CitationError;
use crate::inject::{clean_markdown_artifacts, strip_leading_heading};
use inkwarden_domain::html::strip_html;
use inkwarden_domain::traits::LlmProvider;
use inkwarden_domain::TokenUsage;
use inkwarden_sources::{format_sources_for_prompt, Whitelist};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

fn stat_claim_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"根據\s*(?:調查|統計|研究)|超過\s*\d+(?:\.\d+)?\s*[%％]|\d+(?:\.\d+)?\s*[%％]")
            .expect("statistic regex must compile")
    })
}

fn listicle_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)書單|懶人包|排行榜|必看|必讀|top\s*\d+|\d+\s*本").expect("listicle regex must compile")
    })
}

/// Hallucination cues found in one piece of content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SmellReport {
    /// Statistic-like phrases with no checkable origin
    pub unsupported_stats: Vec<String>,
    /// Listicle / booklist cues
    pub listicle_cues: Vec<String>,
}

impl SmellReport {
    /// No cue found
    pub fn is_clean(&self) -> bool {
        self.unsupported_stats.is_empty() && self.listicle_cues.is_empty()
    }
}

/// Scan the visible text of `html` for hallucination cues
pub fn detect_smells(html: &str, config: &CitationConfig) -> SmellReport {
    let text = strip_html(html);
    let collect = |re: &Regex| re.find_iter(&text).map(|m| m.as_str().to_string()).collect::<Vec<_>>();

    SmellReport {
        unsupported_stats: if config.flag_statistics { collect(stat_claim_re()) } else { Vec::new() },
        listicle_cues: if config.flag_listicles { collect(listicle_re()) } else { Vec::new() },
    }
}

/// Strict-editor prompt for one section draft
pub fn build_strict_rewrite_prompt(heading: &str, draft: &str, smells: &SmellReport, sources: &Whitelist) -> String {
    let mut cues: Vec<&str> = smells
        .unsupported_stats
        .iter()
        .chain(&smells.listicle_cues)
        .map(String::as_str)
        .collect();
    let mut seen = HashSet::new();
    cues.retain(|cue| seen.insert(*cue));

    format!(
        "你是一位極度嚴格的資深主編。請審核並重寫以下文章段落「{heading}」（初稿）。\n\n\
         ## 你的任務\n\
         1. **刪除無來源數據**：以下說法找不到可查證的出處，請刪除或改寫成不含數字的一般性描述：{cues}\n\
         2. **不要列清單式推薦**：避免書單、排行榜、懶人包式寫法。\n\
         3. **結構**：沒有 H1 或 H2 標題，最高層級只能是 H3。\n\
         4. **不要輸出任何連結或網址。**\n\n\
         ## 可引用的已驗證來源\n{sources}\n\n\
         ## 原始初稿\n{draft}\n\n\
         ## 輸出要求\n\
         - 直接輸出修潤後的 HTML，保持 <p>、<ul>、<h3> 結構。\n\
         - 不要解釋你改了什麼。\n\
         - 務必使用台灣繁體中文。\n",
        heading = heading.trim(),
        cues = if cues.is_empty() { "（無）".to_string() } else { cues.join("、") },
        sources = format_sources_for_prompt(sources),
        draft = draft.trim(),
    )
}

/// One strict rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// Cleaned rewritten HTML
    pub content: String,
    /// Token usage of the call
    pub usage: TokenUsage,
}

/// Ask the model for a strict rewrite
///
/// # Errors
///
/// Returns `CitationError::Rewrite` when the model call fails and
/// `CitationError::EmptyRewrite` when it answers with nothing.
pub fn strict_rewrite<P>(
    provider: &P,
    heading: &str,
    draft: &str,
    smells: &SmellReport,
    sources: &Whitelist,
) -> Result<Rewrite, CitationError>
where
    P: LlmProvider + ?Sized,
    P::Error: fmt::Display,
{
    let prompt = build_strict_rewrite_prompt(heading, draft, smells, sources);
    let generation = provider
        .generate(&prompt)
        .map_err(|e| CitationError::Rewrite(e.to_string()))?;

    let content = strip_leading_heading(&clean_markdown_artifacts(&generation.text));
    if strip_html(&content).is_empty() {
        return Err(CitationError::EmptyRewrite);
    }
    Ok(Rewrite {
        content,
        usage: generation.usage,
    })
}

/// Result of the smell-driven rewrite loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Refinement {
    /// Final content: the last good rewrite, or the draft
    pub content: String,
    /// Rewrites that succeeded
    pub rewrites: u32,
    /// Model calls made
    pub attempts: u32,
    /// Accumulated token usage
    pub usage: TokenUsage,
    /// Smells left in `content`
    pub remaining: SmellReport,
    /// Last failure, when a rewrite was discarded
    pub warning: Option<String>,
}

/// Rewrite `draft` while it smells, at most `max_rewrites` times
///
/// A failed call stops the loop and keeps the best content so far.
pub fn refine_if_smelly<P>(
    provider: &P,
    heading: &str,
    draft: &str,
    sources: &Whitelist,
    config: &CitationConfig,
    max_rewrites: u32,
) -> Refinement
where
    P: LlmProvider + ?Sized,
    P::Error: fmt::Display,
{
    let mut refinement = Refinement {
        content: draft.to_string(),
        rewrites: 0,
        attempts: 0,
        usage: TokenUsage::default(),
        remaining: detect_smells(draft, config),
        warning: None,
    };

    while !refinement.remaining.is_clean() && refinement.attempts < max_rewrites {
        refinement.attempts += 1;
        debug!(
            heading = %heading.trim(),
            stats = refinement.remaining.unsupported_stats.len(),
            listicle = refinement.remaining.listicle_cues.len(),
            "draft smells, requesting strict rewrite"
        );

        match strict_rewrite(provider, heading, &refinement.content, &refinement.remaining, sources) {
            Ok(rewrite) => {
                refinement.usage += rewrite.usage;
                refinement.rewrites += 1;
                refinement.remaining = detect_smells(&rewrite.content, config);
                refinement.content = rewrite.content;
            }
            Err(e) => {
                warn!(heading = %heading.trim(), error = %e, "strict rewrite failed, keeping draft");
                refinement.warning = Some(e.to_string());
                break;
            }
        }
    }

    if refinement.rewrites > 0 {
        info!(
            heading = %heading.trim(),
            rewrites = refinement.rewrites,
            clean = refinement.remaining.is_clean(),
            "strict rewrite applied"
        );
    }
    refinement
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_statistics() {
        let smells = detect_smells("<p>根據調查，超過 60% 的人失眠，另有 12.5％ 長期服藥。</p>", &CitationConfig::default());
        assert_eq!(smells.unsupported_stats, vec!["根據調查", "超過 60%", "12.5％"]);
        assert!(smells.listicle_cues.is_empty());
    }

    #[test]
    fn test_detects_listicles() {
        let smells = detect_smells("<h3>TOP 10 必讀書單</h3><p>這 5 本</p>", &CitationConfig::default());
        assert_eq!(smells.listicle_cues, vec!["TOP 10", "必讀", "書單", "5 本"]);
    }

    #[test]
    fn test_detectors_can_be_disabled() {
        let config = CitationConfig {
            flag_statistics: false,
            ..CitationConfig::default()
        };
        assert!(detect_smells("<p>30%</p>", &config).is_clean());
    }

    #[test]
    fn test_clean_text_has_no_smells() {
        assert!(detect_smells("<p>規律作息有助入睡。</p>", &CitationConfig::default()).is_clean());
    }

    #[test]
    fn test_prompt_lists_each_cue_once() {
        let smells = detect_smells(
            "<p>約 30% 的人失眠，超過 60% 曾經服藥，另有 30% 偶爾失眠。</p>",
            &CitationConfig::default(),
        );
        assert_eq!(smells.unsupported_stats, vec!["30%", "超過 60%", "30%"]);

        let prompt = build_strict_rewrite_prompt("睡前習慣", "<p>初稿</p>", &smells, &Whitelist::new());
        assert!(prompt.contains("30%、超過 60%\n"));
        assert_eq!(prompt.matches("30%").count(), 1);
    }

    #[test]
    fn test_prompt_lists_cues_and_sources() {
        let smells = SmellReport {
            unsupported_stats: vec!["70%".to_string()],
            listicle_cues: vec!["懶人包".to_string()],
        };
        let prompt = build_strict_rewrite_prompt("睡眠迷思", "<p>70%</p>", &smells, &Whitelist::new());
        assert!(prompt.contains("「睡眠迷思」"));
        assert!(prompt.contains("70%、懶人包"));
        assert!(prompt.contains("無可用來源"));
    }
}
