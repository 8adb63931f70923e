//! Lightweight topical relevance over URL and title

use inkwarden_domain::SourceCandidate;
use serde::{Deserialize, Serialize};

/// Outcome of the relevance layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceCheck {
    /// Whether the overlap reached the threshold
    pub relevant: bool,
    /// Keyword tokens found in URL or title
    pub matched_tokens: usize,
    /// Keyword tokens considered
    pub total_tokens: usize,
    /// `matched_tokens / total_tokens`, 0 when there are no tokens
    pub ratio: f64,
}

/// Split a keyword into lowercase tokens on whitespace and (full-width) commas
pub fn keyword_tokens(keyword: &str) -> Vec<String> {
    keyword
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '，' | '、'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Check how many keyword tokens appear in the candidate's URL or title
///
/// Single-character tokens never count as matched but stay in the total.
///
/// # Examples
///
/// ```
/// use inkwarden_domain::SourceCandidate;
/// use inkwarden_sources::validate_relevance;
///
/// let candidate = SourceCandidate::new("失眠衛教手冊", "https://www.hpa.gov.tw/sleep", "");
/// let check = validate_relevance(&candidate, "失眠 改善", 0.3);
/// assert!(check.relevant);
/// assert_eq!(check.matched_tokens, 1);
/// ```
pub fn validate_relevance(candidate: &SourceCandidate, keyword: &str, threshold: f64) -> RelevanceCheck {
    let tokens = keyword_tokens(keyword);
    let haystack = format!("{} {}", candidate.url, candidate.title).to_lowercase();

    let matched_tokens = tokens
        .iter()
        .filter(|t| t.chars().count() > 1 && haystack.contains(t.as_str()))
        .count();
    let ratio = if tokens.is_empty() {
        0.0
    } else {
        matched_tokens as f64 / tokens.len() as f64
    };

    RelevanceCheck {
        relevant: ratio >= threshold,
        matched_tokens,
        total_tokens: tokens.len(),
        ratio,
    }
}
