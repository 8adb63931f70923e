//! Rendering verified sources into model prompts

use crate::verified::VerifiedSource;

/// Text used when no source is available
pub const NO_SOURCES: &str = "無可用來源";

/// Render sources as numbered context blocks
///
/// Deep-read page text is preferred over the search snippet.
///
/// # Examples
///
/// ```
/// use inkwarden_sources::{fallback_sources, format_sources_for_prompt};
/// use inkwarden_domain::ContentDomain;
///
/// let text = format_sources_for_prompt(&fallback_sources(ContentDomain::General));
/// assert!(text.starts_with("[1] 行政院\n    摘要: "));
/// assert!(text.ends_with("URL: https://www.ey.gov.tw"));
/// ```
pub fn format_sources_for_prompt<'a, I>(sources: I) -> String
where
    I: IntoIterator<Item = &'a VerifiedSource>,
{
    let blocks: Vec<String> = sources
        .into_iter()
        .enumerate()
        .map(|(idx, s)| {
            let body = match s.full_content() {
                Some(content) => format!("內文重點: {}", content),
                None => format!("摘要: {}", s.snippet()),
            };
            format!("[{}] {}\n    {}\n    URL: {}", idx + 1, s.title(), body, s.url())
        })
        .collect();

    if blocks.is_empty() {
        NO_SOURCES.to_string()
    } else {
        blocks.join("\n\n")
    }
}
