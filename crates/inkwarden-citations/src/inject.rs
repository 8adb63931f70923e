//! Citation marker stripping and model-output cleanup

use inkwarden_sources::Whitelist;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]*\[(\d{1,2})\]").expect("marker regex must compile"))
}

fn leading_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^```[a-z]*[ \t]*\n?").expect("fence regex must compile"))
}

fn inner_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^[ \t]*```[a-z]*[ \t]*$\n?").expect("fence regex must compile"))
}

fn blank_lines_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("blank line regex must compile"))
}

fn leading_h2_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)^\s*<h2[^>]*>.*?</h2>\s*").expect("h2 regex must compile"))
}

/// Strip `[n]` citation markers
///
/// Markers are never rendered: a marker for a whitelisted source (`1..=len`)
/// has served its purpose once the source is in the whitelist, and a marker
/// past the end points at nothing. Both disappear, along with any space
/// before them. Bracketed numbers of three or more digits are left alone.
///
/// # Examples
///
/// ```
/// use inkwarden_citations::inject;
/// use inkwarden_sources::Whitelist;
///
/// assert_eq!(inject("睡眠很重要[1]。", &Whitelist::new()), "睡眠很重要。");
/// ```
pub fn inject(text: &str, sources: &Whitelist) -> String {
    let mut orphaned = 0usize;
    let cleaned = marker_re().replace_all(text, |caps: &regex::Captures<'_>| {
        let n: usize = caps[1].parse().unwrap_or(0);
        if n == 0 || n > sources.len() {
            orphaned += 1;
        }
        String::new()
    });
    if orphaned > 0 {
        debug!(orphaned, sources = sources.len(), "stripped markers with no matching source");
    }
    cleaned.into_owned()
}

/// Remove markdown code fences a model wraps around HTML
///
/// Handles a leading ```` ```html ```` fence, a trailing fence, and stray
/// fence lines inside the body; runs of blank lines collapse to one.
pub fn clean_markdown_artifacts(text: &str) -> String {
    let text = text.trim();
    let text = leading_fence_re().replace(text, "");
    let text = text.trim_end();
    let text = text.strip_suffix("```").unwrap_or(text);
    let text = inner_fence_re().replace_all(text, "");
    blank_lines_re().replace_all(&text, "\n\n").trim().to_string()
}

/// Drop a leading `<h2>` that repeats the section heading
pub fn strip_leading_heading(html: &str) -> String {
    leading_h2_re().replace(html, "").into_owned()
}
