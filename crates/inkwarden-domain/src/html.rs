//! Minimal HTML-to-text helpers
//!
//! Generated sections are small, well-formed fragments, so a regex pass is
//! enough; no DOM is built.

use regex::Regex;
use std::sync::OnceLock;

fn script_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<script.*?</script>").expect("valid script regex"))
}

fn style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<style.*?</style>").expect("valid style regex"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"))
}

fn space_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

fn line_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)<br\s*/?>|</p\s*>|</li\s*>|</h[1-6]\s*>").expect("valid line break regex")
    })
}

/// Strip markup and collapse whitespace into single spaces
///
/// # Examples
///
/// ```
/// use inkwarden_domain::html::strip_html;
///
/// assert_eq!(strip_html("<p>Hello <b>world</b></p>"), "Hello world");
/// ```
pub fn strip_html(html: &str) -> String {
    let text = script_re().replace_all(html, " ");
    let text = style_re().replace_all(&text, " ");
    let text = tag_re().replace_all(&text, " ");
    space_re().replace_all(&text, " ").trim().to_string()
}

/// Strip markup but keep block boundaries as newlines
///
/// `<br>`, `</p>`, `</li>` and heading closers become line breaks; every
/// other tag becomes a space. Used where line structure carries meaning
/// (e.g. `Day 1：...` itinerary lines).
pub fn html_to_lines(html: &str) -> String {
    let text = line_break_re().replace_all(html, "\n");
    let text = tag_re().replace_all(&text, " ");
    text.lines()
        .map(|line| space_re().replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate to at most `max_chars` characters on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
