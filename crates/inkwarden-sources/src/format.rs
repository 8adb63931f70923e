//! Syntactic URL checks
//!
//! Cheap, offline, and run before anything touches the network. Models
//! invent plausible URLs; the fabricated-parameter check catches the most
//! common shape (`?id=1234`, `?pid=888`).

use crate::config::DEFAULT_BLOCKED_DOMAINS;
use serde::{Deserialize, Serialize};
use url::Url;

/// Query keys whose numeric values are checked for fabricated patterns
const ID_PARAMS: &[&str] = &["pid", "id", "nodeid", "n", "TitleID"];

/// Outcome of the format layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatCheck {
    /// Whether the URL passed
    pub valid: bool,
    /// Rejection reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl FormatCheck {
    fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    fn reject(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Validate a URL against the default blocklist
///
/// # Examples
///
/// ```
/// use inkwarden_sources::validate_format;
///
/// assert!(validate_format("https://www.mohw.gov.tw/cp-1.html").valid);
/// assert!(!validate_format("http://www.mohw.gov.tw").valid);
/// assert!(!validate_format("https://example.com/news?id=1234").valid);
/// ```
pub fn validate_format(url: &str) -> FormatCheck {
    validate_format_with(url, DEFAULT_BLOCKED_DOMAINS)
}

/// Validate a URL against a custom blocklist of host substrings
pub fn validate_format_with<S: AsRef<str>>(url: &str, blocked_domains: &[S]) -> FormatCheck {
    let parsed = match check_syntax(url) {
        Ok(parsed) => parsed,
        Err(reason) => return FormatCheck::reject(reason),
    };

    let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
    if let Some(blocked) = blocked_domains
        .iter()
        .map(AsRef::as_ref)
        .find(|d| !d.is_empty() && host.contains(&d.to_ascii_lowercase()))
    {
        return FormatCheck::reject(format!("blocked domain: {}", blocked));
    }

    FormatCheck::ok()
}

/// Parse and check everything except the blocklist
///
/// Order: parse, ASCII only, fabricated parameters, secure transport.
pub(crate) fn check_syntax(url: &str) -> Result<Url, String> {
    let trimmed = url.trim();
    let parsed = Url::parse(trimmed).map_err(|e| format!("malformed URL: {}", e))?;

    if !trimmed.is_ascii() {
        return Err("URL contains non-ASCII characters".to_string());
    }

    for (key, value) in parsed.query_pairs() {
        if ID_PARAMS.contains(&key.as_ref()) && is_fabricated_id(&value) {
            return Err(format!("fabricated-looking parameter {}={}", key, value));
        }
    }

    if parsed.scheme() != "https" {
        return Err(format!("insecure scheme: {}", parsed.scheme()));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err("URL has no host".to_string());
    }

    Ok(parsed)
}

/// Sequential or repeated digit runs typical of invented IDs
///
/// Only the leading digit run counts, and it must end at a word boundary.
fn is_fabricated_id(value: &str) -> bool {
    let digits_end = value.find(|c: char| !c.is_ascii_digit()).unwrap_or(value.len());
    let (digits, rest) = value.split_at(digits_end);
    let at_boundary = rest.chars().next().map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
    if digits.is_empty() || !at_boundary {
        return false;
    }

    let sequential_prefix = digits.len() == 4 && ["123", "456", "567"].iter().any(|p| digits.starts_with(p));
    let long_sequence = digits == "12345" || digits == "23456";
    let repeated = digits.len() >= 3 && digits.bytes().all(|b| b == digits.as_bytes()[0]);

    sequential_prefix || long_sequence || repeated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_https() {
        assert_eq!(validate_format("https://www.hpa.gov.tw/Pages/Detail.aspx?nodeid=4141"), FormatCheck::ok());
    }

    #[test]
    fn test_rejects_malformed() {
        let check = validate_format("not a url");
        assert!(!check.valid);
        assert!(check.reason.unwrap().starts_with("malformed URL"));
    }

    #[test]
    fn test_rejects_non_ascii() {
        assert!(!validate_format("https://example.com/文章").valid);
    }

    #[test]
    fn test_rejects_insecure_transport() {
        let check = validate_format("http://www.mohw.gov.tw");
        assert_eq!(check.reason.as_deref(), Some("insecure scheme: http"));
    }

    #[test]
    fn test_rejects_blocked_domains() {
        assert!(!validate_format("https://kknews.cc/health/abc").valid);
        assert!(!validate_format("https://someone.pixnet.net/blog/post/1").valid);
        assert!(!validate_format("https://gazette.nat.gov.tw/egFront/detail.do").valid);
    }

    #[test]
    fn test_custom_blocklist() {
        assert!(validate_format_with("https://kknews.cc/a", &[] as &[&str]).valid);
        assert!(!validate_format_with("https://Spam.Example/a", &["spam.example"]).valid);
    }

    #[test]
    fn test_fabricated_ids() {
        for url in [
            "https://example.com/a?id=1234",
            "https://example.com/a?pid=4567",
            "https://example.com/a?nodeid=5678",
            "https://example.com/a?n=12345",
            "https://example.com/a?TitleID=23456",
            "https://example.com/a?id=888",
            "https://example.com/a?x=1&id=0000",
        ] {
            assert!(!validate_format(url).valid, "{} should be rejected", url);
        }
    }

    #[test]
    fn test_plausible_ids_pass() {
        for url in [
            "https://example.com/a?id=4141",
            "https://example.com/a?id=1234567",
            "https://example.com/a?id=88",
            "https://example.com/a?page=1234",
            "https://example.com/a?titleid=1234",
            "https://example.com/a?id=1234abc",
        ] {
            assert!(validate_format(url).valid, "{} should pass", url);
        }
    }

    #[test]
    fn test_fabricated_id_boundary() {
        assert!(is_fabricated_id("1234-x"));
        assert!(!is_fabricated_id("1234_x"));
        assert!(!is_fabricated_id("1112"));
        assert!(!is_fabricated_id(""));
    }
}
