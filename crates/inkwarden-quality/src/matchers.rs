//! Pattern matcher primitives
//!
//! A matcher scans one text and reports how many hits it found plus a few
//! samples. Matchers are pure: no I/O, no clock, no randomness.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum samples a matcher keeps
pub const MAX_SAMPLES: usize = 5;

/// Hits for one text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Number of hits
    pub count: usize,

    /// Up to [`MAX_SAMPLES`] matched snippets, in scan order
    pub samples: Vec<String>,
}

impl MatchResult {
    /// No hits
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether anything was found
    pub fn is_hit(&self) -> bool {
        self.count > 0
    }
}

/// Common interface for rule matchers
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Scan `text` and report hits
    fn scan(&self, text: &str) -> MatchResult;
}

/// Counts distinct literal phrases present in the text
///
/// Each phrase counts at most once regardless of how often it occurs.
///
/// # Examples
///
/// ```
/// use inkwarden_quality::matchers::{IncludesAny, Matcher};
///
/// let matcher = IncludesAny::new(["您", "您的"]);
/// let result = matcher.scan("您的行程與您的預算");
/// assert_eq!(result.count, 2);
/// assert_eq!(result.samples, vec!["您", "您的"]);
/// ```
#[derive(Debug, Clone)]
pub struct IncludesAny {
    phrases: Vec<String>,
}

impl IncludesAny {
    /// Create from a phrase list; blank phrases are dropped
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| p.as_ref().trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }
}

impl Matcher for IncludesAny {
    fn scan(&self, text: &str) -> MatchResult {
        let hits: Vec<&String> = self.phrases.iter().filter(|p| text.contains(p.as_str())).collect();
        MatchResult {
            count: hits.len(),
            samples: hits.into_iter().take(MAX_SAMPLES).cloned().collect(),
        }
    }
}

/// Counts every non-overlapping match of any pattern
#[derive(Debug, Clone)]
pub struct RegexAny {
    patterns: Vec<Regex>,
}

impl RegexAny {
    /// Create from compiled patterns
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self { patterns }
    }

    /// Compile a single pattern
    pub fn single(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::new(vec![Regex::new(pattern)?]))
    }
}

impl Matcher for RegexAny {
    fn scan(&self, text: &str) -> MatchResult {
        let mut result = MatchResult::none();
        for re in &self.patterns {
            for m in re.find_iter(text) {
                result.count += 1;
                if result.samples.len() < MAX_SAMPLES {
                    result.samples.push(m.as_str().to_string());
                }
            }
        }
        result
    }
}

/// Inverted check: a single hit when the pattern matches fewer than `min` times
///
/// # Examples
///
/// ```
/// use inkwarden_quality::matchers::{Matcher, RequireAtLeast};
///
/// let matcher = RequireAtLeast::new(r"Day\s*\d+", 3, "need three days").unwrap();
/// assert_eq!(matcher.scan("Day1 Day2 Day3").count, 0);
///
/// let short = matcher.scan("Day1 Day2");
/// assert_eq!(short.count, 1);
/// assert_eq!(short.samples, vec!["need three days"]);
/// ```
#[derive(Debug, Clone)]
pub struct RequireAtLeast {
    pattern: Regex,
    min: usize,
    hint: String,
}

impl RequireAtLeast {
    /// Compile the pattern; `min` is raised to at least 1
    pub fn new(pattern: &str, min: usize, hint: impl Into<String>) -> Result<Self, regex::Error> {
        let min = min.max(1);
        let hint = hint.into();
        let hint = if hint.trim().is_empty() {
            format!("expected at least {} matches", min)
        } else {
            hint
        };
        Ok(Self {
            pattern: Regex::new(pattern)?,
            min,
            hint,
        })
    }
}

impl Matcher for RequireAtLeast {
    fn scan(&self, text: &str) -> MatchResult {
        if self.pattern.find_iter(text).take(self.min).count() >= self.min {
            MatchResult::none()
        } else {
            MatchResult {
                count: 1,
                samples: vec![self.hint.clone()],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_includes_any_counts_distinct_phrases() {
        let matcher = IncludesAny::new(["現在就", "馬上就", "  ", ""]);
        let result = matcher.scan("現在就出發，現在就訂票");
        assert_eq!(result.count, 1);
        assert_eq!(result.samples, vec!["現在就"]);
    }

    #[test]
    fn test_includes_any_caps_samples() {
        let matcher = IncludesAny::new(["a", "b", "c", "d", "e", "f"]);
        let result = matcher.scan("abcdef");
        assert_eq!(result.count, 6);
        assert_eq!(result.samples.len(), MAX_SAMPLES);
    }

    #[test]
    fn test_regex_any_counts_every_match() {
        let matcher = RegexAny::single(r"(?i)<a\b[^>]*>").unwrap();
        let result = matcher.scan(r#"<a href="x">1</a> <A href='y'>2</A> <abbr>"#);
        assert_eq!(result.count, 2);
        assert_eq!(result.samples[0], r#"<a href="x">"#);
    }

    #[test]
    fn test_regex_any_multiple_patterns() {
        let matcher = RegexAny::new(vec![Regex::new("x").unwrap(), Regex::new("y").unwrap()]);
        let result = matcher.scan("xxyxy");
        assert_eq!(result.count, 5);
        assert_eq!(result.samples, vec!["x", "x", "x", "y", "y"]);
    }

    #[test]
    fn test_require_at_least_default_hint() {
        let matcher = RequireAtLeast::new("z", 0, "").unwrap();
        let result = matcher.scan("abc");
        assert_eq!(result.count, 1);
        assert_eq!(result.samples, vec!["expected at least 1 matches"]);
        assert!(!matcher.scan("z").is_hit());
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(IncludesAny::new(["a"]).scan(""), MatchResult::none());
        assert_eq!(RegexAny::single("a").unwrap().scan(""), MatchResult::none());
    }
}
