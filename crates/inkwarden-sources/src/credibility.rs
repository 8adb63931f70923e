//! Credibility scoring
//!
//! Weighted sum of:
//! - host suffix class, weighted per content domain
//! - institution type bonus
//! - fuzzy match against the institutions expected for the topic
//! - snippet length bonus
//! - penalty for gazette / meeting-minute pages
//!
//! clamped to `[0, 100]`.

use inkwarden_domain::{ContentDomain, InstitutionType, SourceCandidate};
use serde::{Deserialize, Serialize};
use url::Url;

/// Highest possible score
pub const MAX_SCORE: u8 = 100;

const GAZETTE_PENALTY: i32 = 30;

/// Points per host suffix class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixWeights {
    /// `.gov.tw`
    pub gov: i32,
    /// `.edu.tw`
    pub edu: i32,
    /// `.org.tw`
    pub org: i32,
    /// Everything else
    pub com: i32,
}

impl SuffixWeights {
    /// Weights for a content domain
    ///
    /// Health and law lean on official sources; finance, tech and lifestyle
    /// (travel included) favour commercial ones.
    pub fn for_domain(domain: ContentDomain) -> Self {
        let (gov, edu, org, com) = match domain {
            ContentDomain::Health => (40, 35, 30, 10),
            ContentDomain::Law => (45, 30, 25, 10),
            ContentDomain::Finance => (20, 20, 25, 35),
            ContentDomain::Tech => (10, 30, 20, 40),
            ContentDomain::Lifestyle | ContentDomain::Travel => (10, 10, 20, 40),
            ContentDomain::Education | ContentDomain::General => (30, 30, 30, 25),
        };
        Self { gov, edu, org, com }
    }
}

/// Topic context for scoring
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredibilityContext {
    /// Content domain of the document
    pub domain: ContentDomain,
    /// Institutions expected to be authoritative for the topic
    #[serde(default)]
    pub institution_names: Vec<String>,
}

impl CredibilityContext {
    /// Context with no expected institutions
    pub fn new(domain: ContentDomain) -> Self {
        Self {
            domain,
            institution_names: Vec::new(),
        }
    }

    /// Add expected institution names
    pub fn with_institutions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.institution_names.extend(names.into_iter().map(Into::into));
        self
    }
}

/// Score a candidate for a topic
///
/// # Examples
///
/// ```
/// use inkwarden_domain::{ContentDomain, InstitutionType, SourceCandidate};
/// use inkwarden_sources::{score_credibility, CredibilityContext};
///
/// let source = SourceCandidate::new("國民健康署", "https://www.hpa.gov.tw", "")
///     .with_institution("國民健康署", InstitutionType::Government);
/// let ctx = CredibilityContext::new(ContentDomain::Health).with_institutions(["國民健康署"]);
///
/// // 40 (gov.tw) + 30 (government) + 20 (name match)
/// assert_eq!(score_credibility(&source, &ctx), 90);
/// ```
pub fn score_credibility(source: &SourceCandidate, ctx: &CredibilityContext) -> u8 {
    let weights = SuffixWeights::for_domain(ctx.domain);
    let host = host_of(&source.url);

    let mut score = if host.ends_with(".gov.tw") {
        weights.gov
    } else if host.ends_with(".edu.tw") {
        weights.edu
    } else if host.ends_with(".org.tw") {
        weights.org
    } else if host.contains("gov") || host.contains("edu") {
        (weights.gov + weights.edu) / 2
    } else {
        weights.com
    };

    let institution_type = source
        .institution_type
        .unwrap_or_else(|| InstitutionType::guess_from_url(&source.url));
    score += institution_bonus(institution_type, ctx.domain);
    score += name_match_bonus(source.institution_name.as_deref(), &ctx.institution_names);
    score += snippet_bonus(&source.snippet);

    if source.title.contains("公報") || source.title.contains("會議記錄") || source.url.contains("gazette") {
        score -= GAZETTE_PENALTY;
    }

    clamp_score(score)
}

/// Subtract a penalty without leaving `[0, 100]`
pub fn apply_penalty(score: u8, penalty: u8) -> u8 {
    score.saturating_sub(penalty).min(MAX_SCORE)
}

fn clamp_score(score: i32) -> u8 {
    score.clamp(0, i32::from(MAX_SCORE)) as u8
}

fn host_of(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.host_str().unwrap_or_default().to_ascii_lowercase(),
        Err(_) => url.split('/').nth(2).unwrap_or_default().to_ascii_lowercase(),
    }
}

fn institution_bonus(kind: InstitutionType, domain: ContentDomain) -> i32 {
    let commercial_friendly = matches!(
        domain,
        ContentDomain::Finance | ContentDomain::Tech | ContentDomain::Lifestyle
    );
    match kind {
        InstitutionType::Government if matches!(domain, ContentDomain::Finance | ContentDomain::Tech) => 15,
        InstitutionType::Government => 30,
        InstitutionType::Academic => 25,
        InstitutionType::ProfessionalOrg => 20,
        InstitutionType::Commercial | InstitutionType::Unknown if commercial_friendly => 30,
        InstitutionType::Commercial | InstitutionType::Unknown => 10,
    }
}

fn name_match_bonus(source_name: Option<&str>, expected: &[String]) -> i32 {
    let source_name = source_name.unwrap_or_default().trim().to_lowercase();
    if source_name.is_empty() {
        return 0;
    }
    let expected: Vec<String> = expected
        .iter()
        .map(|n| n.trim().to_lowercase())
        .filter(|n| !n.is_empty())
        .collect();

    if expected
        .iter()
        .any(|name| source_name.contains(name.as_str()) || name.contains(source_name.as_str()))
    {
        20
    } else if expected.iter().any(|name| {
        name.split(['、', '，'])
            .map(str::trim)
            .filter(|kw| !kw.is_empty())
            .any(|kw| source_name.contains(kw))
    }) {
        10
    } else {
        0
    }
}

fn snippet_bonus(snippet: &str) -> i32 {
    match snippet.chars().count() {
        n if n > 50 => 10,
        n if n > 20 => 5,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(url: &str) -> SourceCandidate {
        SourceCandidate::new("標題", url, "")
    }

    #[test]
    fn test_suffix_classes() {
        let ctx = CredibilityContext::new(ContentDomain::Health);
        let gov = candidate("https://www.mohw.gov.tw").with_institution("", InstitutionType::Unknown);
        // 40 + 10 (unknown type in health)
        assert_eq!(score_credibility(&gov, &ctx), 50);

        let edu = candidate("https://www.ntu.edu.tw").with_institution("", InstitutionType::Unknown);
        assert_eq!(score_credibility(&edu, &ctx), 45);

        let mixed = candidate("https://www.nih.gov").with_institution("", InstitutionType::Unknown);
        // (40 + 35) / 2 = 37
        assert_eq!(score_credibility(&mixed, &ctx), 47);

        let com = candidate("https://www.commonhealth.com.tw").with_institution("", InstitutionType::Unknown);
        assert_eq!(score_credibility(&com, &ctx), 20);
    }

    #[test]
    fn test_finance_prefers_commercial() {
        let ctx = CredibilityContext::new(ContentDomain::Finance);
        let broker = candidate("https://www.broker.com.tw").with_institution("", InstitutionType::Commercial);
        let regulator = candidate("https://www.sfb.gov.tw").with_institution("", InstitutionType::Government);
        // 35 + 30 vs 20 + 15
        assert_eq!(score_credibility(&broker, &ctx), 65);
        assert_eq!(score_credibility(&regulator, &ctx), 35);
    }

    #[test]
    fn test_institution_type_guessed_when_missing() {
        let ctx = CredibilityContext::new(ContentDomain::General);
        // .gov.tw → 30 suffix + 30 government
        assert_eq!(score_credibility(&candidate("https://www.ey.gov.tw"), &ctx), 60);
    }

    #[test]
    fn test_name_match_bonus() {
        let expected = vec!["台灣睡眠醫學學會".to_string(), "衛生福利部、國民健康署".to_string()];
        assert_eq!(name_match_bonus(Some("台灣睡眠醫學學會"), &expected), 20);
        assert_eq!(name_match_bonus(Some("睡眠醫學學會"), &expected), 20);
        assert_eq!(name_match_bonus(Some("國民健康署官網"), &expected), 10);
        assert_eq!(name_match_bonus(Some("天下雜誌"), &expected), 0);
        assert_eq!(name_match_bonus(Some(""), &expected), 0);
        assert_eq!(name_match_bonus(None, &expected), 0);
    }

    #[test]
    fn test_snippet_bonus_counts_chars() {
        assert_eq!(snippet_bonus(&"字".repeat(21)), 5);
        assert_eq!(snippet_bonus(&"字".repeat(51)), 10);
        assert_eq!(snippet_bonus("short"), 0);
    }

    #[test]
    fn test_gazette_penalty_and_floor() {
        let ctx = CredibilityContext::new(ContentDomain::Tech);
        let gazette = SourceCandidate::new("行政院公報", "https://gazette.example.gov/a", "")
            .with_institution("", InstitutionType::Government);
        // (10 + 30) / 2 + 15 - 30 = 5
        assert_eq!(score_credibility(&gazette, &ctx), 5);

        let minutes = SourceCandidate::new("會議記錄", "https://x.example.com", "")
            .with_institution("", InstitutionType::Academic);
        // 40 + 25 - 30
        assert_eq!(score_credibility(&minutes, &ctx), 35);
    }

    #[test]
    fn test_apply_penalty_saturates() {
        assert_eq!(apply_penalty(10, 15), 0);
        assert_eq!(apply_penalty(90, 15), 75);
    }
}
