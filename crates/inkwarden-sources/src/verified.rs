//! Verified sources and the per-run whitelist

use crate::credibility::MAX_SCORE;
use crate::error::SourceError;
use crate::format::check_syntax;
use inkwarden_domain::{ContentDomain, InstitutionType, SourceCandidate, SourceId};
use serde::Serialize;
use std::collections::HashSet;

/// A candidate accepted as evidence for one generation run
///
/// The URL is syntactically valid and the score within `[0, 100]` by
/// construction; neither changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedSource {
    id: SourceId,
    title: String,
    url: String,
    snippet: String,
    institution_name: Option<String>,
    institution_type: InstitutionType,
    credibility_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    full_content: Option<String>,
}

impl VerifiedSource {
    /// Accept a candidate
    ///
    /// # Errors
    ///
    /// Returns `SourceError::InvalidSource` when the URL is malformed,
    /// non-ASCII, not HTTPS, or carries a fabricated-looking ID parameter.
    pub fn new(candidate: SourceCandidate, credibility_score: u8) -> Result<Self, SourceError> {
        let parsed = check_syntax(&candidate.url).map_err(|reason| SourceError::InvalidSource {
            url: candidate.url.clone(),
            reason,
        })?;
        let institution_type = candidate
            .institution_type
            .unwrap_or_else(|| InstitutionType::guess_from_url(parsed.as_str()));

        Ok(Self {
            id: SourceId::new(),
            title: candidate.title,
            url: candidate.url.trim().to_string(),
            snippet: candidate.snippet,
            institution_name: candidate.institution_name.filter(|n| !n.trim().is_empty()),
            institution_type,
            credibility_score: credibility_score.min(MAX_SCORE),
            full_content: None,
        })
    }

    /// Attach deep-read page text
    pub fn with_full_content(mut self, content: impl Into<String>) -> Self {
        let content = content.into();
        self.full_content = (!content.trim().is_empty()).then_some(content);
        self
    }

    /// Copy without deep-read text, for exposure outside the run
    pub fn redacted(&self) -> Self {
        Self {
            full_content: None,
            ..self.clone()
        }
    }

    /// Unique id
    pub fn id(&self) -> SourceId {
        self.id
    }

    /// Page title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// URL as supplied by search
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Search snippet
    pub fn snippet(&self) -> &str {
        &self.snippet
    }

    /// Publishing institution
    pub fn institution_name(&self) -> Option<&str> {
        self.institution_name.as_deref()
    }

    /// Institution type
    pub fn institution_type(&self) -> InstitutionType {
        self.institution_type
    }

    /// Score in `[0, 100]`
    pub fn credibility_score(&self) -> u8 {
        self.credibility_score
    }

    /// Deep-read page text
    pub fn full_content(&self) -> Option<&str> {
        self.full_content.as_deref()
    }

    /// Neutral label for citing this source in prose
    pub fn label(&self) -> &str {
        match self.institution_name() {
            Some(name) => name,
            None if !self.title.trim().is_empty() => self.title.trim(),
            None => &self.url,
        }
    }
}

/// Sources accepted for one run, unique by URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Whitelist {
    sources: Vec<VerifiedSource>,
    #[serde(skip)]
    urls: HashSet<String>,
}

impl Whitelist {
    /// Empty whitelist
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source; returns false if its URL is already present
    pub fn insert(&mut self, source: VerifiedSource) -> bool {
        if !self.urls.insert(source.url.clone()) {
            return false;
        }
        self.sources.push(source);
        true
    }

    /// Exact URL membership
    pub fn contains_url(&self, url: &str) -> bool {
        self.urls.contains(url.trim())
    }

    /// Sources in insertion (or ranked) order
    pub fn sources(&self) -> &[VerifiedSource] {
        &self.sources
    }

    /// Iterate sources
    pub fn iter(&self) -> std::slice::Iter<'_, VerifiedSource> {
        self.sources.iter()
    }

    /// Number of sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether no source was accepted
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Sort by credibility (highest first, ties keep order) and keep `max`
    pub fn rank(&mut self, max: usize) {
        self.sources
            .sort_by(|a, b| b.credibility_score.cmp(&a.credibility_score));
        self.sources.truncate(max);
        self.urls = self.sources.iter().map(|s| s.url.clone()).collect();
    }

    /// Fail when fewer than `required` sources were accepted
    ///
    /// # Errors
    ///
    /// Returns `SourceError::SourceMinimumNotMet`.
    pub fn ensure_minimum(&self, domain: ContentDomain, required: usize) -> Result<(), SourceError> {
        if self.len() < required {
            return Err(SourceError::SourceMinimumNotMet {
                domain,
                required,
                available: self.len(),
            });
        }
        Ok(())
    }

    /// Copy with deep-read text removed from every source
    pub fn redacted(&self) -> Self {
        Self {
            sources: self.sources.iter().map(VerifiedSource::redacted).collect(),
            urls: self.urls.clone(),
        }
    }
}

impl FromIterator<VerifiedSource> for Whitelist {
    fn from_iter<I: IntoIterator<Item = VerifiedSource>>(iter: I) -> Self {
        let mut whitelist = Whitelist::new();
        for source in iter {
            whitelist.insert(source);
        }
        whitelist
    }
}

impl<'a> IntoIterator for &'a Whitelist {
    type Item = &'a VerifiedSource;
    type IntoIter = std::slice::Iter<'a, VerifiedSource>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(url: &str, score: u8) -> VerifiedSource {
        VerifiedSource::new(SourceCandidate::new("標題", url, "摘要"), score).unwrap()
    }

    #[test]
    fn test_new_validates_url() {
        let err = VerifiedSource::new(SourceCandidate::new("t", "http://x.example", ""), 50).unwrap_err();
        assert!(matches!(err, SourceError::InvalidSource { .. }));
        assert_eq!(err.code(), "FORMAT_INVALID");

        assert!(VerifiedSource::new(SourceCandidate::new("t", "https://x.example/a?id=1234", ""), 50).is_err());
    }

    #[test]
    fn test_score_is_capped() {
        assert_eq!(source("https://a.example", 250).credibility_score(), 100);
    }

    #[test]
    fn test_institution_type_guessed() {
        assert_eq!(source("https://www.mohw.gov.tw", 90).institution_type(), InstitutionType::Government);
    }

    #[test]
    fn test_redacted_drops_full_content() {
        let s = source("https://a.example", 80).with_full_content("內文");
        assert_eq!(s.full_content(), Some("內文"));
        let r = s.redacted();
        assert_eq!(r.full_content(), None);
        assert_eq!(r.id(), s.id());

        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("full_content").is_none());
    }

    #[test]
    fn test_label_prefers_institution() {
        let named = VerifiedSource::new(
            SourceCandidate::new("首頁", "https://www.hpa.gov.tw", "")
                .with_institution("國民健康署", InstitutionType::Government),
            90,
        )
        .unwrap();
        assert_eq!(named.label(), "國民健康署");
        assert_eq!(source("https://a.example", 1).label(), "標題");
    }

    #[test]
    fn test_whitelist_unique_by_url() {
        let mut whitelist = Whitelist::new();
        assert!(whitelist.insert(source("https://a.example/x", 50)));
        assert!(!whitelist.insert(source("https://a.example/x", 90)));
        assert_eq!(whitelist.len(), 1);
        assert!(whitelist.contains_url("https://a.example/x"));
        assert!(!whitelist.contains_url("https://a.example/y"));
    }

    #[test]
    fn test_rank_sorts_and_truncates() {
        let mut whitelist: Whitelist = vec![
            source("https://a.example", 40),
            source("https://b.example", 90),
            source("https://c.example", 70),
            source("https://d.example", 90),
        ]
        .into_iter()
        .collect();
        whitelist.rank(3);

        let urls: Vec<&str> = whitelist.iter().map(VerifiedSource::url).collect();
        assert_eq!(urls, vec!["https://b.example", "https://d.example", "https://c.example"]);
        assert!(!whitelist.contains_url("https://a.example"));
    }

    #[test]
    fn test_ensure_minimum() {
        let whitelist: Whitelist = std::iter::once(source("https://a.example", 40)).collect();
        assert!(whitelist.ensure_minimum(ContentDomain::Travel, 1).is_ok());

        let err = whitelist.ensure_minimum(ContentDomain::Health, 2).unwrap_err();
        assert_eq!(
            err,
            SourceError::SourceMinimumNotMet {
                domain: ContentDomain::Health,
                required: 2,
                available: 1
            }
        );
        assert_eq!(err.code(), "SOURCE_MINIMUM_NOT_MET");
    }
}
