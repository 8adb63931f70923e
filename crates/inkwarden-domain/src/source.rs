//! Candidate references and institution classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a verified source based on UUIDv7
///
/// Sortable by creation time, so sources discovered earlier in a run
/// order before later ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SourceId(u128);

impl SourceId {
    /// Generate a new UUIDv7-based SourceId
    ///
    /// # Examples
    ///
    /// ```
    /// use inkwarden_domain::SourceId;
    ///
    /// let id = SourceId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Parse a SourceId from its UUID string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid UUIDv7 string: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl From<SourceId> for String {
    fn from(id: SourceId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for SourceId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(&value)
    }
}

/// An unverified reference returned by the search collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCandidate {
    /// Page title as reported by search
    #[serde(default)]
    pub title: String,

    /// Absolute URL
    pub url: String,

    /// Short description text
    #[serde(default)]
    pub snippet: String,

    /// Publishing institution, when search can tell
    #[serde(default)]
    pub institution_name: Option<String>,

    /// Institution type, when search can tell
    #[serde(default)]
    pub institution_type: Option<InstitutionType>,
}

impl SourceCandidate {
    /// Create a candidate from the three search fields
    pub fn new(title: impl Into<String>, url: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            institution_name: None,
            institution_type: None,
        }
    }

    /// Attach institution metadata
    pub fn with_institution(mut self, name: impl Into<String>, kind: InstitutionType) -> Self {
        self.institution_name = Some(name.into());
        self.institution_type = Some(kind);
        self
    }
}

/// Kind of publishing institution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstitutionType {
    /// Government agency
    Government,
    /// University or research institute
    Academic,
    /// Non-profit or professional body
    ProfessionalOrg,
    /// Company or commercial publisher
    Commercial,
    /// Could not be determined
    Unknown,
}

impl InstitutionType {
    /// Guess the institution type from a URL
    ///
    /// # Examples
    ///
    /// ```
    /// use inkwarden_domain::InstitutionType;
    ///
    /// assert_eq!(InstitutionType::guess_from_url("https://www.mohw.gov.tw/"), InstitutionType::Government);
    /// assert_eq!(InstitutionType::guess_from_url("https://www.ntu.edu.tw/"), InstitutionType::Academic);
    /// ```
    pub fn guess_from_url(url: &str) -> Self {
        let lower = url.to_lowercase();
        if lower.contains(".gov") {
            InstitutionType::Government
        } else if lower.contains(".edu") {
            InstitutionType::Academic
        } else if lower.contains(".org") {
            InstitutionType::ProfessionalOrg
        } else if lower.starts_with("http") {
            InstitutionType::Commercial
        } else {
            InstitutionType::Unknown
        }
    }

    /// Wire name of this type
    pub fn as_str(&self) -> &'static str {
        match self {
            InstitutionType::Government => "government",
            InstitutionType::Academic => "academic",
            InstitutionType::ProfessionalOrg => "professional_org",
            InstitutionType::Commercial => "commercial",
            InstitutionType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for InstitutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
