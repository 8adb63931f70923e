//! Closed code sets recorded against runs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $code:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl $name {
            /// Every code, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable code string
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|code| code.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| format!("unknown {} '{}'", stringify!($name), s))
            }
        }
    };
}

code_enum! {
    /// Why a stage or run failed
    ErrorCode {
        /// Source failed the syntactic check
        FormatInvalid => "FORMAT_INVALID",
        /// Source failed the accessibility check
        Unreachable => "UNREACHABLE",
        /// Source failed the topical-overlap threshold
        LowRelevance => "LOW_RELEVANCE",
        /// Whitelist below the domain minimum; aborts the run
        SourceMinimumNotMet => "SOURCE_MINIMUM_NOT_MET",
        /// Heading promise still unmet after the follow-up
        PromiseUnderDelivered => "PROMISE_UNDER_DELIVERED",
        /// Section shorter than the minimum after the retry
        SectionContentTooShort => "SECTION_CONTENT_TOO_SHORT",
        /// Orchestrator aborted the run
        Cancelled => "CANCELLED",
        /// Model call failed
        ModelError => "MODEL_ERROR",
        /// Anything else
        UnknownError => "UNKNOWN_ERROR",
    }
}

code_enum! {
    /// Why a stage was attempted again
    RetryReason {
        /// Generated section was too short
        SectionContentTooShort => "SECTION_CONTENT_TOO_SHORT",
        /// Heading promise was under-delivered
        PromiseUnderDelivered => "PROMISE_UNDER_DELIVERED",
        /// Draft carried unsourced statistics or listicle cues
        HallucinationSmell => "HALLUCINATION_SMELL",
        /// Model call failed
        ModelError => "MODEL_ERROR",
        /// Model call timed out
        Timeout => "TIMEOUT",
        /// Provider rate limit
        RateLimited => "RATE_LIMITED",
        /// Unspecified
        Unknown => "RETRY_UNKNOWN",
    }
}

code_enum! {
    /// Why generation moved to another provider
    FallbackReason {
        /// Primary provider returned an error
        ProviderError => "PROVIDER_ERROR",
        /// Primary provider rate limit
        RateLimited => "RATE_LIMITED",
        /// Primary provider timed out
        Timeout => "TIMEOUT",
        /// Primary provider produced a too-short section
        SectionContentTooShort => "SECTION_CONTENT_TOO_SHORT",
        /// Unspecified
        Unknown => "FALLBACK_UNKNOWN",
    }
}

/// Outcome of one stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// Completed normally
    #[default]
    Ok,
    /// Completed, accepted with a warning
    Warn,
    /// Failed
    Error,
}

impl StageStatus {
    /// Status string
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Ok => "ok",
            StageStatus::Warn => "warn",
            StageStatus::Error => "error",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality band of a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityBucket {
    /// Score of at least 85
    Excellent,
    /// Score of at least 70
    Good,
    /// Score of at least 55
    Fair,
    /// Anything lower
    Poor,
    /// No (finite) score was reported
    #[default]
    Unknown,
}

impl QualityBucket {
    /// Every band, best first
    pub const ALL: [QualityBucket; 5] = [
        QualityBucket::Excellent,
        QualityBucket::Good,
        QualityBucket::Fair,
        QualityBucket::Poor,
        QualityBucket::Unknown,
    ];

    /// Band for a score
    ///
    /// # Examples
    ///
    /// ```
    /// use inkwarden_tracker::QualityBucket;
    ///
    /// assert_eq!(QualityBucket::from_score(Some(85.0)), QualityBucket::Excellent);
    /// assert_eq!(QualityBucket::from_score(Some(54.9)), QualityBucket::Poor);
    /// assert_eq!(QualityBucket::from_score(None), QualityBucket::Unknown);
    /// ```
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            Some(s) if !s.is_finite() => QualityBucket::Unknown,
            Some(s) if s >= 85.0 => QualityBucket::Excellent,
            Some(s) if s >= 70.0 => QualityBucket::Good,
            Some(s) if s >= 55.0 => QualityBucket::Fair,
            Some(_) => QualityBucket::Poor,
            None => QualityBucket::Unknown,
        }
    }

    /// Band name
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityBucket::Excellent => "excellent",
            QualityBucket::Good => "good",
            QualityBucket::Fair => "fair",
            QualityBucket::Poor => "poor",
            QualityBucket::Unknown => "unknown",
        }
    }
}

impl fmt::Display for QualityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
