//! Inkwarden Source Verifier
//!
//! Turns search candidates into a whitelist of sources a generation run may
//! cite. Each candidate passes through layers in order:
//!
//! 1. **Format**: parse, ASCII only, no fabricated ID parameters, HTTPS,
//!    not on the blocklist
//! 2. **Accessibility**: live GET with a timeout, soft-404 detection, page
//!    excerpt for deep reading (optional)
//! 3. **Relevance**: keyword overlap with URL and title; irrelevant sources
//!    keep their place but lose credibility
//!
//! Survivors are scored for credibility, ranked and truncated. Per-candidate
//! failures are values ([`Rejection`]); only an unmet source minimum aborts
//! the run.
//!
//! # Examples
//!
//! ```no_run
//! use inkwarden_domain::{ContentDomain, SourceCandidate};
//! use inkwarden_sources::{CredibilityContext, SourceVerifier, VerifierConfig};
//!
//! # async fn run() -> Result<(), inkwarden_sources::SourceError> {
//! let verifier = SourceVerifier::new(VerifierConfig::default())?;
//! let candidates = vec![SourceCandidate::new("國民健康署", "https://www.hpa.gov.tw", "")];
//! let ctx = CredibilityContext::new(ContentDomain::Health);
//!
//! let report = verifier.build_whitelist(candidates, "睡眠 健康", &ctx, 1).await?;
//! println!("{} sources", report.whitelist.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod access;
mod config;
mod credibility;
mod discovery;
mod error;
mod fallback;
mod format;
mod prompt;
mod relevance;
mod verified;
mod verifier;

pub use access::{AccessCheck, AccessChecker};
pub use config::{VerifierConfig, DEFAULT_BLOCKED_DOMAINS, DEFAULT_SOFT_404_PHRASES};
pub use credibility::{apply_penalty, score_credibility, CredibilityContext, SuffixWeights, MAX_SCORE};
pub use discovery::{collect_candidates, search_queries, MAX_QUERIES};
pub use error::SourceError;
pub use fallback::fallback_sources;
pub use format::{validate_format, validate_format_with, FormatCheck};
pub use prompt::{format_sources_for_prompt, NO_SOURCES};
pub use relevance::{keyword_tokens, validate_relevance, RelevanceCheck};
pub use verified::{VerifiedSource, Whitelist};
pub use verifier::{BatchReport, RejectCode, Rejection, SourceVerifier, Verification};
