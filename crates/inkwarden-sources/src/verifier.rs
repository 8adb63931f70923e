//! Layered, bounded-parallel source verification

use crate::access::AccessChecker;
use crate::config::VerifierConfig;
use crate::credibility::{apply_penalty, score_credibility, CredibilityContext};
use crate::error::SourceError;
use crate::format::validate_format_with;
use crate::relevance::{validate_relevance, RelevanceCheck};
use crate::verified::{VerifiedSource, Whitelist};
use futures::stream::{self, StreamExt};
use inkwarden_domain::SourceCandidate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Layer that rejected a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectCode {
    /// Failed the syntactic check
    FormatInvalid,
    /// Failed the live fetch
    Unreachable,
}

impl RejectCode {
    /// Stable code string
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectCode::FormatInvalid => "FORMAT_INVALID",
            RejectCode::Unreachable => "UNREACHABLE",
        }
    }
}

/// A candidate excluded from the whitelist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// Candidate URL
    pub url: String,
    /// Rejecting layer
    pub code: RejectCode,
    /// Human-readable reason
    pub reason: String,
}

/// Result of verifying one candidate
#[derive(Debug, Clone)]
pub enum Verification {
    /// Accepted, with its relevance outcome
    Accepted {
        /// The verified source
        source: VerifiedSource,
        /// Relevance layer result (irrelevant sources are penalised, not dropped)
        relevance: RelevanceCheck,
    },
    /// Excluded
    Rejected(Rejection),
}

/// Outcome of a batch
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Accepted sources, ranked and truncated
    pub whitelist: Whitelist,
    /// Excluded candidates, in input order
    pub rejections: Vec<Rejection>,
    /// URLs that took the `LOW_RELEVANCE` penalty
    pub low_relevance: Vec<String>,
    /// Candidates dropped as duplicate URLs before verification
    pub duplicates: usize,
}

/// Runs the format, accessibility and relevance layers and scores survivors
///
/// No retries: a candidate that fails a layer is excluded for this run.
#[derive(Debug, Clone)]
pub struct SourceVerifier {
    config: VerifierConfig,
    access: AccessChecker,
}

impl SourceVerifier {
    /// Create a verifier
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Config` for an invalid configuration and
    /// `SourceError::Client` if the HTTP client cannot be built.
    pub fn new(config: VerifierConfig) -> Result<Self, SourceError> {
        config.validate().map_err(SourceError::Config)?;
        let access = AccessChecker::new(&config)?;
        Ok(Self { config, access })
    }

    /// Active configuration
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify one candidate
    pub async fn verify_one(
        &self,
        candidate: SourceCandidate,
        keyword: &str,
        ctx: &CredibilityContext,
    ) -> Verification {
        let url = candidate.url.trim().to_string();

        let format = validate_format_with(&url, &self.config.blocked_domains);
        if !format.valid {
            let reason = format.reason.unwrap_or_default();
            debug!(url = %url, reason = %reason, "format check failed");
            return Verification::Rejected(Rejection {
                url,
                code: RejectCode::FormatInvalid,
                reason,
            });
        }

        let mut full_content = None;
        if self.config.check_accessibility {
            let access = self.access.check(&url).await;
            if !access.accessible {
                let reason = access.reason.unwrap_or_default();
                debug!(url = %url, reason = %reason, "accessibility check failed");
                return Verification::Rejected(Rejection {
                    url,
                    code: RejectCode::Unreachable,
                    reason,
                });
            }
            full_content = access.content;
        }

        let relevance = validate_relevance(&candidate, keyword, self.config.relevance_threshold);
        let mut score = score_credibility(&candidate, ctx);
        if !relevance.relevant {
            score = apply_penalty(score, self.config.relevance_penalty);
        }

        match VerifiedSource::new(candidate, score) {
            Ok(source) => {
                let source = match full_content {
                    Some(content) => source.with_full_content(content),
                    None => source,
                };
                Verification::Accepted { source, relevance }
            }
            Err(e) => Verification::Rejected(Rejection {
                url,
                code: RejectCode::FormatInvalid,
                reason: e.to_string(),
            }),
        }
    }

    /// Verify a batch with at most `max_concurrency` checks in flight
    ///
    /// Candidates are deduplicated by URL first. One slow or broken URL only
    /// costs its own timeout. Accepted sources are ranked by credibility and
    /// truncated to `max_sources`; ties keep input order.
    pub async fn verify_batch(
        &self,
        candidates: Vec<SourceCandidate>,
        keyword: &str,
        ctx: &CredibilityContext,
    ) -> BatchReport {
        self.verify_ranked(candidates, keyword, ctx, self.config.max_sources).await
    }

    async fn verify_ranked(
        &self,
        candidates: Vec<SourceCandidate>,
        keyword: &str,
        ctx: &CredibilityContext,
        keep: usize,
    ) -> BatchReport {
        let total = candidates.len();
        let mut seen = HashSet::new();
        let unique: Vec<SourceCandidate> = candidates
            .into_iter()
            .filter(|c| seen.insert(c.url.trim().to_string()))
            .collect();
        let duplicates = total - unique.len();

        let mut results: Vec<(usize, Verification)> = stream::iter(unique.into_iter().enumerate())
            .map(|(idx, candidate)| async move { (idx, self.verify_one(candidate, keyword, ctx).await) })
            .buffer_unordered(self.config.max_concurrency)
            .collect()
            .await;
        results.sort_by_key(|(idx, _)| *idx);

        let mut report = BatchReport {
            duplicates,
            ..Default::default()
        };
        for (_, verification) in results {
            match verification {
                Verification::Accepted { source, relevance } => {
                    if !relevance.relevant {
                        report.low_relevance.push(source.url().to_string());
                    }
                    report.whitelist.insert(source);
                }
                Verification::Rejected(rejection) => report.rejections.push(rejection),
            }
        }
        report.whitelist.rank(keep);

        info!(
            candidates = total,
            accepted = report.whitelist.len(),
            rejected = report.rejections.len(),
            low_relevance = report.low_relevance.len(),
            "source verification finished"
        );
        report
    }

    /// Verify a batch and enforce the domain's source minimum
    ///
    /// # Errors
    ///
    /// Returns `SourceError::SourceMinimumNotMet` when fewer than `required`
    /// sources survive; this aborts the run. At least `required` sources are
    /// kept even when `max_sources` is lower.
    pub async fn build_whitelist(
        &self,
        candidates: Vec<SourceCandidate>,
        keyword: &str,
        ctx: &CredibilityContext,
        required: usize,
    ) -> Result<BatchReport, SourceError> {
        let keep = self.config.max_sources.max(required);
        let report = self.verify_ranked(candidates, keyword, ctx, keep).await;
        if let Err(e) = report.whitelist.ensure_minimum(ctx.domain, required) {
            warn!(domain = %ctx.domain, required, available = report.whitelist.len(), "source minimum not met");
            return Err(e);
        }
        Ok(report)
    }
}
