//! Per-section sub-pipeline

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::prompt::PromptBuilder;
use crate::types::{SectionOutcome, SectionRequest};
use inkwarden_citations::{
    clean_markdown_artifacts, inject, refine_if_smelly, strip_leading_heading, ScrubStats, Scrubber,
};
use inkwarden_domain::html::strip_html;
use inkwarden_domain::traits::LlmProvider;
use inkwarden_domain::{Generation, Section, TokenUsage};
use inkwarden_promise::{reconcile, ReconcileOutcome};
use inkwarden_sources::Whitelist;
use inkwarden_tracker::{
    Clock, ErrorCode, FallbackReason, RetryReason, RunId, RunTracker, StageEvent,
};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Stage names recorded against the run
pub mod stages {
    /// Drafting call
    pub const GENERATE: &str = "generate";
    /// Smell-driven strict rewrite
    pub const REFINE: &str = "refine";
    /// Whitelist scrub
    pub const SCRUB: &str = "scrub";
    /// Heading promise reconciliation
    pub const PROMISE: &str = "promise";
    /// Minimum length check
    pub const LENGTH: &str = "length";
}

/// One draft after every post-processing step
#[derive(Debug)]
struct Draft {
    html: String,
    usage: TokenUsage,
    scrub: ScrubStats,
    rewrites: u32,
    promise: Option<ReconcileOutcome>,
    warnings: Vec<ErrorCode>,
}

impl Draft {
    fn char_count(&self) -> usize {
        strip_html(&self.html).chars().count()
    }
}

/// Writes one section: draft, clean, rewrite if it smells, scrub,
/// reconcile the heading promise, then check the length
///
/// Every step reports into the run tracker. Only a failed first draft is
/// an error; everything later degrades into a warning on the outcome.
pub struct SectionPipeline<P>
where
    P: LlmProvider,
{
    primary: Arc<P>,
    fallback: Option<Arc<P>>,
    config: PipelineConfig,
}

impl<P> SectionPipeline<P>
where
    P: LlmProvider + Send + Sync + 'static,
    P::Error: fmt::Display,
{
    /// Create a pipeline over a primary provider
    pub fn new(primary: P, config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;
        Ok(Self {
            primary: Arc::new(primary),
            fallback: None,
            config,
        })
    }

    /// Provider used for the length retry
    pub fn with_fallback(mut self, fallback: P) -> Self {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    /// Active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Name of the primary provider
    pub fn provider_name(&self) -> &str {
        self.primary.name()
    }

    /// Write one section of run `run_id`
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Model` when the first drafting call fails.
    pub async fn run<C: Clock>(
        &self,
        tracker: &RunTracker<C>,
        run_id: &RunId,
        request: &SectionRequest,
        sources: &Arc<Whitelist>,
    ) -> Result<SectionOutcome, PipelineError> {
        let min_chars = self.config.min_section_chars;
        let prompt = PromptBuilder::new(request, sources).build();
        let first = self
            .draft(&self.primary, prompt, tracker, run_id, request, sources)
            .await?;

        let first_chars = first.char_count();
        if first_chars >= min_chars {
            tracker.record_stage(run_id, StageEvent::ok(stages::LENGTH));
            return Ok(outcome(request, first, TokenUsage::default(), false, false));
        }

        info!(
            run_id = %run_id,
            heading = %request.heading.trim(),
            chars = first_chars,
            min_chars,
            "Section too short, retrying once"
        );
        let (provider, fell_back) = match (&self.fallback, self.config.fallback_on_short) {
            (Some(fallback), true) => {
                tracker.record_fallback(
                    run_id,
                    self.primary.name(),
                    fallback.name(),
                    FallbackReason::SectionContentTooShort,
                );
                (fallback, true)
            }
            _ => (&self.primary, false),
        };
        tracker.record_retry(
            run_id,
            stages::LENGTH,
            RetryReason::SectionContentTooShort,
            Some(provider.name()),
        );

        let retry_prompt = PromptBuilder::new(request, sources)
            .with_length_reminder(min_chars)
            .build();
        let (mut best, spent) = match self
            .draft(provider, retry_prompt, tracker, run_id, request, sources)
            .await
        {
            Ok(second) if second.char_count() > first_chars => {
                let spent = first.usage;
                (second, spent)
            }
            Ok(second) => (first, second.usage),
            Err(e) => {
                warn!(run_id = %run_id, error = %e, "Length retry failed, keeping first draft");
                let mut first = first;
                first.warnings.push(ErrorCode::ModelError);
                (first, TokenUsage::default())
            }
        };

        let chars = best.char_count();
        if chars < min_chars {
            warn!(
                run_id = %run_id,
                code = ErrorCode::SectionContentTooShort.as_str(),
                heading = %request.heading.trim(),
                chars,
                min_chars,
                "Accepting short section"
            );
            best.warnings.push(ErrorCode::SectionContentTooShort);
            tracker.record_stage(
                run_id,
                StageEvent::warn(stages::LENGTH, ErrorCode::SectionContentTooShort),
            );
        } else {
            tracker.record_stage(run_id, StageEvent::ok(stages::LENGTH));
        }

        Ok(outcome(request, best, spent, true, fell_back))
    }

    /// Draft and post-process one version of the section
    async fn draft<C: Clock>(
        &self,
        provider: &Arc<P>,
        prompt: String,
        tracker: &RunTracker<C>,
        run_id: &RunId,
        request: &SectionRequest,
        sources: &Arc<Whitelist>,
    ) -> Result<Draft, PipelineError> {
        let mut usage = TokenUsage::default();
        let mut warnings = Vec::new();

        // draft
        let started = Instant::now();
        let generation = match generate(provider, prompt).await {
            Ok(generation) => generation,
            Err(e) => {
                tracker.record_stage(
                    run_id,
                    StageEvent::error(stages::GENERATE, e.code()).with_duration_ms(elapsed_ms(started)),
                );
                return Err(e);
            }
        };
        tracker.record_tokens(run_id, generation.usage);
        usage += generation.usage;
        let html = inject(
            &strip_leading_heading(&clean_markdown_artifacts(&generation.text)),
            sources,
        );
        tracker.record_stage(
            run_id,
            StageEvent::ok(stages::GENERATE).with_duration_ms(elapsed_ms(started)),
        );

        // smell rewrite
        let started = Instant::now();
        let refinement = {
            let heading = request.heading.clone();
            let sources = Arc::clone(sources);
            let citations = self.config.citations.clone();
            let max = self.config.max_strict_rewrites;
            blocking(provider, move |p| {
                refine_if_smelly(p, &heading, &html, &sources, &citations, max)
            })
            .await?
        };
        for _ in 0..refinement.attempts {
            tracker.record_retry(
                run_id,
                stages::REFINE,
                RetryReason::HallucinationSmell,
                Some(provider.name()),
            );
        }
        tracker.record_tokens(run_id, refinement.usage);
        usage += refinement.usage;
        let event = if refinement.warning.is_some() {
            warnings.push(ErrorCode::ModelError);
            StageEvent::warn(stages::REFINE, ErrorCode::ModelError)
        } else {
            StageEvent::ok(stages::REFINE)
        };
        tracker.record_stage(run_id, event.with_duration_ms(elapsed_ms(started)));
        if !refinement.remaining.is_clean() {
            debug!(
                run_id = %run_id,
                stats = refinement.remaining.unsupported_stats.len(),
                listicle = refinement.remaining.listicle_cues.len(),
                "Smells remain after rewrite budget"
            );
        }
        let html = inject(&refinement.content, sources);

        // scrub
        let started = Instant::now();
        let mut scrubber = Scrubber::new(sources, self.config.citations.substitution);
        let scrubbed = scrubber.scrub(&html);
        let mut scrub = scrubbed.stats;
        let mut html = scrubbed.text;
        tracker.record_stage(
            run_id,
            StageEvent::ok(stages::SCRUB).with_duration_ms(elapsed_ms(started)),
        );

        // promise
        let mut promise_outcome = None;
        if let Some(promise) = &request.promise {
            let started = Instant::now();
            let reconciliation = {
                let heading = request.heading.clone();
                let promise = promise.clone();
                let content = html.clone();
                blocking(provider, move |p| reconcile(p, &heading, &content, &promise)).await?
            };
            if reconciliation.follow_up_calls > 0 {
                tracker.record_retry(
                    run_id,
                    stages::PROMISE,
                    RetryReason::PromiseUnderDelivered,
                    Some(provider.name()),
                );
                tracker.record_tokens(run_id, reconciliation.usage);
                usage += reconciliation.usage;

                // the follow-up is new model output and gets the same treatment
                let rescrubbed = scrubber.scrub(&inject(&reconciliation.content, sources));
                scrub += rescrubbed.stats;
                html = rescrubbed.text;
            }

            let event = if reconciliation.outcome.is_under_delivered() {
                warnings.push(ErrorCode::PromiseUnderDelivered);
                StageEvent::warn(stages::PROMISE, ErrorCode::PromiseUnderDelivered)
            } else {
                StageEvent::ok(stages::PROMISE)
            };
            tracker.record_stage(run_id, event.with_duration_ms(elapsed_ms(started)));
            promise_outcome = Some(reconciliation.outcome);
        }

        Ok(Draft {
            html,
            usage,
            scrub,
            rewrites: refinement.rewrites,
            promise: promise_outcome,
            warnings,
        })
    }
}

fn outcome(
    request: &SectionRequest,
    draft: Draft,
    spent: TokenUsage,
    retried: bool,
    fell_back: bool,
) -> SectionOutcome {
    let mut usage = draft.usage;
    usage += spent;
    SectionOutcome {
        section: Section::new(request.heading.trim(), draft.html),
        usage,
        scrub: draft.scrub,
        rewrites: draft.rewrites,
        promise: draft.promise,
        retried,
        fell_back,
        warnings: draft.warnings,
    }
}

/// Run a blocking model-calling step off the async runtime
async fn blocking<P, T, F>(provider: &Arc<P>, step: F) -> Result<T, PipelineError>
where
    P: Send + Sync + 'static,
    T: Send + 'static,
    F: FnOnce(&P) -> T + Send + 'static,
{
    let provider = Arc::clone(provider);
    tokio::task::spawn_blocking(move || step(&provider))
        .await
        .map_err(|e| PipelineError::Join(e.to_string()))
}

async fn generate<P>(provider: &Arc<P>, prompt: String) -> Result<Generation, PipelineError>
where
    P: LlmProvider + Send + Sync + 'static,
    P::Error: fmt::Display,
{
    let name = provider.name().to_string();
    blocking(provider, move |p| p.generate(&prompt).map_err(|e| e.to_string()))
        .await?
        .map_err(|message| PipelineError::Model {
            provider: name,
            message,
        })
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
