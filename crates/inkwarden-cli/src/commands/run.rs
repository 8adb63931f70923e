//! Run command implementation.

use super::read_input;
use super::report::gate;
use super::Outcome;
use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use inkwarden_domain::traits::LlmProvider;
use inkwarden_domain::{ContentDomain, Document, SourceCandidate};
use inkwarden_llm::OllamaProvider;
use inkwarden_pipeline::{SectionOutcome, SectionPipeline, SectionRequest};
use inkwarden_quality::{GateDecision, GatePolicy, QualityConfig, QualityReport};
use inkwarden_sources::{CredibilityContext, SourceVerifier};
use inkwarden_tracker::{Clock, ErrorCode, FinishRun, RunRecord, RunTracker, StageEvent};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Pipeline name recorded for article runs
pub const ARTICLE_PIPELINE: &str = "article";

/// Stage names recorded around the section stages
pub mod stages {
    /// Source verification
    pub const SOURCES: &str = "sources";
    /// Quality gate over the assembled article
    pub const QUALITY: &str = "quality";
}

/// Article plan read by `run`
#[derive(Debug, Clone, Deserialize)]
pub struct ArticlePlan {
    /// Article title
    pub title: String,

    /// Primary keyword
    #[serde(default)]
    pub keyword: String,

    /// Meta description copied into the document
    #[serde(default)]
    pub meta_description: String,

    /// Content domain; detected from the keyword and title when omitted
    #[serde(default)]
    pub domain: Option<ContentDomain>,

    /// Minimum sources requested by the brief
    #[serde(default)]
    pub min_sources: Option<usize>,

    /// Institutions expected to be authoritative for the topic
    #[serde(default)]
    pub institutions: Vec<String>,

    /// Sections in order
    pub sections: Vec<SectionPlan>,

    /// Candidate sources
    #[serde(default)]
    pub sources: Vec<SourceCandidate>,
}

/// One planned section
#[derive(Debug, Clone, Deserialize)]
pub struct SectionPlan {
    /// H2 text
    pub heading: String,

    /// What the section should cover
    #[serde(default)]
    pub brief: String,
}

impl ArticlePlan {
    fn domain(&self) -> ContentDomain {
        self.domain
            .unwrap_or_else(|| ContentDomain::detect(&self.keyword, &self.title))
    }
}

/// A finished article run
#[derive(Debug, Clone, Serialize)]
pub struct ArticleRun {
    /// Tracker record of the run
    pub record: RunRecord,
    /// Assembled article
    pub document: Document,
    /// Per-section results, in plan order
    pub sections: Vec<SectionOutcome>,
    /// Quality report over the article
    pub report: QualityReport,
    /// Gate verdict
    pub gate: GateDecision,
}

/// Parse an article plan from JSON.
pub fn parse_plan(json: &str) -> Result<ArticlePlan> {
    let plan: ArticlePlan = serde_json::from_str(json)
        .map_err(|e| CliError::InvalidInput(format!("Article plan is not valid JSON: {}", e)))?;
    if plan.sections.is_empty() {
        return Err(CliError::InvalidInput(format!("Article plan '{}' has no sections", plan.title)));
    }
    Ok(plan)
}

/// Execute the run command.
///
/// Plans run one after another on a single tracker. A failed plan is
/// reported and the remaining plans still run.
pub async fn execute_run(args: RunArgs, config: &Config, formatter: &Formatter) -> Result<Outcome> {
    let pipeline = build_pipeline(config)?;
    let mut verifier_config = config.verifier.clone();
    if args.offline {
        verifier_config.check_accessibility = false;
    }
    let verifier = SourceVerifier::new(verifier_config)?;
    let tracker = RunTracker::new(config.tracker.clone())?;
    let policy = args.policy.unwrap_or(config.gate.policy);

    let total = args.plans.len();
    let mut failed = 0;
    let mut outcome = Outcome::Accepted;
    for path in &args.plans {
        let result = match read_input(path).and_then(|json| parse_plan(&json)) {
            Ok(plan) => run_article(&plan, &pipeline, &verifier, &tracker, &config.gate, policy).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(article) => {
                if !article.gate.accepted {
                    outcome = Outcome::GateFailed;
                }
                println!("{}", formatter.format_run(&article)?);
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}", formatter.error(&format!("{}: {}", path.display(), e)));
            }
        }
    }

    if let Some(log) = &args.log {
        let mut finished = tracker.recent(total);
        finished.reverse();
        append_log(log, &finished)?;
    }
    println!("{}", formatter.format_summary(&tracker.summary(args.window))?);

    if failed > 0 {
        return Err(CliError::RunsFailed { failed, total });
    }
    Ok(outcome)
}

fn build_pipeline(config: &Config) -> Result<SectionPipeline<OllamaProvider>> {
    let model = &config.model;
    let primary = OllamaProvider::new(&model.endpoint, &model.model)?.with_max_retries(model.max_retries);
    let mut pipeline = SectionPipeline::new(primary, config.pipeline.clone())?;
    if let Some(fallback) = &model.fallback_model {
        let fallback = OllamaProvider::new(&model.endpoint, fallback)?.with_max_retries(model.max_retries);
        pipeline = pipeline.with_fallback(fallback);
    }
    info!(endpoint = %model.endpoint, model = %model.model, fallback = ?model.fallback_model, "model configured");
    Ok(pipeline)
}

/// Write one article: verify sources, write every section, then gate
/// the assembled document
///
/// The run is always finished on the tracker, including on error.
pub async fn run_article<P, C>(
    plan: &ArticlePlan,
    pipeline: &SectionPipeline<P>,
    verifier: &SourceVerifier,
    tracker: &RunTracker<C>,
    gate_config: &QualityConfig,
    policy: GatePolicy,
) -> Result<ArticleRun>
where
    P: LlmProvider + Send + Sync + 'static,
    P::Error: fmt::Display,
    C: Clock,
{
    let domain = plan.domain();
    let run_id = tracker.start(
        ARTICLE_PIPELINE,
        pipeline.provider_name(),
        [("keyword", plan.keyword.clone()), ("domain", domain.to_string())],
    );

    let started = Instant::now();
    let ctx = CredibilityContext::new(domain).with_institutions(plan.institutions.iter().cloned());
    let required = domain.required_sources(plan.min_sources, true);
    let batch = match verifier
        .build_whitelist(plan.sources.clone(), &plan.keyword, &ctx, required)
        .await
    {
        Ok(batch) => batch,
        Err(e) => {
            let code: ErrorCode = e.code().parse().unwrap_or(ErrorCode::UnknownError);
            tracker.record_stage(
                &run_id,
                StageEvent::error(stages::SOURCES, code).with_duration_ms(elapsed_ms(started)),
            );
            tracker.finish(&run_id, FinishRun::failed(code));
            warn!(run_id = %run_id, code = %code, error = %e, "article run failed at sources");
            return Err(e.into());
        }
    };
    tracker.record_stage(
        &run_id,
        StageEvent::ok(stages::SOURCES).with_duration_ms(elapsed_ms(started)),
    );
    let sources = Arc::new(batch.whitelist);

    let mut sections = Vec::with_capacity(plan.sections.len());
    for section in &plan.sections {
        let request = SectionRequest::new(&section.heading, &section.brief).with_keyword(&plan.keyword);
        match pipeline.run(tracker, &run_id, &request, &sources).await {
            Ok(outcome) => sections.push(outcome),
            Err(e) => {
                tracker.finish(&run_id, FinishRun::failed(e.code()));
                warn!(run_id = %run_id, heading = %section.heading, error = %e, "article run failed");
                return Err(e.into());
            }
        }
    }

    let document = Document {
        title: plan.title.clone(),
        meta_description: plan.meta_description.clone(),
        sections: sections.iter().map(|s| s.section.clone()).collect(),
        ..Default::default()
    };

    let started = Instant::now();
    let (report, decision) = match gate(&document, domain, gate_config, policy) {
        Ok(gated) => gated,
        Err(e) => {
            tracker.finish(&run_id, FinishRun::failed(ErrorCode::UnknownError));
            return Err(e);
        }
    };
    tracker.record_stage(
        &run_id,
        StageEvent::ok(stages::QUALITY).with_duration_ms(elapsed_ms(started)),
    );

    let record = tracker
        .finish(&run_id, FinishRun::succeeded(Some(report.score())))
        .ok_or_else(|| CliError::InvalidInput(format!("run {} was finished twice", run_id)))?;

    Ok(ArticleRun {
        record,
        document,
        sections,
        report,
        gate: decision,
    })
}

/// Append records to a JSON-lines log, one record per line.
pub fn append_log(path: &Path, records: &[RunRecord]) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for record in records {
        writeln!(file, "{}", serde_json::to_string(record)?)?;
    }
    info!(path = %path.display(), runs = records.len(), "run log appended");
    Ok(())
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
