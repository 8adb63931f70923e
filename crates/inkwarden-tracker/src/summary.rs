//! Windowed statistics over completed runs

use crate::codes::{ErrorCode, QualityBucket};
use crate::record::RunRecord;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate token counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenSummary {
    /// Prompt plus completion tokens
    pub total_tokens: u64,
    /// Prompt tokens
    pub prompt_tokens: u64,
    /// Completion tokens
    pub completion_tokens: u64,
    /// Rounded mean of `total_tokens` per run
    pub avg_tokens_per_run: u64,
}

/// SLA attainment over successful runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SlaSummary {
    /// Duration target
    pub target_ms: u64,
    /// Successful runs within the target
    pub pass_runs: usize,
    /// `pass_runs / successful runs`
    pub pass_rate: f64,
}

/// Statistics for one trailing window
///
/// Rates are fractions rounded to four decimals; every rate is 0 for an
/// empty window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Window length
    pub window_minutes: u64,
    /// Completed runs started inside the window
    pub total_runs: usize,
    /// Successful runs
    pub success_runs: usize,
    /// Failed runs
    pub failed_runs: usize,
    /// `success_runs / total_runs`
    pub success_rate: f64,
    /// Rounded mean duration
    pub avg_duration_ms: u64,
    /// Retries across all runs
    pub total_retries: u64,
    /// Fraction of runs with at least one retry
    pub retry_rate: f64,
    /// Mean retries per run
    pub avg_retries_per_run: f64,
    /// Provider switches across all runs
    pub total_fallbacks: u64,
    /// Fraction of runs with at least one switch
    pub fallback_rate: f64,
    /// Mean switches per run
    pub avg_fallbacks_per_run: f64,
    /// Token counters
    pub token_usage: TokenSummary,
    /// SLA attainment
    pub sla: SlaSummary,
    /// Runs per quality band (every band present)
    pub quality_distribution: BTreeMap<QualityBucket, usize>,
    /// Failed runs per error code
    pub error_code_distribution: BTreeMap<ErrorCode, usize>,
    /// Runs not yet finished (not limited to the window)
    pub active_runs: usize,
}

fn rate(part: u64, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round4(part as f64 / whole as f64)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn rounded_mean(sum: u64, count: usize) -> u64 {
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round() as u64
}

impl RunSummary {
    /// Aggregate the runs started within `window_minutes` before `now`
    ///
    /// The window is at least one minute.
    pub fn within_window<'a, I>(
        runs: I,
        now: DateTime<Utc>,
        window_minutes: u64,
        sla_target_ms: u64,
        active_runs: usize,
    ) -> Self
    where
        I: IntoIterator<Item = &'a RunRecord>,
    {
        let window_minutes = window_minutes.max(1);
        let since = i64::try_from(window_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .and_then(|window| now.checked_sub_signed(window));

        Self::from_runs(
            runs.into_iter()
                .filter(|run| since.is_none_or(|since| run.started_at >= since)),
            window_minutes,
            sla_target_ms,
            active_runs,
        )
    }

    /// Aggregate `runs`, which must already be filtered to the window
    pub fn from_runs<'a, I>(runs: I, window_minutes: u64, sla_target_ms: u64, active_runs: usize) -> Self
    where
        I: IntoIterator<Item = &'a RunRecord>,
    {
        let runs: Vec<&RunRecord> = runs.into_iter().collect();
        let total = runs.len();

        let success_runs = runs.iter().filter(|r| r.succeeded()).count();
        let total_duration: u64 = runs.iter().map(|r| r.duration_ms.unwrap_or(0)).sum();
        let total_retries: u64 = runs.iter().map(|r| u64::from(r.retries)).sum();
        let total_fallbacks: u64 = runs.iter().map(|r| u64::from(r.fallbacks)).sum();
        let with_retries = runs.iter().filter(|r| r.retries > 0).count() as u64;
        let with_fallbacks = runs.iter().filter(|r| r.fallbacks > 0).count() as u64;

        let mut token_usage = TokenSummary::default();
        for run in &runs {
            token_usage.prompt_tokens += run.usage.prompt_tokens;
            token_usage.completion_tokens += run.usage.completion_tokens;
        }
        token_usage.total_tokens = token_usage.prompt_tokens + token_usage.completion_tokens;
        token_usage.avg_tokens_per_run = rounded_mean(token_usage.total_tokens, total);

        // a successful run with no recorded duration cannot be shown to meet the target
        let pass_runs = runs
            .iter()
            .filter(|r| r.succeeded() && r.duration_ms.is_some_and(|d| d <= sla_target_ms))
            .count();

        let mut quality_distribution: BTreeMap<QualityBucket, usize> =
            QualityBucket::ALL.iter().map(|b| (*b, 0)).collect();
        let mut error_code_distribution = BTreeMap::new();
        for run in &runs {
            *quality_distribution.entry(run.quality_bucket).or_insert(0) += 1;
            if !run.succeeded() {
                let code = run.error_code.unwrap_or(ErrorCode::UnknownError);
                *error_code_distribution.entry(code).or_insert(0) += 1;
            }
        }

        Self {
            window_minutes,
            total_runs: total,
            success_runs,
            failed_runs: total - success_runs,
            success_rate: rate(success_runs as u64, total),
            avg_duration_ms: rounded_mean(total_duration, total),
            total_retries,
            retry_rate: rate(with_retries, total),
            avg_retries_per_run: rate(total_retries, total),
            total_fallbacks,
            fallback_rate: rate(with_fallbacks, total),
            avg_fallbacks_per_run: rate(total_fallbacks, total),
            token_usage,
            sla: SlaSummary {
                target_ms: sla_target_ms,
                pass_runs,
                pass_rate: rate(pass_runs as u64, success_runs),
            },
            quality_distribution,
            error_code_distribution,
            active_runs,
        }
    }

    /// Human-readable report
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("Run Summary (last {} min)", self.window_minutes),
            "========================".to_string(),
            format!(
                "Runs: {} ({} ok, {} failed, {} active)",
                self.total_runs, self.success_runs, self.failed_runs, self.active_runs
            ),
            format!("Success rate: {:.2}%", self.success_rate * 100.0),
            format!("Avg duration: {}ms", self.avg_duration_ms),
            format!(
                "SLA ({}ms): {}/{} ({:.2}%)",
                self.sla.target_ms,
                self.sla.pass_runs,
                self.success_runs,
                self.sla.pass_rate * 100.0
            ),
            format!(
                "Retries: {} (rate {:.4}, {:.4}/run)",
                self.total_retries, self.retry_rate, self.avg_retries_per_run
            ),
            format!(
                "Fallbacks: {} (rate {:.4}, {:.4}/run)",
                self.total_fallbacks, self.fallback_rate, self.avg_fallbacks_per_run
            ),
            format!(
                "Tokens: {} ({} prompt, {} completion, {}/run)",
                self.token_usage.total_tokens,
                self.token_usage.prompt_tokens,
                self.token_usage.completion_tokens,
                self.token_usage.avg_tokens_per_run
            ),
            String::new(),
            "Quality:".to_string(),
        ];
        for (bucket, count) in &self.quality_distribution {
            lines.push(format!("  {}: {}", bucket, count));
        }

        if !self.error_code_distribution.is_empty() {
            lines.push(String::new());
            lines.push("Errors:".to_string());
            for (code, count) in &self.error_code_distribution {
                lines.push(format!("  {}: {}", code, count));
            }
        }

        lines.join("\n")
    }
}
