//! Summary command implementation.

use super::{read_input, Outcome};
use crate::cli::SummaryArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use inkwarden_tracker::{Clock, RunRecord, RunSummary, SystemClock};
use tracing::debug;

/// Execute the summary command.
///
/// Runs are read from a log written by `run --log`; none of them are
/// active any more.
pub async fn execute_summary(args: SummaryArgs, config: &Config, formatter: &Formatter) -> Result<Outcome> {
    let records = parse_run_log(&read_input(&args.log)?)?;
    let window = args.window.unwrap_or(config.tracker.default_window_minutes);
    debug!(runs = records.len(), window, "summarizing run log");

    let summary = RunSummary::within_window(&records, SystemClock.now(), window, config.tracker.sla_target_ms, 0);
    println!("{}", formatter.format_summary(&summary)?);
    Ok(Outcome::Accepted)
}

/// Parse a JSON-lines run log; blank lines are skipped.
pub fn parse_run_log(contents: &str) -> Result<Vec<RunRecord>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .map_err(|e| CliError::InvalidInput(format!("Run log line {} is not a run record: {}", idx + 1, e)))
        })
        .collect()
}
