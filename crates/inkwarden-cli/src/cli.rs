//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use inkwarden_citations::Substitution;
use inkwarden_domain::ContentDomain;
use inkwarden_quality::GatePolicy;
use std::path::PathBuf;

/// Inkwarden CLI - Check generated articles before they ship.
#[derive(Debug, Parser)]
#[command(name = "inkwarden")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "INKWARDEN_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the quality rules against a document and apply the gate
    Report(ReportArgs),

    /// Remove links that are not on a source whitelist
    Scrub(ScrubArgs),

    /// Verify candidate sources and build a whitelist
    Verify(VerifyArgs),

    /// Show the promise a heading makes and check content against it
    Promise(PromiseArgs),

    /// Write articles from plans through the section pipeline
    Run(RunArgs),

    /// Summarize runs from a run log
    Summary(SummaryArgs),

    /// Print the effective configuration
    Config,
}

/// Arguments for the report command.
#[derive(Debug, Parser)]
pub struct ReportArgs {
    /// Document JSON file (`-` for stdin)
    pub document: PathBuf,

    /// Content domain; detected from the title and keyword when omitted
    #[arg(short, long, value_parser = parse_domain)]
    pub domain: Option<ContentDomain>,

    /// Primary keyword, used for domain detection
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Gate policy; overrides the `[gate]` table
    #[arg(short, long, value_parser = parse_policy)]
    pub policy: Option<GatePolicy>,
}

/// Arguments for the scrub command.
#[derive(Debug, Parser)]
pub struct ScrubArgs {
    /// Document JSON file (`-` for stdin)
    pub document: PathBuf,

    /// JSON array of `{title, url, snippet}` sources that may be cited
    #[arg(short, long)]
    pub whitelist: Option<PathBuf>,

    /// Handling of links outside the whitelist; overrides the config
    #[arg(short, long, value_enum)]
    pub substitution: Option<SubstitutionArg>,

    /// Also print the quality report of the scrubbed document
    #[arg(long)]
    pub report: bool,
}

/// Arguments for the verify command.
#[derive(Debug, Parser)]
pub struct VerifyArgs {
    /// JSON array of `{title, url, snippet}` candidates (`-` for stdin)
    pub candidates: PathBuf,

    /// Article keyword, used for relevance
    #[arg(short, long)]
    pub keyword: String,

    /// Content domain; detected from the keyword when omitted
    #[arg(short, long, value_parser = parse_domain)]
    pub domain: Option<ContentDomain>,

    /// Minimum sources requested by the brief
    #[arg(long)]
    pub min_sources: Option<usize>,

    /// Institutions expected to be authoritative for the topic
    #[arg(long = "institution")]
    pub institutions: Vec<String>,

    /// Skip the live accessibility layer
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the promise command.
#[derive(Debug, Parser)]
pub struct PromiseArgs {
    /// Section heading
    pub heading: String,

    /// Section HTML to check against the promise
    #[arg(long)]
    pub content: Option<PathBuf>,
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Article plan JSON files (`-` for stdin)
    #[arg(required = true)]
    pub plans: Vec<PathBuf>,

    /// Skip the live accessibility layer
    #[arg(long)]
    pub offline: bool,

    /// Append finished runs to this JSON-lines log
    #[arg(short, long)]
    pub log: Option<PathBuf>,

    /// Gate policy; overrides the `[gate]` table
    #[arg(short, long, value_parser = parse_policy)]
    pub policy: Option<GatePolicy>,

    /// Summary window in minutes; overrides the `[tracker]` table
    #[arg(short, long)]
    pub window: Option<u64>,
}

/// Arguments for the summary command.
#[derive(Debug, Parser)]
pub struct SummaryArgs {
    /// Run log written by `run --log` (`-` for stdin)
    pub log: PathBuf,

    /// Window in minutes; overrides the `[tracker]` table
    #[arg(short, long)]
    pub window: Option<u64>,
}

/// Substitution argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SubstitutionArg {
    /// Keep the visible link text
    RetainText,
    /// Replace unlisted link text with a whitelisted institution label
    InstitutionLabel,
}

impl From<SubstitutionArg> for Substitution {
    fn from(arg: SubstitutionArg) -> Self {
        match arg {
            SubstitutionArg::RetainText => Substitution::RetainText,
            SubstitutionArg::InstitutionLabel => Substitution::InstitutionLabel,
        }
    }
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

fn parse_domain(s: &str) -> std::result::Result<ContentDomain, String> {
    s.parse()
}

fn parse_policy(s: &str) -> std::result::Result<GatePolicy, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_command() {
        let cli = Cli::parse_from([
            "inkwarden",
            "report",
            "doc.json",
            "--domain",
            "travel",
            "--policy",
            "fail-on-warn",
        ]);
        match cli.command {
            Command::Report(args) => {
                assert_eq!(args.domain, Some(ContentDomain::Travel));
                assert_eq!(args.policy, Some(GatePolicy::FailOnWarn));
                assert_eq!(args.document, PathBuf::from("doc.json"));
            }
            _ => panic!("Expected Report command"),
        }
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result = Cli::try_parse_from(["inkwarden", "report", "doc.json", "--policy", "never"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verify_collects_institutions() {
        let cli = Cli::parse_from([
            "inkwarden",
            "verify",
            "candidates.json",
            "--keyword",
            "失眠",
            "--institution",
            "衛福部",
            "--institution",
            "國健署",
            "--offline",
        ]);
        match cli.command {
            Command::Verify(args) => {
                assert_eq!(args.institutions, vec!["衛福部", "國健署"]);
                assert!(args.offline);
                assert!(args.domain.is_none());
            }
            _ => panic!("Expected Verify command"),
        }
    }

    #[test]
    fn test_substitution_conversion() {
        let substitution: Substitution = SubstitutionArg::InstitutionLabel.into();
        assert_eq!(substitution, Substitution::InstitutionLabel);
    }

    #[test]
    fn test_run_command() {
        let cli = Cli::parse_from([
            "inkwarden",
            "run",
            "sleep.json",
            "budget.json",
            "--offline",
            "--log",
            "runs.jsonl",
            "--window",
            "30",
        ]);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.plans, vec![PathBuf::from("sleep.json"), PathBuf::from("budget.json")]);
                assert!(args.offline);
                assert_eq!(args.log, Some(PathBuf::from("runs.jsonl")));
                assert_eq!(args.window, Some(30));
                assert!(args.policy.is_none());
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_requires_a_plan() {
        assert!(Cli::try_parse_from(["inkwarden", "run"]).is_err());
    }

    #[test]
    fn test_summary_command() {
        let cli = Cli::parse_from(["inkwarden", "summary", "runs.jsonl"]);
        match cli.command {
            Command::Summary(args) => {
                assert_eq!(args.log, PathBuf::from("runs.jsonl"));
                assert!(args.window.is_none());
            }
            _ => panic!("Expected Summary command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["inkwarden", "config", "--format", "json", "--no-color"]);
        assert!(matches!(cli.command, Command::Config));
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert!(cli.no_color);
    }
}
