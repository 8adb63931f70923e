//! Inkwarden CLI - Quality gate for generated articles.

use clap::Parser;
use inkwarden_cli::commands;
use inkwarden_cli::{Cli, Command, Config, Formatter, Outcome};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run() -> inkwarden_cli::Result<Outcome> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Report(args) => commands::execute_report(args, &config, &formatter).await,
        Command::Scrub(args) => commands::execute_scrub(args, &config, &formatter).await,
        Command::Verify(args) => commands::execute_verify(args, &config, &formatter).await,
        Command::Promise(args) => commands::execute_promise(args, &formatter).await,
        Command::Run(args) => commands::execute_run(args, &config, &formatter).await,
        Command::Summary(args) => commands::execute_summary(args, &config, &formatter).await,
        Command::Config => commands::execute_config(&config, &formatter).await,
    }
}
