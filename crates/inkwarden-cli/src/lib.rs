//! Inkwarden CLI library.
//!
//! This library provides the pieces of the `inkwarden` command line:
//! argument parsing, configuration loading, the commands that run the
//! quality gate, scrubber, source verifier and promise checker over files,
//! the `run` command that writes articles through the section pipeline on
//! an Ollama model, and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use commands::Outcome;
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
