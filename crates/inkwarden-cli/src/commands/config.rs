//! Config command implementation.

use super::Outcome;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the config command.
pub async fn execute_config(config: &Config, formatter: &Formatter) -> Result<Outcome> {
    println!("{}", render(config, formatter)?);
    Ok(Outcome::Accepted)
}

fn render(config: &Config, formatter: &Formatter) -> Result<String> {
    if formatter.is_json() {
        Ok(serde_json::to_string_pretty(config)?)
    } else {
        config.to_toml()
    }
}
