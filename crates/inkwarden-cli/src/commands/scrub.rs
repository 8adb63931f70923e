//! Scrub command implementation.

use super::report::{gate, outcome};
use super::{parse_candidates, parse_document, read_input, Outcome};
use crate::cli::ScrubArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use inkwarden_citations::scrub_document;
use inkwarden_domain::ContentDomain;
use inkwarden_sources::{score_credibility, CredibilityContext, VerifiedSource, Whitelist};
use tracing::{info, warn};

/// Execute the scrub command.
pub async fn execute_scrub(args: ScrubArgs, config: &Config, formatter: &Formatter) -> Result<Outcome> {
    let mut doc = parse_document(&read_input(&args.document)?)?;
    let domain = ContentDomain::detect("", &doc.title);

    let whitelist = match &args.whitelist {
        Some(path) => whitelist_from_json(&read_input(path)?, domain)?,
        None => Whitelist::new(),
    };
    let substitution = args
        .substitution
        .map(Into::into)
        .unwrap_or(config.pipeline.citations.substitution);

    let stats = scrub_document(&mut doc, &whitelist, substitution);
    info!(
        whitelisted = whitelist.len(),
        links = stats.total,
        removed = stats.removed,
        bare_urls = stats.bare_urls_removed,
        "document scrubbed"
    );

    if !args.report {
        println!("{}", formatter.format_scrub(&doc, &stats, None)?);
        return Ok(Outcome::Accepted);
    }

    let (report, decision) = gate(&doc, domain, &config.gate, config.gate.policy)?;
    println!("{}", formatter.format_scrub(&doc, &stats, Some((&report, &decision)))?);
    Ok(outcome(&decision))
}

/// Build a whitelist from a JSON array of already-vetted sources.
///
/// Entries that fail the URL format check are skipped.
pub fn whitelist_from_json(json: &str, domain: ContentDomain) -> Result<Whitelist> {
    let ctx = CredibilityContext::new(domain);
    let mut whitelist = Whitelist::new();
    for candidate in parse_candidates(json)? {
        let score = score_credibility(&candidate, &ctx);
        let url = candidate.url.clone();
        match VerifiedSource::new(candidate, score) {
            Ok(source) => {
                whitelist.insert(source);
            }
            Err(e) => warn!(url = %url, error = %e, "skipping whitelist entry"),
        }
    }
    Ok(whitelist)
}
