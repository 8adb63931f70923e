//! Verify command implementation.

use super::{parse_candidates, read_input, Outcome};
use crate::cli::VerifyArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use inkwarden_domain::ContentDomain;
use inkwarden_sources::{CredibilityContext, SourceVerifier, VerifierConfig};
use tracing::info;

/// Execute the verify command.
///
/// An unmet source minimum is an error, not a gate failure: the run
/// cannot start without sources.
pub async fn execute_verify(args: VerifyArgs, config: &Config, formatter: &Formatter) -> Result<Outcome> {
    let candidates = parse_candidates(&read_input(&args.candidates)?)?;
    let domain = args
        .domain
        .unwrap_or_else(|| ContentDomain::detect(&args.keyword, ""));
    let required = domain.required_sources(args.min_sources, true);

    let verifier = SourceVerifier::new(verifier_config(&config.verifier, args.offline))?;
    let ctx = CredibilityContext::new(domain).with_institutions(args.institutions);

    info!(
        domain = %domain,
        candidates = candidates.len(),
        required,
        offline = args.offline,
        "verifying sources"
    );
    let report = verifier
        .build_whitelist(candidates, &args.keyword, &ctx, required)
        .await?;

    println!("{}", formatter.format_verification(&report)?);
    Ok(Outcome::Accepted)
}

fn verifier_config(base: &VerifierConfig, offline: bool) -> VerifierConfig {
    let mut config = base.clone();
    if offline {
        config.check_accessibility = false;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_disables_accessibility() {
        let base = VerifierConfig::default();
        assert!(!verifier_config(&base, true).check_accessibility);
        assert_eq!(
            verifier_config(&base, false).check_accessibility,
            base.check_accessibility
        );
    }

    #[tokio::test]
    async fn test_offline_whitelist_meets_minimum() {
        let candidates = parse_candidates(
            r#"[
                {"title": "國民健康署 失眠衛教", "url": "https://www.hpa.gov.tw/insomnia", "snippet": "失眠的成因與改善"},
                {"title": "衛福部 失眠指引", "url": "https://www.mohw.gov.tw/insomnia", "snippet": "失眠治療建議"}
            ]"#,
        )
        .unwrap();
        let verifier = SourceVerifier::new(verifier_config(&VerifierConfig::default(), true)).unwrap();
        let ctx = CredibilityContext::new(ContentDomain::Health);

        let report = verifier
            .build_whitelist(candidates, "失眠", &ctx, ContentDomain::Health.required_sources(None, true))
            .await
            .unwrap();
        assert_eq!(report.whitelist.len(), 2);
        assert!(report.rejections.is_empty());
    }
}
