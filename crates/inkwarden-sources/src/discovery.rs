//! Candidate discovery through the search collaborator

use crate::credibility::CredibilityContext;
use inkwarden_domain::traits::SourceSearch;
use inkwarden_domain::{ContentDomain, InstitutionType, SourceCandidate};
use std::fmt::Display;
use tracing::warn;

/// Maximum queries issued per topic
pub const MAX_QUERIES: usize = 5;

/// Build search queries for a topic
///
/// Expected institutions come first, then sector-scoped queries (official
/// sources only for law/general/finance, to keep gazettes out).
pub fn search_queries(keyword: &str, ctx: &CredibilityContext) -> Vec<String> {
    let keyword = keyword.trim();
    let mut queries: Vec<String> = ctx
        .institution_names
        .iter()
        .filter(|n| !n.trim().is_empty())
        .map(|name| format!("{} {}", keyword, name.trim()))
        .collect();

    match ctx.domain {
        ContentDomain::Law | ContentDomain::General => queries.push(format!("{} 法規 政策 site:gov.tw", keyword)),
        ContentDomain::Finance => queries.push(format!("{} 稅務 監管 site:gov.tw", keyword)),
        _ => {}
    }
    queries.push(format!("{} 完整指南 教學 攻略", keyword));
    queries.push(format!("{} 協會 學會 聯盟 site:org.tw", keyword));
    queries.push(format!("{} 研究報告 論文 site:edu.tw", keyword));
    queries.push(format!("{} 統計數據 調查報告", keyword));

    queries.truncate(MAX_QUERIES);
    queries
}

/// Run queries and gather candidates
///
/// A failing query is logged and skipped. Missing institution types are
/// guessed from the URL.
pub fn collect_candidates<S>(search: &S, queries: &[String], per_query: usize) -> Vec<SourceCandidate>
where
    S: SourceSearch + ?Sized,
    S::Error: Display,
{
    let mut candidates = Vec::new();
    for query in queries {
        match search.search(query, per_query) {
            Ok(found) => candidates.extend(found.into_iter().map(|mut c| {
                if c.institution_type.is_none() {
                    c.institution_type = Some(InstitutionType::guess_from_url(&c.url));
                }
                c
            })),
            Err(e) => warn!(query = %query, error = %e, "search failed"),
        }
    }
    candidates
}
