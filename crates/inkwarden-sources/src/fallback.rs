//! Pre-scored institutional fallback sources
//!
//! Used only when the caller opts in after search produced nothing usable.

use crate::verified::VerifiedSource;
use inkwarden_domain::{ContentDomain, InstitutionType, SourceCandidate};

struct Fallback {
    title: &'static str,
    url: &'static str,
    snippet: &'static str,
    institution: &'static str,
    kind: InstitutionType,
    score: u8,
}

const HEALTH: &[Fallback] = &[
    Fallback {
        title: "衛生福利部",
        url: "https://www.mohw.gov.tw",
        snippet: "中華民國衛生福利部官方網站",
        institution: "衛生福利部",
        kind: InstitutionType::Government,
        score: 90,
    },
    Fallback {
        title: "國民健康署",
        url: "https://www.hpa.gov.tw",
        snippet: "提供國民健康資訊與疾病預防指引",
        institution: "衛生福利部國民健康署",
        kind: InstitutionType::Government,
        score: 90,
    },
];

const FINANCE: &[Fallback] = &[
    Fallback {
        title: "金融監督管理委員會證券期貨局",
        url: "https://www.sfb.gov.tw",
        snippet: "主管台灣證券期貨市場，包含海外投資規範",
        institution: "金管會證期局",
        kind: InstitutionType::Government,
        score: 95,
    },
    Fallback {
        title: "臺灣證券交易所",
        url: "https://www.twse.com.tw",
        snippet: "提供投資人教育資料與市場數據",
        institution: "臺灣證券交易所",
        kind: InstitutionType::Government,
        score: 90,
    },
    Fallback {
        title: "U.S. Securities and Exchange Commission (SEC)",
        url: "https://www.sec.gov",
        snippet: "美國證券市場監管機構，提供投資人教育內容",
        institution: "美國證券交易委員會",
        kind: InstitutionType::Government,
        score: 95,
    },
    Fallback {
        title: "FINRA",
        url: "https://www.finra.org",
        snippet: "美國金融業監管局，提供券商背景查詢",
        institution: "美國金融業監管局",
        kind: InstitutionType::ProfessionalOrg,
        score: 90,
    },
];

const TECH: &[Fallback] = &[Fallback {
    title: "資策會產業情報研究所",
    url: "https://mic.iii.org.tw",
    snippet: "科技產業趨勢分析與市場研究",
    institution: "資策會MIC",
    kind: InstitutionType::ProfessionalOrg,
    score: 80,
}];

const EDUCATION: &[Fallback] = &[Fallback {
    title: "勞動部勞動力發展署",
    url: "https://www.wda.gov.tw",
    snippet: "職業訓練、技能檢定與就業服務",
    institution: "勞動部勞動力發展署",
    kind: InstitutionType::Government,
    score: 90,
}];

const LIFESTYLE: &[Fallback] = &[Fallback {
    title: "交通部觀光署",
    url: "https://www.taiwan.net.tw",
    snippet: "國內旅遊景點、低碳旅遊資訊",
    institution: "交通部觀光署",
    kind: InstitutionType::Government,
    score: 85,
}];

const GENERAL: &[Fallback] = &[Fallback {
    title: "行政院",
    url: "https://www.ey.gov.tw",
    snippet: "政府政策、公共服務與施政資訊",
    institution: "行政院",
    kind: InstitutionType::Government,
    score: 90,
}];

/// Fallback sources for a domain, highest score first
///
/// Travel shares the lifestyle list; law shares the general one.
///
/// # Examples
///
/// ```
/// use inkwarden_domain::ContentDomain;
/// use inkwarden_sources::fallback_sources;
///
/// let sources = fallback_sources(ContentDomain::Health);
/// assert_eq!(sources.len(), 2);
/// assert!(sources.iter().all(|s| s.url().ends_with(".gov.tw")));
/// ```
pub fn fallback_sources(domain: ContentDomain) -> Vec<VerifiedSource> {
    let table = match domain {
        ContentDomain::Health => HEALTH,
        ContentDomain::Finance => FINANCE,
        ContentDomain::Tech => TECH,
        ContentDomain::Education => EDUCATION,
        ContentDomain::Lifestyle | ContentDomain::Travel => LIFESTYLE,
        ContentDomain::Law | ContentDomain::General => GENERAL,
    };

    let mut sources: Vec<VerifiedSource> = table
        .iter()
        .filter_map(|f| {
            let candidate = SourceCandidate::new(f.title, f.url, f.snippet).with_institution(f.institution, f.kind);
            VerifiedSource::new(candidate, f.score).ok()
        })
        .collect();
    sources.sort_by(|a, b| b.credibility_score().cmp(&a.credibility_score()));
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::validate_format;

    #[test]
    fn test_every_domain_has_fallbacks() {
        for domain in ContentDomain::ALL {
            assert!(!fallback_sources(domain).is_empty(), "{} has no fallbacks", domain);
        }
    }

    #[test]
    fn test_fallbacks_pass_format_check() {
        for table in [HEALTH, FINANCE, TECH, EDUCATION, LIFESTYLE, GENERAL] {
            for f in table {
                assert!(validate_format(f.url).valid, "{}", f.url);
            }
        }
    }

    #[test]
    fn test_finance_ordering() {
        let sources = fallback_sources(ContentDomain::Finance);
        assert_eq!(sources.len(), 4);
        assert_eq!(sources[0].credibility_score(), 95);
        assert_eq!(sources[3].institution_type(), InstitutionType::ProfessionalOrg);
    }

    #[test]
    fn test_travel_uses_tourism_bureau() {
        let sources = fallback_sources(ContentDomain::Travel);
        assert_eq!(sources[0].label(), "交通部觀光署");
    }
}
