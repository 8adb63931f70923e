//! Versioned quality rule registry

use crate::error::QualityError;
use crate::itinerary::ItineraryConsistency;
use crate::matchers::{IncludesAny, MatchResult, Matcher, RegexAny, RequireAtLeast};
use crate::normalization::{normalization_rules, NormalizationMatcher};
use inkwarden_domain::ContentDomain;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Version of the built-in rule set
///
/// Bump whenever a rule is added, removed or its matcher changes, so stored
/// reports can be compared against the rules that produced them.
pub const RULESET_VERSION: &str = "2025.06.1";

/// Rule severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fails the gate
    Error,
    /// Reported, does not fail the default gate
    Warn,
    /// Informational
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
        })
    }
}

/// Where a rule is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Once per content field, counts aggregated
    #[default]
    Field,
    /// Once over all fields joined with newlines
    Article,
}

/// A named, versioned check
#[derive(Debug, Clone)]
pub struct QualityRule {
    /// Stable id, unique within a registry
    pub id: String,

    /// Severity of a hit
    pub severity: Severity,

    /// Human-readable guidance
    pub message: String,

    /// Evaluation scope
    pub scope: Scope,

    /// Allow-list of domains; empty applies everywhere
    pub domains: Vec<ContentDomain>,

    matcher: Arc<dyn Matcher>,
}

impl QualityRule {
    /// Create a field-scoped rule that applies to every domain
    pub fn new(
        id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        matcher: impl Matcher + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            scope: Scope::Field,
            domains: Vec::new(),
            matcher: Arc::new(matcher),
        }
    }

    /// Set the evaluation scope
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Restrict to the given domains
    pub fn with_domains(mut self, domains: impl IntoIterator<Item = ContentDomain>) -> Self {
        self.domains = domains.into_iter().collect();
        self
    }

    /// Whether this rule runs for documents of `domain`
    pub fn applies_to(&self, domain: ContentDomain) -> bool {
        self.domains.is_empty() || self.domains.contains(&domain)
    }

    /// Run the matcher
    pub fn scan(&self, text: &str) -> MatchResult {
        self.matcher.scan(text)
    }
}

/// An ordered set of rules with unique ids
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    version: String,
    rules: Vec<QualityRule>,
}

impl RuleRegistry {
    /// Create an empty registry
    pub fn empty(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            rules: Vec::new(),
        }
    }

    /// Build the built-in rule set
    ///
    /// Static rules come first, then the `derived.tone.*` rules generated
    /// from the normalization table.
    pub fn standard() -> Result<Self, QualityError> {
        let mut registry = Self::empty(RULESET_VERSION);

        registry.register(QualityRule::new(
            "taiwan.pronoun.avoid_nin",
            Severity::Warn,
            "避免使用「您／您的」，請統一使用「你／你的」。",
            IncludesAny::new(["您", "您的"]),
        ))?;
        registry.register(QualityRule::new(
            "tone.template.opening",
            Severity::Warn,
            "避免模板開場（例如「在這篇文章中…」「本文將…」）。",
            IncludesAny::new([
                "在這篇文章中",
                "在本篇文章中",
                "在這篇《",
                "在本文中",
                "本文將",
                "這篇文章將",
                "本篇文章將",
                "在文章中",
                "文章整理了",
                "將介紹",
                "你是否也曾",
                "你是否曾",
                "你是不是也曾",
                "你是不是也",
                "是否也曾",
            ]),
        ))?;
        registry.register(QualityRule::new(
            "tone.strong_cta",
            Severity::Warn,
            "避免過強 CTA（例如「立即行動」「現在就…」）。",
            IncludesAny::new(["立即行動", "現在，請立即行動", "現在就", "馬上就"]),
        ))?;
        registry.register(QualityRule::new(
            "tone.chicken_soup",
            Severity::Info,
            "避免雞湯口號式句子。",
            IncludesAny::new(["讓未來的你感謝現在", "從今天開始", "你值得", "勇敢踏出第一步"]),
        ))?;
        registry.register(QualityRule::new(
            "format.no_anchor_tags",
            Severity::Error,
            "禁止出現 <a> 連結（外部/內部連結都不允許）。",
            compile("format.no_anchor_tags", r"(?i)<a\b[^>]*>")?,
        ))?;
        registry.register(QualityRule::new(
            "format.no_raw_urls",
            Severity::Error,
            "禁止出現完整 URL。",
            compile(
                "format.no_raw_urls",
                r"(?i)https?://[\w\-._~:/?#\[\]@!$&'()*+,;=%]+",
            )?,
        ))?;
        registry.register(QualityRule::new(
            "style.ai_filler",
            Severity::Info,
            "避免 AI 慣用空泛詞（可接受少量，但建議降低）。",
            IncludesAny::new(["深入探討", "不容忽視", "值得注意的是", "眾所周知", "毋庸置疑", "顯而易見"]),
        ))?;

        let itinerary_days = RequireAtLeast::new(
            r"(?i)(?:Day\s*\d+|D\s*\d+|第\s*\d+\s*天)",
            3,
            "缺少 Day1/Day2/Day3（或「第1天/第2天/第3天」）等行程拆解",
        )
        .map_err(|source| QualityError::InvalidPattern {
            rule_id: "travel.deliverable.itinerary_days".to_string(),
            source,
        })?;
        registry.register(
            QualityRule::new(
                "travel.deliverable.itinerary_days",
                Severity::Warn,
                "旅遊文章需要提供可直接照做的行程拆解（至少 3 天的 Day/第X天）。",
                itinerary_days,
            )
            .with_domains([ContentDomain::Travel])
            .with_scope(Scope::Article),
        )?;
        registry.register(
            QualityRule::new(
                "travel.avoid_finance_residue",
                Severity::Warn,
                "旅遊文章避免出現理財語境殘留（例如「收支盤點」「ETF」「報酬率」等）。",
                IncludesAny::new(["收支盤點", "資產配置", "投資報酬", "報酬率", "年化", "ETF", "基金", "股票"]),
            )
            .with_domains([ContentDomain::Travel]),
        )?;
        registry.register(
            QualityRule::new(
                "travel.itinerary_consistency",
                Severity::Warn,
                "旅遊文章的行程快覽與內文敘述需一致（避免第X天/DayX/景點安排互相矛盾）。",
                ItineraryConsistency::default(),
            )
            .with_domains([ContentDomain::Travel])
            .with_scope(Scope::Article),
        )?;

        for rule in normalization_rules().iter().filter(|r| r.is_reportable_tone()) {
            let (severity, message) = derived_tone_policy(rule.id);
            registry.register(QualityRule::new(
                format!("derived.{}", rule.id),
                severity,
                message,
                NormalizationMatcher::new(rule),
            ))?;
        }

        Ok(registry)
    }

    /// Add a rule, rejecting duplicate ids
    pub fn register(&mut self, rule: QualityRule) -> Result<(), QualityError> {
        if self.get(&rule.id).is_some() {
            return Err(QualityError::DuplicateRuleId(rule.id));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Copy of this registry without the named rules
    ///
    /// # Errors
    ///
    /// Returns `QualityError::UnknownRule` for an id not in the registry.
    pub fn without(&self, ids: &[String]) -> Result<Self, QualityError> {
        if let Some(unknown) = ids.iter().find(|id| self.get(id).is_none()) {
            return Err(QualityError::UnknownRule(unknown.clone()));
        }
        let drop: HashSet<&str> = ids.iter().map(String::as_str).collect();
        Ok(Self {
            version: self.version.clone(),
            rules: self
                .rules
                .iter()
                .filter(|r| !drop.contains(r.id.as_str()))
                .cloned()
                .collect(),
        })
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[QualityRule] {
        &self.rules
    }

    /// Find a rule by id
    pub fn get(&self, id: &str) -> Option<&QualityRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Rule set version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the registry has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// The shared built-in registry
///
/// Built once; rule patterns are literals, so a build failure is a bug.
pub fn get_rules() -> &'static RuleRegistry {
    static REGISTRY: OnceLock<RuleRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| RuleRegistry::standard().expect("built-in quality rules must compile"))
}

fn compile(rule_id: &str, pattern: &str) -> Result<RegexAny, QualityError> {
    RegexAny::single(pattern).map_err(|source| QualityError::InvalidPattern {
        rule_id: rule_id.to_string(),
        source,
    })
}

fn derived_tone_policy(id: &str) -> (Severity, &'static str) {
    if id.starts_with("tone.cta.") {
        (Severity::Warn, "避免過強或命令式 CTA。")
    } else if id.starts_with("tone.template.") {
        (Severity::Warn, "避免模板化套話與機械式敘事。")
    } else if id.starts_with("tone.leadgen.") {
        (Severity::Warn, "避免不自然的口號/雞湯/過度承諾語氣。")
    } else {
        (Severity::Info, "避免不自然的口號/雞湯/過度承諾語氣。")
    }
}
