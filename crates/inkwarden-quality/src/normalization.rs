//! Taiwan-style normalization table
//!
//! Deterministic phrase rewrites applied to generated text. The same rule ids
//! feed the registry: every `tone.*` entry (except `tone.word.*`) becomes a
//! `derived.tone.*` reporting rule, so rewrite and report never drift apart.

use crate::matchers::{MatchResult, Matcher, MAX_SAMPLES};
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// One rewrite rule
#[derive(Debug)]
pub struct NormalizationRule {
    /// Stable id (`tone.cta.*`, `taiwan.word.*`, ...)
    pub id: &'static str,

    pattern: Regex,

    /// Replacement text
    pub replacement: &'static str,

    /// Leave a match alone when this character follows it
    not_followed_by: Option<char>,
}

impl NormalizationRule {
    fn kept(&self, haystack: &str, end: usize) -> bool {
        match self.not_followed_by {
            Some(c) => haystack[end..].starts_with(c),
            None => false,
        }
    }

    /// Matches this rule would rewrite, in order
    pub fn find_all<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.pattern
            .find_iter(text)
            .filter(|m| !self.kept(text, m.end()))
            .map(|m| m.as_str())
            .collect()
    }

    /// Apply the rewrite
    pub fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &Captures<'_>| match caps.get(0) {
                Some(m) if self.kept(text, m.end()) => m.as_str().to_string(),
                _ => self.replacement.to_string(),
            })
            .into_owned()
    }

    /// Whether this rule feeds a derived reporting rule
    pub fn is_reportable_tone(&self) -> bool {
        self.id.starts_with("tone.") && !self.id.starts_with("tone.word.")
    }
}

type Entry = (&'static str, &'static str, &'static str, Option<char>);

const TABLE: &[Entry] = &[
    // Pronouns: always 你
    ("taiwan.pronoun.ninmen_to_nimen", "您們", "你們", None),
    ("taiwan.pronoun.ninde_to_nide", "您的", "你的", None),
    ("taiwan.pronoun.nin_to_ni", "您", "你", None),
    // Slogans
    ("tone.slogan.remove_let_us_start", "讓我們一起啟程吧！?", "", None),
    ("tone.slogan.remove_let_us_begin", "讓我們一起開始吧！?", "", None),
    ("tone.slogan.remove_start_journey", "一起啟程吧！?", "", None),
    ("tone.slogan.remove_start", "一起開始吧！?", "", None),
    ("tone.slogan.soften_let_us_together", "讓我們一起", "接下來", None),
    ("tone.opening.soften_imagine", "想像一下，?", "先從一個常見情境開始：", None),
    // Taiwan vocabulary
    ("taiwan.word.plan", "計劃", "計畫", None),
    ("taiwan.word.through", "通過", "透過", None),
    ("taiwan.word.account_zh1", "賬戶", "帳戶", None),
    ("taiwan.word.account_zh2", "賬號", "帳號", None),
    // Template narration
    ("tone.template.we_provide_1", "在這篇文章中，我們將為你提供", "這篇文章會提供你", None),
    ("tone.template.we_provide_2", "本文將為你提供", "這篇文章會提供你", None),
    ("tone.template.will_lead_you", "在這篇文章中，將帶你", "這篇文章會帶你", None),
    ("tone.template.this_article_will", "這篇文章將", "這份整理會", None),
    ("tone.template.remove_you_have_you_ever", "你是否也曾", "很多人會", None),
    ("tone.template.remove_you_have_you_ever_short", "是否也曾", "如果你曾經", None),
    ("tone.template.remove_are_you_also", "你是不是也曾", "很多人會", None),
    ("tone.template.remove_in_this_article_phrase", "在這篇文章中", "下面", None),
    ("tone.template.remove_in_this_post_phrase", "在本文中", "下面", None),
    ("tone.template.post_will_provide", r"本文\s*(?:將|会|會)\s*提供", "這份整理會提供", None),
    ("tone.template.article_will_provide", r"這篇文章\s*(?:將|会|會)\s*提供", "這份整理會提供", None),
    ("tone.template.introduce_1", r"在這篇文章中[，,]?\s*將介紹", "這份整理會介紹", None),
    ("tone.template.introduce_2", r"在這篇文章中[，,]?\s*會介紹", "這份整理會介紹", None),
    ("tone.template.introduce_3", "這篇文章[將会]介紹", "這份整理會介紹", None),
    ("tone.template.introduce_4", "本文將介紹", "這份整理會介紹", None),
    (
        "tone.template.introduce_in_post_1",
        r"在本文中[，,]?\s*(?:我們\s*)?(?:將|会|會)?\s*介紹",
        "這份整理會介紹",
        None,
    ),
    ("tone.template.discuss_1", r"在這篇文章中[，,]?\s*(?:將|会|會)?\s*探討", "這份整理會探討", None),
    ("tone.template.discuss_2", r"在本文中[，,]?\s*(?:將|会|會)?\s*探討", "這份整理會探討", None),
    ("tone.template.discuss_3", r"本文\s*(?:將|会|會)?\s*探討", "這份整理會探討", None),
    ("tone.template.discuss_4", r"這篇文章\s*(?:將|会|會)?\s*探討", "這份整理會探討", None),
    ("tone.template.explain_1", r"在這篇文章中[，,]?\s*(?:將|会|會)?\s*說明", "這份整理會說明", None),
    ("tone.template.explain_2", r"在本文中[，,]?\s*(?:將|会|會)?\s*說明", "這份整理會說明", None),
    ("tone.template.explain_3", r"本文\s*(?:將|会|會)?\s*說明", "這份整理會說明", None),
    ("tone.template.explain_4", r"這篇文章\s*(?:將|会|會)?\s*說明", "這份整理會說明", None),
    ("tone.template.share_1", r"在這篇文章中[，,]?\s*(?:將|会|會)?\s*分享", "這份整理會分享", None),
    ("tone.template.share_2", r"在本文中[，,]?\s*(?:將|会|會)?\s*分享", "這份整理會分享", None),
    ("tone.template.share_3", r"本文\s*(?:將|会|會)?\s*分享", "這份整理會分享", None),
    ("tone.template.share_4", r"這篇文章\s*(?:將|会|會)?\s*分享", "這份整理會分享", None),
    ("tone.template.in_this_article_we_1", "在本文中，我們", "在本文中，", None),
    ("tone.template.in_this_article_we_2", "在這篇文章中，我們", "在這篇文章中，", None),
    ("tone.template.we_will", "我們將", "這份整理會", None),
    ("tone.template.we_discussed", "我們探討了", "這篇文章整理了", None),
    ("tone.template.this_article_summarized_to_here", "這篇文章整理了", "這裡整理了", None),
    ("tone.template.article_summarized_bare", "文章整理了", "重點整理如下", None),
    ("tone.template.in_this_post_discussed", "在本文中，探討了", "這篇文章整理了", None),
    ("tone.word.finance_trip", "理財之旅", "理財規劃", None),
    // Calls to action
    ("tone.cta.soften_start_now", "立即開始你的理財規劃[！!]?", "你可以從今天開始規劃理財", None),
    ("tone.cta.soften_start_now_2", "現在就開始你的理財規劃吧[！!]?", "你可以從今天開始規劃理財", None),
    ("tone.cta.remove_act_now_1", r"現在[，,]?\s*請立即行動[：:，,]?\s*", "你可以先從這一步開始：", None),
    ("tone.cta.remove_act_now_2", r"請立即行動[：:，,]?\s*", "你可以先從這一步開始：", None),
    ("tone.cta.soften_act_now_finance", r"立即行動[，,]\s*開始理財", "開始規劃理財", None),
    ("tone.cta.soften_act_now_generic", "立即行動", "開始著手", None),
    // Lead generation
    ("tone.leadgen.remove_free_download", "立即下載我的免費[^。！？!]*[。！？!]?", "", None),
    ("tone.leadgen.remove_bundle_download", "立即下載我的資源包[^。！？!]*[。！？!]?", "", None),
    // Over-promising
    ("tone.overpromise.soften_help", "絕對能助你一臂之力", "能幫你更好上手", None),
    ("tone.overpromise.future_work", "為你的未來工作", "為你的未來累積", None),
    ("tone.overpromise.two_years_bucket", "也能讓你在兩年內存到第一桶金", "有機會逐步存到第一桶金", None),
    ("tone.overpromise.financial_freedom", "邁向財務自由", "朝財務目標前進", None),
    ("tone.cta.now_is_time_1", "現在是時候行動了！", "你可以從今天開始：", None),
    ("tone.cta.now_is_time_2", "現在是時候行動了[，,]", "你可以從今天開始：", None),
    ("tone.cta.soften_start_right_now", "現在就開始", "你可以開始", None),
    // 現在就是 / 馬上就是 stay as they are
    ("tone.cta.soften_now_just", "現在就", "先", Some('是')),
    ("tone.cta.soften_rightaway_just", "馬上就", "很快就", Some('是')),
    ("tone.word.future_financial_freedom", "未來財務自由", "未來財務目標", None),
    ("tone.word.foundation", "財務自由的基石", "財務目標的基礎", None),
    ("tone.word.newbies", "新手們", "新手", None),
    ("tone.template.through_this_post", "透過本篇文章，文章整理了", "這篇文章整理了", None),
    ("tone.word.journey_process", "理財的旅程", "理財的過程", None),
    (
        "tone.template.in_article_article_summarized_1",
        r"在(?:這篇)?文章中[，,]?\s*文章整理了",
        "這篇文章整理了",
        None,
    ),
    (
        "tone.template.in_article_article_summarized_2",
        r"在(?:這篇)?文章中[，,]?\s*這篇文章整理了",
        "這篇文章整理了",
        None,
    ),
    ("tone.template.in_article_discussed", r"在(?:這篇)?文章中[，,]?\s*探討了", "這篇文章整理了", None),
    ("tone.template.in_post_article_summarized_1", r"在本文中[，,]?\s*文章整理了", "這篇文章整理了", None),
    ("tone.template.in_post_article_summarized_2", r"在本文中[，,]?\s*這篇文章整理了", "這篇文章整理了", None),
    (
        "tone.template.anywhere_this_article_will",
        "在這篇文章中|在本文中|本文中|本文|本篇文章|本篇|這篇文章",
        "以下整理",
        None,
    ),
    ("tone.template.anywhere_this_content_will", r"(?:這份內容|以下整理)\s*(?:將|会|會)\s*", "接下來會", None),
    // First-person expert voice and slogan endings
    ("tone.author.remove_as_a_i_believe", "作為一名[^，。]*，我相信", "如果你想更有系統地開始，", None),
    (
        "tone.chicken_soup.future_you",
        "讓未來的你感謝現在(?:努力的)?(?:自己|決定)！?",
        "先把第一步做完就好。",
        None,
    ),
    (
        "tone.chicken_soup.today_budget",
        "今天，?先從盤點你的收支開始，?為自己的理財之旅奠定堅實的基礎！",
        "你可以先從盤點收支開始，為自己的理財規劃打好基礎。",
        None,
    ),
];

/// The compiled normalization table, in application order
pub fn normalization_rules() -> &'static [NormalizationRule] {
    static RULES: OnceLock<Vec<NormalizationRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        TABLE
            .iter()
            .map(|&(id, pattern, replacement, not_followed_by)| NormalizationRule {
                id,
                pattern: Regex::new(pattern).expect("normalization regex must compile"),
                replacement,
                not_followed_by,
            })
            .collect()
    })
}

/// Apply every normalization rule in table order
///
/// # Examples
///
/// ```
/// use inkwarden_quality::normalize_text;
///
/// assert_eq!(normalize_text("您的計劃"), "你的計畫");
/// assert_eq!(normalize_text("現在就是最好的時機"), "現在就是最好的時機");
/// ```
pub fn normalize_text(text: &str) -> String {
    normalization_rules()
        .iter()
        .fold(text.to_string(), |acc, rule| rule.apply(&acc))
}

/// Matcher counting the hits of one normalization rule
#[derive(Debug, Clone, Copy)]
pub struct NormalizationMatcher {
    rule: &'static NormalizationRule,
}

impl NormalizationMatcher {
    /// Wrap a table rule
    pub fn new(rule: &'static NormalizationRule) -> Self {
        Self { rule }
    }
}

impl Matcher for NormalizationMatcher {
    fn scan(&self, text: &str) -> MatchResult {
        let hits = self.rule.find_all(text);
        MatchResult {
            count: hits.len(),
            samples: hits.into_iter().take(MAX_SAMPLES).map(str::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn rule(id: &str) -> &'static NormalizationRule {
        normalization_rules().iter().find(|r| r.id == id).unwrap()
    }

    #[test]
    fn test_table_ids_are_unique() {
        let ids: HashSet<&str> = normalization_rules().iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), normalization_rules().len());
    }

    #[test]
    fn test_not_followed_by_guard() {
        let now_just = rule("tone.cta.soften_now_just");
        assert_eq!(now_just.find_all("現在就是關鍵，現在就出發"), vec!["現在就"]);
        assert_eq!(now_just.apply("現在就是關鍵，現在就出發"), "現在就是關鍵，先出發");
    }

    #[test]
    fn test_pronoun_rules() {
        assert_eq!(normalize_text("您們好，您的行程"), "你們好，你的行程");
    }

    #[test]
    fn test_cta_is_softened() {
        let out = normalize_text("請立即行動：訂好機票");
        assert!(out.starts_with("你可以先從這一步開始："));
    }

    #[test]
    fn test_matcher_counts_every_hit() {
        let matcher = NormalizationMatcher::new(rule("tone.cta.soften_act_now_generic"));
        let result = matcher.scan("立即行動！再次立即行動");
        assert_eq!(result.count, 2);
    }

    #[test]
    fn test_reportable_tone() {
        assert!(rule("tone.cta.soften_act_now_generic").is_reportable_tone());
        assert!(!rule("tone.word.newbies").is_reportable_tone());
        assert!(!rule("taiwan.word.plan").is_reportable_tone());
    }
}
