//! Travel itinerary day/place consistency
//!
//! An itinerary overview (`Day 1：淺草、上野` or `第二天：原宿`) fixes which
//! places belong to which day. Narrative sentences that mention a day marker
//! must not bind that day to a place the overview puts elsewhere.

use crate::matchers::{MatchResult, Matcher, MAX_SAMPLES};
use inkwarden_promise::parse_numeral;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

/// Default cap on reported issues
pub const DEFAULT_MAX_ISSUES: usize = 20;

fn re(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("itinerary regex must compile"))
}

fn br_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r"(?i)<\s*br\s*/?>|<\s*/\s*p\s*>|<\s*/\s*li\s*>")
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r"<[^>]*>")
}

fn hspace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r"[\t\x0B\x0C ]+")
}

fn newline_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r"\s*\n\s*")
}

fn day_line_en_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r"(?i)Day\s*([1-9][0-9]*)\s*[：:]\s*([^\n]+)")
}

fn day_line_zh_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r"第\s*([一二三四五六七八九十0-9]{1,3})\s*天\s*[：:]\s*([^\n]+)")
}

fn day_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r"(?i)第\s*([一二三四五六七八九十0-9]{1,3})\s*天|Day\s*([1-9][0-9]*)")
}

fn place_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(
        &RE,
        r"東京迪士尼|迪士尼|淺草寺|淺草|上野公園|上野|秋葉原|新宿|原宿|表參道|東京塔|晴空塔|吉祥寺",
    )
}

fn skip_hint_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r"備案|可選|選配|如果|視情況|也可以|或改去|替換|改成|改為")
}

fn sentence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    re(&RE, r"[。！？\n]+")
}

/// Collapse markup into line-oriented text
fn normalize(text: &str) -> String {
    let text = br_re().replace_all(text, "\n");
    let text = tag_re().replace_all(&text, " ");
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = hspace_re().replace_all(&text, " ");
    newline_re().replace_all(&text, "\n").trim().to_string()
}

/// Canonical place key (東京迪士尼 → 迪士尼, 淺草寺 → 淺草, 上野公園 → 上野)
fn place_key(place: &str) -> &str {
    match place {
        "東京迪士尼" => "迪士尼",
        "淺草寺" => "淺草",
        "上野公園" => "上野",
        other => other,
    }
}

fn marker_day(caps: &regex::Captures<'_>) -> Option<u32> {
    if let Some(arabic) = caps.get(2) {
        return arabic.as_str().parse().ok();
    }
    caps.get(1).and_then(|m| parse_numeral(m.as_str()))
}

struct DayPlan {
    days: BTreeMap<u32, String>,
    max_day: u32,
}

impl DayPlan {
    fn parse(text: &str) -> Option<Self> {
        let mut days = BTreeMap::new();

        for caps in day_line_en_re().captures_iter(text) {
            let day = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
            let desc = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
            if let Some(day) = day {
                if !desc.is_empty() {
                    days.entry(day).or_insert_with(|| desc.to_string());
                }
            }
        }
        for caps in day_line_zh_re().captures_iter(text) {
            let day = caps.get(1).and_then(|m| parse_numeral(m.as_str()));
            let desc = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
            if let Some(day) = day {
                if !desc.is_empty() {
                    days.entry(day).or_insert_with(|| desc.to_string());
                }
            }
        }

        let max_day = *days.keys().next_back()?;
        Some(Self { days, max_day })
    }

    fn in_range(&self, day: u32) -> bool {
        day >= 1 && day <= self.max_day
    }

    fn allows(&self, day: u32, place: &str) -> bool {
        let key = place_key(place);
        self.days.get(&day).is_some_and(|desc| desc.contains(key))
    }
}

#[derive(Default)]
struct Issues {
    list: Vec<String>,
    seen: HashSet<String>,
}

impl Issues {
    fn push(&mut self, sentence: &str) {
        let s = sentence.trim();
        if !s.is_empty() && self.seen.insert(s.to_string()) {
            self.list.push(s.to_string());
        }
    }
}

/// Flags narrative day/place bindings that contradict the itinerary overview
///
/// Sentences with optional or backup language (備案, 如果, 也可以, ...) are
/// skipped. In a 「分別」 sentence with exactly two days and two places the
/// pairs are matched in order; otherwise each day marker owns the places up
/// to the next marker.
#[derive(Debug, Clone)]
pub struct ItineraryConsistency {
    max_issues: usize,
}

impl ItineraryConsistency {
    /// Create with a custom issue cap
    pub fn new(max_issues: usize) -> Self {
        Self {
            max_issues: max_issues.max(1),
        }
    }

    fn check_sentence(&self, plan: &DayPlan, sentence: &str, issues: &mut Issues) {
        if sentence.contains("分別") {
            let days: Vec<u32> = day_marker_re()
                .captures_iter(sentence)
                .filter_map(|caps| marker_day(&caps))
                .filter(|d| *d > 0)
                .collect();
            let places: Vec<&str> = place_re().find_iter(sentence).map(|m| m.as_str()).collect();

            if let ([d1, d2], [p1, p2]) = (days.as_slice(), places.as_slice()) {
                for (day, place) in [(*d1, *p1), (*d2, *p2)] {
                    if plan.in_range(day) && !plan.allows(day, place) {
                        issues.push(sentence);
                    }
                }
                return;
            }
        }

        let markers: Vec<(u32, usize, usize)> = day_marker_re()
            .captures_iter(sentence)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let day = marker_day(&caps).filter(|d| *d > 0)?;
                Some((day, whole.start(), whole.end()))
            })
            .collect();

        for (i, &(day, _, clause_start)) in markers.iter().enumerate() {
            if issues.list.len() >= self.max_issues {
                break;
            }
            let clause_end = markers.get(i + 1).map(|&(_, next, _)| next).unwrap_or(sentence.len());
            let clause = &sentence[clause_start..clause_end];

            let conflicting = place_re()
                .find_iter(clause)
                .any(|place| !plan.in_range(day) || !plan.allows(day, place.as_str()));
            if conflicting {
                issues.push(sentence);
            }
        }
    }
}

impl Default for ItineraryConsistency {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ISSUES)
    }
}

impl Matcher for ItineraryConsistency {
    fn scan(&self, text: &str) -> MatchResult {
        let normalized = normalize(text);
        let Some(plan) = DayPlan::parse(&normalized) else {
            return MatchResult::none();
        };

        let mut issues = Issues::default();
        for sentence in sentence_re().split(&normalized).map(str::trim).filter(|s| !s.is_empty()) {
            if issues.list.len() >= self.max_issues {
                break;
            }
            if !day_marker_re().is_match(sentence) || skip_hint_re().is_match(sentence) {
                continue;
            }
            self.check_sentence(&plan, sentence, &mut issues);
        }

        MatchResult {
            count: issues.list.len(),
            samples: issues.list.into_iter().take(MAX_SAMPLES).collect(),
        }
    }
}
