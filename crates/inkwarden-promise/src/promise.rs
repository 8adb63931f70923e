//! Heading promises and delivered-ordinal scanning

use crate::error::PromiseError;
use crate::numerals::parse_numeral;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

/// Category of a heading promise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromiseKind {
    /// 陷阱
    Trap,
    /// 迷思
    Myth,
    /// 錯誤 / 誤區
    Mistake,
    /// 疑問 / 問題
    Question,
    /// 步驟 / 步
    Step,
    /// Any other counted noun (重點, 方法, 技巧)
    Generic,
}

impl PromiseKind {
    /// Whether under-delivery of this kind is repaired
    ///
    /// Only the hard kinds are enforced; generic promises get a soft reminder.
    pub fn is_enforced(&self) -> bool {
        !matches!(self, PromiseKind::Generic)
    }

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            PromiseKind::Trap => "trap",
            PromiseKind::Myth => "myth",
            PromiseKind::Mistake => "mistake",
            PromiseKind::Question => "question",
            PromiseKind::Step => "step",
            PromiseKind::Generic => "generic",
        }
    }
}

impl fmt::Display for PromiseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A numeric delivery commitment parsed from a heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promise {
    /// Category
    pub kind: PromiseKind,

    /// Display noun used in sub-headings (e.g. `陷阱`)
    pub label: String,

    /// Promised item count, always >= 2
    pub count: u32,
}

impl Promise {
    /// Build a promise, rejecting counts below two and empty labels
    pub fn new(kind: PromiseKind, label: impl Into<String>, count: u32) -> Result<Self, PromiseError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(PromiseError::EmptyLabel);
        }
        if count < 2 {
            return Err(PromiseError::CountTooSmall(count));
        }
        Ok(Self { kind, label, count })
    }

    /// Ordinals 1..=count absent from `delivered`, ascending
    pub fn missing(&self, delivered: &BTreeSet<u32>) -> Vec<u32> {
        (1..=self.count).filter(|n| !delivered.contains(n)).collect()
    }
}

fn ordinal_step_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^第\s*([0-9]+|[一二兩三四五六七八九十]{1,3})\s*步").expect("ordinal step regex must compile")
    })
}

fn promise_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"([0-9]+|[一二兩三四五六七八九十]{1,3})\s*(?:大|個)?\s*(陷阱|迷思|錯誤|誤區|疑問|問題|重點|方法|技巧|步驟|步)",
        )
        .expect("promise regex must compile")
    })
}

/// Extract the delivery commitment from a heading
///
/// Ordinal headings (`第一步`) denote position, not cardinality, and yield
/// `None`, as do counts below two and headings without a counted noun. A
/// count written as an ordinal (`第3個問題`) anywhere in the heading is not
/// a promise.
///
/// # Examples
///
/// ```
/// use inkwarden_promise::{extract_promise, PromiseKind};
///
/// let promise = extract_promise("3大陷阱").unwrap();
/// assert_eq!(promise.kind, PromiseKind::Trap);
/// assert_eq!(promise.label, "陷阱");
/// assert_eq!(promise.count, 3);
///
/// assert!(extract_promise("第一步：開始").is_none());
/// ```
pub fn extract_promise(heading: &str) -> Option<Promise> {
    let text = heading.trim();
    if text.is_empty() || ordinal_step_re().is_match(text) {
        return None;
    }

    let caps = promise_re().captures_iter(text).find(|caps| {
        caps.get(1)
            .is_some_and(|count| !text[..count.start()].trim_end().ends_with('第'))
    })?;
    let count = parse_numeral(caps.get(1)?.as_str())?;
    let noun = caps.get(2)?.as_str();

    let (kind, label) = match noun {
        "陷阱" => (PromiseKind::Trap, noun),
        "迷思" => (PromiseKind::Myth, noun),
        "錯誤" | "誤區" => (PromiseKind::Mistake, noun),
        "疑問" | "問題" => (PromiseKind::Question, noun),
        "步驟" | "步" => (PromiseKind::Step, "步驟"),
        other => (PromiseKind::Generic, other),
    };

    Promise::new(kind, label, count).ok()
}

/// Set of ordinals delivered as `<h3>{label}{ordinal}` sub-headings
///
/// Ordinals may be Arabic or CJK; duplicates and out-of-order delivery
/// collapse into the set.
///
/// # Examples
///
/// ```
/// use inkwarden_promise::count_delivered;
///
/// let html = "<h3>陷阱一：貪便宜</h3><p>..</p><h3>陷阱3：不看評價</h3>";
/// let delivered = count_delivered(html, "陷阱");
/// assert_eq!(delivered.into_iter().collect::<Vec<_>>(), vec![1, 3]);
/// ```
pub fn count_delivered(content: &str, label: &str) -> BTreeSet<u32> {
    let label = label.trim();
    if content.is_empty() || label.is_empty() {
        return BTreeSet::new();
    }

    let pattern = format!(
        r"(?i)<h3[^>]*>\s*{}\s*([0-9]+|[一二三四五六七八九十]+)\s*(?:[：:]|\s|<)",
        regex::escape(label)
    );
    let Ok(re) = Regex::new(&pattern) else {
        return BTreeSet::new();
    };

    re.captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| parse_numeral(m.as_str()))
        .collect()
}

/// Number of distinct labeled sub-headings
pub fn count_labeled_subheadings(content: &str, label: &str) -> usize {
    count_delivered(content, label).len()
}

/// Hard-rule reminder appended to a section prompt
///
/// Empty when there is no promise. Enforced kinds get an exact-count rule
/// with the expected sub-heading format; generic promises get a soft reminder.
pub fn build_promise_guard(promise: Option<&Promise>) -> String {
    let Some(promise) = promise else {
        return String::new();
    };
    let n = promise.count;
    let label = &promise.label;

    match promise.kind {
        PromiseKind::Trap => format!(
            "\n## 承諾交付（硬規則）\n- 你的段落標題包含「{n} 大陷阱」。你必須交付 **剛好 {n} 個**陷阱，並用 <h3> 子標題標示：\n  - <h3>陷阱一：…</h3>\n  - <h3>陷阱二：…</h3>\n  - …直到 <h3>陷阱{n}：…</h3>\n- 禁止只寫 2 個就收尾，也不要把陷阱塞進段落裡不做子標題。\n"
        ),
        PromiseKind::Myth => format!(
            "\n## 承諾交付（硬規則）\n- 你的段落標題包含「{n} 大迷思」。你必須交付 **剛好 {n} 個**迷思，並用 <h3> 子標題標示：\n  - <h3>迷思一：…</h3> 直到 <h3>迷思{n}：…</h3>\n"
        ),
        PromiseKind::Mistake => format!(
            "\n## 承諾交付（硬規則）\n- 你的段落標題包含「{n} {label}」。你必須交付 **剛好 {n} 個**{label}，並用 <h3> 子標題標示：\n  - <h3>{label}一：…</h3> 直到 <h3>{label}{n}：…</h3>\n"
        ),
        PromiseKind::Question => format!(
            "\n## 承諾交付（硬規則）\n- 你的段落標題包含「{n} 大{label}」。你必須交付 **剛好 {n} 個**{label}，並用 <h3> 子標題標示：\n  - <h3>{label}一：…</h3>\n  - <h3>{label}二：…</h3>\n  - …直到 <h3>{label}{n}：…</h3>\n- 禁止只寫 2 個就收尾，也不要把第 {n} 個藏在段落裡不做子標題。\n"
        ),
        PromiseKind::Step => format!(
            "\n## 承諾交付（硬規則）\n- 你的段落標題包含「{n} 步驟」。你必須交付 **剛好 {n} 個**步驟，並用 <h3> 子標題標示：\n  - <h3>步驟1：…</h3> 直到 <h3>步驟{n}：…</h3>\n"
        ),
        PromiseKind::Generic => format!(
            "\n## 承諾交付（提醒）\n- 你的段落標題包含「{n} {label}」。請確保內容真的交付 {n} 個要點，避免「說 {n} 個但只寫 2 個」。\n"
        ),
    }
}
