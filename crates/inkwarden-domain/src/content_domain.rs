//! Topical content domains
//!
//! The domain of a document selects which quality rules apply, how source
//! credibility is weighted and how many verified sources a run needs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Topical domain of a generated document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentDomain {
    /// Personal finance and investing
    Finance,
    /// Health and medicine
    Health,
    /// Travel planning
    Travel,
    /// Technology
    Tech,
    /// Legal topics
    Law,
    /// Learning and careers
    Education,
    /// Lifestyle and leisure
    Lifestyle,
    /// Anything else
    #[default]
    General,
}

const FINANCE_TOKENS: &[&str] = &[
    "理財", "投資", "股票", "etf", "基金", "債券", "資產配置", "退休", "保險", "貸款", "信用卡",
];
const HEALTH_TOKENS: &[&str] = &[
    "失眠", "睡眠", "健康", "飲食", "疼痛", "上背痛", "運動", "疾病", "症狀", "醫療", "營養", "治療",
];
const TRAVEL_TOKENS: &[&str] = &[
    "旅遊", "旅行", "自由行", "行程", "行程規劃", "行程安排", "景點", "住宿", "交通", "機票", "飯店",
    "5天4夜", "4天3夜", "3天2夜", "東京", "大阪", "京都", "沖繩", "札幌", "福岡", "名古屋", "jr",
    "metro", "地鐵", "新幹線", "一日券",
];
const LAW_TOKENS: &[&str] = &["法律", "法規", "訴訟", "合約", "契約", "律師", "勞基法", "繼承"];
const TECH_TOKENS: &[&str] = &["ai", "人工智慧", "科技", "軟體", "程式", "網路", "雲端", "數據", "演算法"];
const EDUCATION_TOKENS: &[&str] = &["學習", "教育", "課程", "培訓", "技能", "證照", "轉職", "職涯"];
const LIFESTYLE_TOKENS: &[&str] = &["親子", "生活", "休閒", "美食", "購物", "居家", "寵物"];

impl ContentDomain {
    /// All domains, in detection priority order
    pub const ALL: [ContentDomain; 8] = [
        ContentDomain::Finance,
        ContentDomain::Health,
        ContentDomain::Travel,
        ContentDomain::Law,
        ContentDomain::Tech,
        ContentDomain::Education,
        ContentDomain::Lifestyle,
        ContentDomain::General,
    ];

    /// Detect the domain of a keyword and title pair
    ///
    /// The first domain (in [`ContentDomain::ALL`] order) whose token list
    /// hits the combined lowercase text wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use inkwarden_domain::ContentDomain;
    ///
    /// assert_eq!(ContentDomain::detect("東京自由行", "5天4夜行程"), ContentDomain::Travel);
    /// assert_eq!(ContentDomain::detect("ETF 入門", ""), ContentDomain::Finance);
    /// assert_eq!(ContentDomain::detect("咖啡沖煮", ""), ContentDomain::General);
    /// ```
    pub fn detect(keyword: &str, title: &str) -> Self {
        let text = format!("{} {}", keyword, title).to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|domain| domain.tokens().iter().any(|token| text.contains(token)))
            .unwrap_or(ContentDomain::General)
    }

    fn tokens(&self) -> &'static [&'static str] {
        match self {
            ContentDomain::Finance => FINANCE_TOKENS,
            ContentDomain::Health => HEALTH_TOKENS,
            ContentDomain::Travel => TRAVEL_TOKENS,
            ContentDomain::Tech => TECH_TOKENS,
            ContentDomain::Law => LAW_TOKENS,
            ContentDomain::Education => EDUCATION_TOKENS,
            ContentDomain::Lifestyle => LIFESTYLE_TOKENS,
            ContentDomain::General => &[],
        }
    }

    /// Minimum verified sources a run in this domain must have
    pub fn min_sources(&self) -> usize {
        match self {
            ContentDomain::Health | ContentDomain::Finance => 2,
            ContentDomain::Travel => 1,
            _ => 0,
        }
    }

    /// Sources actually required once the content brief is taken into account
    ///
    /// A brief that disables sources requires none; otherwise the larger of
    /// the domain minimum and the brief minimum applies.
    pub fn required_sources(&self, brief_min: Option<usize>, require_sources: bool) -> usize {
        if !require_sources {
            return 0;
        }
        self.min_sources().max(brief_min.unwrap_or(0))
    }

    /// Wire name of this domain
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentDomain::Finance => "finance",
            ContentDomain::Health => "health",
            ContentDomain::Travel => "travel",
            ContentDomain::Tech => "tech",
            ContentDomain::Law => "law",
            ContentDomain::Education => "education",
            ContentDomain::Lifestyle => "lifestyle",
            ContentDomain::General => "general",
        }
    }
}

impl fmt::Display for ContentDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentDomain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|domain| domain.as_str() == lower)
            .ok_or_else(|| format!("Unknown content domain: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_priority_finance_before_travel() {
        // "退休" (finance) and "旅遊" (travel) both hit; finance wins
        assert_eq!(ContentDomain::detect("退休旅遊基金", ""), ContentDomain::Finance);
    }

    #[test]
    fn test_detect_is_case_insensitive() {
        assert_eq!(ContentDomain::detect("JR Pass 攻略", ""), ContentDomain::Travel);
    }

    #[test]
    fn test_min_sources() {
        assert_eq!(ContentDomain::Health.min_sources(), 2);
        assert_eq!(ContentDomain::Finance.min_sources(), 2);
        assert_eq!(ContentDomain::Travel.min_sources(), 1);
        assert_eq!(ContentDomain::General.min_sources(), 0);
    }

    #[test]
    fn test_required_sources() {
        assert_eq!(ContentDomain::Health.required_sources(Some(1), true), 2);
        assert_eq!(ContentDomain::General.required_sources(Some(3), true), 3);
        assert_eq!(ContentDomain::Health.required_sources(Some(5), false), 0);
        assert_eq!(ContentDomain::Travel.required_sources(None, true), 1);
    }

    #[test]
    fn test_parse_roundtrip() {
        for domain in ContentDomain::ALL {
            assert_eq!(domain.as_str().parse::<ContentDomain>().unwrap(), domain);
        }
        assert!("cooking".parse::<ContentDomain>().is_err());
    }
}
