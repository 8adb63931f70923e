//! Arabic and small CJK numeral parsing
//!
//! Supports Arabic digit runs and CJK numerals 0-99: single digits
//! (零 一 二 兩 三 ... 九), 十, 十X, X十 and X十Y.

/// Value of a single CJK digit character
pub fn digit_value(c: char) -> Option<u32> {
    match c {
        '零' => Some(0),
        '一' => Some(1),
        '二' | '兩' => Some(2),
        '三' => Some(3),
        '四' => Some(4),
        '五' => Some(5),
        '六' => Some(6),
        '七' => Some(7),
        '八' => Some(8),
        '九' => Some(9),
        _ => None,
    }
}

/// Parse a numeral token into an integer
///
/// Returns `None` for empty input, mixed scripts, or CJK forms outside 0-99.
///
/// # Examples
///
/// ```
/// use inkwarden_promise::parse_numeral;
///
/// assert_eq!(parse_numeral("12"), Some(12));
/// assert_eq!(parse_numeral("五"), Some(5));
/// assert_eq!(parse_numeral("十三"), Some(13));
/// assert_eq!(parse_numeral("二十"), Some(20));
/// assert_eq!(parse_numeral("九十九"), Some(99));
/// assert_eq!(parse_numeral("百"), None);
/// ```
pub fn parse_numeral(token: &str) -> Option<u32> {
    let raw = token.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.chars().all(|c| c.is_ascii_digit()) {
        return raw.parse().ok();
    }

    let chars: Vec<char> = raw.chars().collect();
    match chars.as_slice() {
        ['十'] => Some(10),
        [single] => digit_value(*single),
        ['十', ones] => digit_value(*ones).map(|o| 10 + o),
        [tens, '十'] => tens_value(*tens),
        [tens, '十', ones] => {
            let tens = tens_value(*tens)?;
            digit_value(*ones).map(|o| tens + o)
        }
        _ => None,
    }
}

fn tens_value(c: char) -> Option<u32> {
    match digit_value(c)? {
        0 => None,
        d => Some(d * 10),
    }
}

/// Render 0-10 as a CJK numeral; larger values fall back to Arabic digits
///
/// # Examples
///
/// ```
/// use inkwarden_promise::{parse_numeral, to_numeral};
///
/// assert_eq!(to_numeral(3), "三");
/// assert_eq!(to_numeral(10), "十");
/// assert_eq!(to_numeral(42), "42");
/// assert_eq!(parse_numeral(&to_numeral(7)), Some(7));
/// ```
pub fn to_numeral(n: u32) -> String {
    const DIGITS: [&str; 11] = ["零", "一", "二", "三", "四", "五", "六", "七", "八", "九", "十"];
    match DIGITS.get(n as usize) {
        Some(s) => (*s).to_string(),
        None => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arabic() {
        assert_eq!(parse_numeral("0"), Some(0));
        assert_eq!(parse_numeral(" 7 "), Some(7));
        assert_eq!(parse_numeral("123"), Some(123));
    }

    #[test]
    fn test_parse_cjk_forms() {
        assert_eq!(parse_numeral("零"), Some(0));
        assert_eq!(parse_numeral("兩"), Some(2));
        assert_eq!(parse_numeral("十"), Some(10));
        assert_eq!(parse_numeral("十一"), Some(11));
        assert_eq!(parse_numeral("三十"), Some(30));
        assert_eq!(parse_numeral("兩十五"), Some(25));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_numeral(""), None);
        assert_eq!(parse_numeral("abc"), None);
        assert_eq!(parse_numeral("3五"), None);
        assert_eq!(parse_numeral("十十"), None);
        assert_eq!(parse_numeral("零十"), None);
        assert_eq!(parse_numeral("一二三四"), None);
    }

    #[test]
    fn test_to_numeral_fallback() {
        assert_eq!(to_numeral(0), "零");
        assert_eq!(to_numeral(11), "11");
    }
}
