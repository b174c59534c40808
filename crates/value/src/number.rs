//! Numeric text handling
//!
//! Two concerns live here: recognizing "numeric-looking" text (which the
//! comparer treats as a number) and culture-aware conversion between text
//! and decimals through [`NumberFormat`].

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

static DECIMAL_TEXT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?([0-9]+\.)?[0-9]+$").expect("decimal text pattern is valid")
});

/// Separators used when converting between text and numbers
///
/// The default is the invariant format: `.` for decimals, `,` for groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    /// Character between the integral and fractional part
    pub decimal_separator: char,
    /// Optional thousands separator, ignored when parsing
    pub group_separator: Option<char>,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::invariant()
    }
}

impl NumberFormat {
    /// Invariant format (`1,234.5`)
    pub const fn invariant() -> Self {
        Self {
            decimal_separator: '.',
            group_separator: Some(','),
        }
    }

    /// Create a format from explicit separators
    pub const fn new(decimal_separator: char, group_separator: Option<char>) -> Self {
        Self {
            decimal_separator,
            group_separator,
        }
    }

    /// Parse a number written in this format
    ///
    /// Surrounding whitespace is trimmed, group separators are dropped and a
    /// single leading sign is accepted. Returns `None` for anything that is
    /// not a plain decimal or does not fit in the decimal range.
    pub fn parse(&self, text: &str) -> Option<Decimal> {
        let text = text.trim();
        let (negative, body) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };

        let mut normalized = String::with_capacity(body.len() + 1);
        let mut seen_digit = false;
        let mut seen_separator = false;
        for c in body.chars() {
            if c.is_ascii_digit() {
                seen_digit = true;
                normalized.push(c);
            } else if c == self.decimal_separator && !seen_separator {
                seen_separator = true;
                normalized.push('.');
            } else if Some(c) == self.group_separator && !seen_separator {
                continue;
            } else {
                return None;
            }
        }
        if !seen_digit {
            return None;
        }

        let value = Decimal::from_str(&normalized).ok()?;
        Some(if negative { -value } else { value })
    }

    /// Render a number in this format (no grouping)
    pub fn format(&self, value: &Decimal) -> String {
        let text = value.to_string();
        if self.decimal_separator == '.' {
            text
        } else {
            text.replace('.', &self.decimal_separator.to_string())
        }
    }
}

/// Whether `text` looks like an invariant decimal literal
///
/// Matches an optional sign, an optional integral part followed by a dot,
/// then digits: `12`, `-3`, `+0.5`, `10.25`. Whitespace and group
/// separators do not match.
pub fn is_decimal_text(text: &str) -> bool {
    DECIMAL_TEXT_REGEX.is_match(text)
}

/// Parse text already known to match [`is_decimal_text`]
///
/// `None` means the digits do not fit in the decimal range.
pub fn parse_decimal_text(text: &str) -> Option<Decimal> {
    let digits = text.strip_prefix('+').unwrap_or(text);
    Decimal::from_str(digits).ok()
}

/// Convert an integral, non-negative decimal into an index
pub fn decimal_to_index(value: &Decimal) -> Option<usize> {
    if !value.fract().is_zero() || (value.is_sign_negative() && !value.is_zero()) {
        return None;
    }
    value.to_usize()
}

/// Convert an integral decimal into an `i64`
pub fn decimal_to_i64(value: &Decimal) -> Option<i64> {
    if value.fract().is_zero() {
        value.to_i64()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[rstest]
    #[case("12", true)]
    #[case("-3", true)]
    #[case("+0.5", true)]
    #[case("10.25", true)]
    #[case(".5", false)]
    #[case("1.", false)]
    #[case("1e5", false)]
    #[case(" 1", false)]
    #[case("1,000", false)]
    #[case("1x5", false)]
    #[case("", false)]
    fn test_is_decimal_text(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(is_decimal_text(text), expected);
    }

    #[test]
    fn test_parse_decimal_text_range() {
        assert_eq!(parse_decimal_text("+1.5"), Some(dec("1.5")));
        assert_eq!(parse_decimal_text(&"9".repeat(40)), None);
    }

    #[test]
    fn test_invariant_parse() {
        let fmt = NumberFormat::invariant();
        assert_eq!(fmt.parse(" 1,234.5 "), Some(dec("1234.5")));
        assert_eq!(fmt.parse("-0.25"), Some(dec("-0.25")));
        assert_eq!(fmt.parse("1.2.3"), None);
        assert_eq!(fmt.parse("-"), None);
        assert_eq!(fmt.parse("abc"), None);
    }

    #[test]
    fn test_culture_parse_and_format() {
        let fmt = NumberFormat::new(',', Some('.'));
        assert_eq!(fmt.parse("1.234,5"), Some(dec("1234.5")));
        assert_eq!(fmt.format(&dec("2.75")), "2,75");
    }

    #[test]
    fn test_deserialize_partial() {
        let fmt: NumberFormat = serde_json::from_str(r#"{"decimal_separator": ","}"#).unwrap();
        assert_eq!(fmt.decimal_separator, ',');
        assert_eq!(fmt.group_separator, Some(','));
    }

    #[test]
    fn test_index_conversion() {
        assert_eq!(decimal_to_index(&dec("2")), Some(2));
        assert_eq!(decimal_to_index(&dec("2.0")), Some(2));
        assert_eq!(decimal_to_index(&dec("2.5")), None);
        assert_eq!(decimal_to_index(&dec("-1")), None);
        assert_eq!(decimal_to_i64(&dec("-7")), Some(-7));
    }
}
