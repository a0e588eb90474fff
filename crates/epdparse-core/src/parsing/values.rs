//! Numeric tokens in EPD result rows.
//!
//! PDF linearization glues numbers to units and to each other. The predicates
//! here decide whether a digit run is a value or part of a unit such as
//! `CO2`, `m3`, `1,4-DB` or `CFC-11`.

use crate::error::EpdError;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

/// A value token: optional sign, digits, optional `.`/`,` fraction, optional
/// exponent. `MND` (module not declared) is a value placeholder.
static VALUE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bMND\b|[+-]?\d+(?:[.,]\d+)?(?:E[+-]?\d+)?").expect("valid value token regex")
});

/// Single-digit exponent directly followed by the next column's number.
static GLUED_EXPONENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([Ee][+-]?\d)(\d+[.,])").expect("valid glued exponent regex")
});

/// Two-decimal amount directly followed by another digit.
static GLUED_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d[.,]\d{2})(\d)").expect("valid glued amount regex"));

/// `1,4` in `kg 1,4 DB eq` is a substance name, not a value.
static DICHLOROBENZENE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[\s-]*DB\b").expect("valid 1,4-DB regex"));

/// Parse a numeric token into a Decimal.
///
/// Handles decimal commas ("0,030"), explicit plus signs and scientific
/// notation ("1,23E-4", "5E+0").
pub fn parse_number(s: &str) -> Result<Decimal, EpdError> {
    let trimmed = s.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let normalized = unsigned.replace(',', ".");

    let parsed = if normalized.contains(|c| c == 'e' || c == 'E') {
        Decimal::from_scientific(&normalized)
    } else {
        Decimal::from_str(&normalized)
    };

    parsed
        .map(|d| d.normalize())
        .map_err(|_| EpdError::InvalidNumber(trimmed.to_string()))
}

/// True for the "module not declared" marker.
pub fn is_mnd(token: &str) -> bool {
    token.trim().eq_ignore_ascii_case("mnd")
}

/// The token is immediately followed by a letter: `2` in `2a`, `3` in `3kg`.
pub fn followed_by_letter(text: &str, end: usize) -> bool {
    text[end..].chars().next().is_some_and(char::is_alphabetic)
}

/// The token is followed by `-` and a letter: `4` in `1,4-DB`.
pub fn followed_by_hyphen_letter(text: &str, end: usize) -> bool {
    let mut rest = text[end..].chars();
    rest.next() == Some('-') && rest.next().is_some_and(char::is_alphabetic)
}

/// A lone digit directly followed by a minus sign is a hyphenated unit
/// suffix, not a value followed by a negative number.
pub fn lone_digit_before_minus(token: &str, text: &str, end: usize) -> bool {
    token.len() == 1
        && token.as_bytes()[0].is_ascii_digit()
        && text[end..].starts_with('-')
}

/// The token continues a word on its left: `2` in `CO2`, `11` in `CFC-11`.
pub fn attached_to_word(token: &str, text: &str, start: usize) -> bool {
    let mut before = text[..start].chars().rev();
    let prev = before.next();
    let signed = token.starts_with(['+', '-']);

    match prev {
        None => false,
        Some(c) if c.is_alphabetic() => true,
        // A sign glued to the previous value starts a new negative number.
        Some(c) if c.is_ascii_digit() || c == '.' || c == ',' => !signed,
        Some('-') if !signed => before.next().is_some_and(char::is_alphabetic),
        _ => false,
    }
}

/// The `1,4` of `1,4-DB` / `1,4 DB` (dichlorobenzene equivalents).
pub fn is_dichlorobenzene_ref(token: &str, text: &str, end: usize) -> bool {
    matches!(token, "1,4" | "1.4") && DICHLOROBENZENE.is_match(&text[end..])
}

/// Whether a value-grammar match at `start..end` is a real value.
pub fn accept_value_token(text: &str, start: usize, end: usize) -> bool {
    let token = &text[start..end];
    if is_mnd(token) {
        return true;
    }
    !(followed_by_letter(text, end)
        || followed_by_hyphen_letter(text, end)
        || lone_digit_before_minus(token, text, end)
        || attached_to_word(token, text, start)
        || is_dichlorobenzene_ref(token, text, end))
}

/// Accepted value tokens in order, as (start, end) byte ranges.
fn accepted_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut cursor = 0;
    while cursor < text.len() {
        let Some(m) = VALUE_TOKEN.find_at(text, cursor) else {
            break;
        };
        if accept_value_token(text, m.start(), m.end()) {
            spans.push((m.start(), m.end()));
            cursor = m.end();
        } else {
            // Retry one character later; digits left of the retry point count
            // as attached, so `11` in `CFC11` cannot resurface as `1`.
            cursor = next_char_boundary(text, m.start());
        }
    }
    spans
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map(|c| pos + c.len_utf8())
        .unwrap_or(text.len())
}

/// Byte offset of the first accepted value token (number or MND).
pub fn first_value_position(text: &str) -> Option<usize> {
    accepted_spans(text).first().map(|(start, _)| *start)
}

/// All accepted value tokens, left to right.
pub fn value_tokens(text: &str) -> Vec<String> {
    accepted_spans(text)
        .into_iter()
        .map(|(start, end)| text[start..end].to_string())
        .collect()
}

/// Separate `1,00E+02,00E+0` into `1,00E+0 2,00E+0`.
pub fn split_glued_exponents(tail: &str) -> String {
    GLUED_EXPONENT.replace_all(tail, "$1 $2").into_owned()
}

/// Separate glued two-decimal amounts: `12,3445,67` -> `12,34 45,67`.
pub fn split_glued_amounts(tail: &str) -> String {
    let mut current = tail.to_string();
    // Each pass splits at least one glue point; a tail has fewer glue points than bytes.
    for _ in 0..=tail.len() {
        let next = GLUED_AMOUNT.replace_all(&current, "$1 $2").into_owned();
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// True if the tail contains scientific notation.
pub fn has_exponent(tail: &str) -> bool {
    tail.bytes()
        .zip(tail.bytes().skip(1))
        .any(|(a, b)| (a == b'E' || a == b'e') && (b.is_ascii_digit() || b == b'+' || b == b'-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_plain_and_comma() {
        assert_eq!(parse_number("68").unwrap(), dec!(68));
        assert_eq!(parse_number("0,030").unwrap(), dec!(0.03));
        assert_eq!(parse_number("-1.5").unwrap(), dec!(-1.5));
        assert_eq!(parse_number("+2").unwrap(), dec!(2));
    }

    #[test]
    fn test_parse_scientific() {
        assert_eq!(parse_number("1,00E+0").unwrap(), dec!(1));
        assert_eq!(parse_number("2,5E-3").unwrap(), dec!(0.0025));
        assert_eq!(parse_number("-3,1E+2").unwrap(), dec!(-310));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_number("abc").is_err());
        assert!(parse_number("").is_err());
    }

    #[test]
    fn test_mnd_marker() {
        assert!(is_mnd("MND"));
        assert!(is_mnd("mnd"));
        assert!(!is_mnd("ND"));
    }

    #[test]
    fn test_followed_by_letter() {
        let text = "3kg";
        assert!(followed_by_letter(text, 1));
        assert!(!followed_by_letter("3 kg", 1));
    }

    #[test]
    fn test_followed_by_hyphen_letter() {
        assert!(followed_by_hyphen_letter("1,4-DB", 3));
        assert!(!followed_by_hyphen_letter("1,0E+0-2,0E+0", 7));
    }

    #[test]
    fn test_lone_digit_before_minus() {
        assert!(lone_digit_before_minus("4", "4-x", 1));
        assert!(!lone_digit_before_minus("42", "42-x", 2));
    }

    #[test]
    fn test_attached_to_word() {
        assert!(attached_to_word("2", "CO2", 2));
        assert!(attached_to_word("11", "CFC-11", 4));
        assert!(!attached_to_word("-2,0", "1,0-2,0", 3));
        assert!(!attached_to_word("5", "eq 5", 3));
    }

    #[test]
    fn test_unit_digits_rejected() {
        assert_eq!(value_tokens("kg CO2 eq 1,5E+0"), vec!["1,5E+0"]);
        assert_eq!(value_tokens("kg CFC11 eq 3,2E-8"), vec!["3,2E-8"]);
        assert_eq!(value_tokens("kg CFC-11 eq 3,2E-8"), vec!["3,2E-8"]);
        assert_eq!(value_tokens("kg 1,4-DB eq 7,0E-1"), vec!["7,0E-1"]);
        assert_eq!(value_tokens("kg 1,4 DB eq 7,0E-1"), vec!["7,0E-1"]);
        assert_eq!(value_tokens("m3 world eq 2"), vec!["2"]);
        assert_eq!(value_tokens("kBq U-235 eq 4,1E+0"), vec!["4,1E+0"]);
    }

    #[test]
    fn test_glued_negative_values() {
        assert_eq!(
            value_tokens("1,0E+0-2,0E+0 3,0E+0"),
            vec!["1,0E+0", "-2,0E+0", "3,0E+0"]
        );
    }

    #[test]
    fn test_mnd_tokens_kept() {
        assert_eq!(value_tokens("1,0 MND 2,0"), vec!["1,0", "MND", "2,0"]);
    }

    #[test]
    fn test_first_value_position() {
        let text = "kg CO2 eq 1,0E+0 2,0E+0";
        assert_eq!(first_value_position(text), Some(10));
        assert_eq!(first_value_position("kg CO2 eq"), None);
    }

    #[test]
    fn test_split_glued_exponents() {
        assert_eq!(
            split_glued_exponents("1,00E+02,00E-13,00E+0"),
            "1,00E+0 2,00E-1 3,00E+0"
        );
        // Two-digit exponents at the end of a tail are left intact.
        assert_eq!(split_glued_exponents("1,23E-08"), "1,23E-08");
    }

    #[test]
    fn test_split_glued_amounts() {
        assert_eq!(split_glued_amounts("12,3445,676,01"), "12,34 45,67 6,01");
        assert_eq!(split_glued_amounts("1,23 4,56"), "1,23 4,56");
    }

    #[test]
    fn test_has_exponent() {
        assert!(has_exponent("1,0E+0"));
        assert!(has_exponent("2e-3"));
        assert!(!has_exponent("12,34 56,78"));
        assert!(!has_exponent("Euro"));
    }
}
