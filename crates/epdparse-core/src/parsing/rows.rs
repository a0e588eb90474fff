//! Indicator records inside a results section.
//!
//! A record is an indicator line plus the lines that wrap from it, up to the
//! next indicator or a footer line. Each record splits into a unit string and
//! the value tokens that follow it.

use crate::indicators::{IndicatorHit, IndicatorMatcher};
use crate::parsing::values::{
    first_value_position, has_exponent, split_glued_amounts, split_glued_exponents, value_tokens,
};
use std::sync::LazyLock;

/// Lines starting with these (lower-cased) close the current record.
pub const FOOTER_PREFIXES: &[&str] = &[
    "legenda",
    "afkortingen",
    "abbreviations",
    "toelichting",
    "disclaimer",
    "mnd =",
    "mnd:",
    "pagina ",
    "page ",
    "* ",
    "ecochain technologies",
    "bron:",
    "source:",
    "note:",
];

/// Indicators a layout does not ask for still end the record above them.
static ANY_INDICATOR: LazyLock<IndicatorMatcher> = LazyLock::new(IndicatorMatcher::all);

/// One indicator row of a results table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRecord {
    /// Canonical indicator code.
    pub indicator: String,
    /// The indicator as printed.
    pub label: String,
    pub unit: String,
    pub tokens: Vec<String>,
}

pub fn is_footer_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    FOOTER_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Split a results section into indicator records.
pub fn tokenize(section: &str, matcher: &IndicatorMatcher) -> Vec<RowRecord> {
    let mut records = Vec::new();
    let mut current: Option<(IndicatorHit, String)> = None;

    for line in section.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if is_footer_line(line) {
            records.extend(current.take().map(|(hit, text)| build_record(&hit, &text)));
            continue;
        }

        if let Some(hit) = matcher.find(line) {
            records.extend(current.take().map(|(hit, text)| build_record(&hit, &text)));
            let text = line[hit.start..].to_string();
            let hit = IndicatorHit {
                end: hit.end - hit.start,
                start: 0,
                ..hit
            };
            current = Some((hit, text));
            continue;
        }

        if ANY_INDICATOR.find(line).is_some_and(|h| h.start == 0) {
            records.extend(current.take().map(|(hit, text)| build_record(&hit, &text)));
            continue;
        }

        if let Some((_, text)) = current.as_mut() {
            text.push(' ');
            text.push_str(line);
        }
    }

    records.extend(current.map(|(hit, text)| build_record(&hit, &text)));
    records
}

/// Turn assembled record text (starting at the indicator) into unit and tokens.
fn build_record(hit: &IndicatorHit, text: &str) -> RowRecord {
    let label = text[..hit.end].to_string();
    let rest = text[hit.end..].split_whitespace().collect::<Vec<_>>().join(" ");

    let (unit, tail) = match first_value_position(&rest) {
        Some(pos) => (rest[..pos].trim(), &rest[pos..]),
        None => (rest.trim(), ""),
    };

    let mut tail = split_glued_exponents(tail);
    if matches!(hit.code, "MKI" | "ECI") && !has_exponent(&tail) {
        tail = split_glued_amounts(&tail);
    }

    RowRecord {
        indicator: hit.code.to_string(),
        label,
        unit: unit.to_string(),
        tokens: value_tokens(&tail),
    }
}

/// Most value tokens on any record; drives the fallback column order.
pub fn max_token_count(records: &[RowRecord]) -> usize {
    records.iter().map(|r| r.tokens.len()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set1() -> IndicatorMatcher {
        IndicatorMatcher::for_set(1)
    }

    #[test]
    fn test_mki_row_tokens_and_unit() {
        let records = tokenize(
            "MKI Euro 1,00E+0 2,00E+0 3,00E+0 6,00E+0 7,00E+0",
            &set1(),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].indicator, "MKI");
        assert_eq!(records[0].unit, "Euro");
        assert_eq!(
            records[0].tokens,
            vec!["1,00E+0", "2,00E+0", "3,00E+0", "6,00E+0", "7,00E+0"]
        );
    }

    #[test]
    fn test_wrapped_record() {
        let section = "Resultaten SBK set 1\nA1 A2 A3\nGWP kg CO2\neq 1,0E+0\n2,0E+0 3,0E+0\nODP kg CFC11 eq 1,0E-8";
        let records = tokenize(section, &set1());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].unit, "kg CO2 eq");
        assert_eq!(records[0].tokens, vec!["1,0E+0", "2,0E+0", "3,0E+0"]);
        assert_eq!(records[1].indicator, "ODP");
        assert_eq!(records[1].unit, "kg CFC11 eq");
    }

    #[test]
    fn test_footer_closes_record() {
        let section = "GWP kg CO2 eq 1 2 3\nPagina 4 van 12\nLegenda 5 6";
        let records = tokenize(section, &set1());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tokens, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_glued_exponents_split() {
        let records = tokenize("AP mol H+ eq 1,00E+02,00E-13,00E+0", &set1());
        assert_eq!(records[0].tokens, vec!["1,00E+0", "2,00E-1", "3,00E+0"]);
    }

    #[test]
    fn test_glued_amounts_only_for_cost_rows() {
        let records = tokenize("ECI Euro 12,3445,676,01\nGWP kg CO2 eq 12,3445", &set1());
        assert_eq!(records[0].tokens, vec!["12,34", "45,67", "6,01"]);
        assert_eq!(records[1].tokens, vec!["12,3445"]);
    }

    #[test]
    fn test_luluc_row_not_claimed_by_gwp() {
        let section = "GWP kg CO2 eq 1 2 3\nGWP-luluc kg CO2 eq 7 8 9\nODP kg CFC11 eq 4";
        let records = tokenize(section, &set1());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].indicator, "GWP");
        assert_eq!(records[0].tokens, vec!["1", "2", "3"]);
        assert_eq!(records[1].indicator, "ODP");
    }

    #[test]
    fn test_unit_digits_not_values() {
        let records = tokenize("HTP kg 1,4-DB eq 2,0E+0 3,0E+0", &set1());
        assert_eq!(records[0].unit, "kg 1,4-DB eq");
        assert_eq!(records[0].tokens, vec!["2,0E+0", "3,0E+0"]);
    }

    #[test]
    fn test_mnd_tokens() {
        let records = tokenize("ADPE kg Sb eq 1,0E-6 MND MND", &set1());
        assert_eq!(records[0].tokens, vec!["1,0E-6", "MND", "MND"]);
    }

    #[test]
    fn test_label_and_max_tokens() {
        let records = tokenize("Global warming GWP kg CO2 eq 1 2\nODP kg 1 2 3 4", &set1());
        assert_eq!(records[0].label, "GWP");
        assert_eq!(max_token_count(&records), 4);
        assert_eq!(max_token_count(&[]), 0);
    }

    #[test]
    fn test_no_values() {
        let records = tokenize("GWP kg CO2 eq", &set1());
        assert_eq!(records[0].unit, "kg CO2 eq");
        assert!(records[0].tokens.is_empty());
    }
}
