//! Locating the results table of one SBK set inside a document.

use regex::Regex;
use std::sync::LazyLock;

/// Which heading family a layout prints above its results tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingStyle {
    /// "Resultaten ... SBK set N" / "Results ... SBK set N".
    Results,
    /// "Milieu-impact SBK set N".
    MilieuImpact,
}

/// Organization signature blocks and closing chapters that end a results table.
pub const FOOTER_MARKERS: &[&str] = &[
    "ecochain technologies",
    "stichting nationale milieudatabase",
    "verklaring van de verificateur",
    "verification statement",
    "verificatieverklaring",
    "disclaimer",
    "interpretatie van de resultaten",
    "interpretation of results",
];

fn results_heading(set: u8) -> Regex {
    Regex::new(&format!(
        r"(?is)\b(?:resultaten|results)\b.{{0,160}}?\bsbk\s*[-_]?\s*set\s*[-_]?\s*{set}\b"
    ))
    .expect("valid results heading regex")
}

fn milieu_impact_heading(set: u8) -> Regex {
    Regex::new(&format!(
        r"(?i)\bmilieu[-\s]?impact[^\n]{{0,60}}?\bsbk\s*[-_]?\s*set\s*[-_]?\s*{set}\b"
    ))
    .expect("valid milieu-impact heading regex")
}

static RESULTS_HEADINGS: LazyLock<[Regex; 2]> =
    LazyLock::new(|| [results_heading(1), results_heading(2)]);

static MILIEU_IMPACT_HEADINGS: LazyLock<[Regex; 2]> =
    LazyLock::new(|| [milieu_impact_heading(1), milieu_impact_heading(2)]);

static RESULTS_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:resultaten|results)\b").expect("valid results word regex")
});

/// A results heading that names no set.
static GENERIC_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^(?:resultaten|results|milieu[-\s]?impact|milieuprofiel|environmental\s+impacts?)\b[^\n]*$",
    )
    .expect("valid generic heading regex")
});

fn heading(style: HeadingStyle, set: u8) -> Option<&'static Regex> {
    let idx = match set {
        1 => 0,
        2 => 1,
        _ => return None,
    };
    Some(match style {
        HeadingStyle::Results => &RESULTS_HEADINGS[idx],
        HeadingStyle::MilieuImpact => &MILIEU_IMPACT_HEADINGS[idx],
    })
}

/// A located results section; `start..end` are byte offsets into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub set: Option<u8>,
    pub start: usize,
    pub end: usize,
    pub text: &'a str,
}

/// Every section that starts at a heading for `set`, in document order.
///
/// Table-of-contents entries produce candidates too; callers keep the first
/// one that yields indicator rows.
pub fn section_candidates<'a>(
    text: &'a str,
    set: u8,
    style: HeadingStyle,
    cap: usize,
) -> Vec<Section<'a>> {
    let Some(re) = heading(style, set) else {
        return Vec::new();
    };
    let other = if set == 1 { 2 } else { 1 };

    re.find_iter(text)
        .map(|m| {
            let start = heading_start(style, m.start(), m.as_str());
            let end = section_end(text, start, m.end(), cap, Some(other));
            Section {
                set: Some(set),
                start,
                end,
                text: &text[start..end],
            }
        })
        .collect()
}

/// A "Resultaten" heading match may span an earlier heading of the other set;
/// the section starts at the last results word before "SBK set N".
fn heading_start(style: HeadingStyle, start: usize, matched: &str) -> usize {
    match style {
        HeadingStyle::Results => RESULTS_WORD
            .find_iter(matched)
            .last()
            .map_or(start, |w| start + w.start()),
        HeadingStyle::MilieuImpact => start,
    }
}

/// The first results section for `set`, if the document has a heading for it.
pub fn locate(text: &str, set: u8, style: HeadingStyle, cap: usize) -> Option<&str> {
    section_candidates(text, set, style, cap)
        .into_iter()
        .next()
        .map(|s| s.text)
}

/// Sections under headings that name no SBK set.
pub fn generic_candidates(text: &str, cap: usize) -> Vec<Section<'_>> {
    GENERIC_HEADING
        .find_iter(text)
        .map(|m| {
            let end = section_end(text, m.start(), m.end(), cap, None);
            Section {
                set: None,
                start: m.start(),
                end,
                text: &text[m.start()..end],
            }
        })
        .collect()
}

/// True if the document has any set-specific heading in either style.
pub fn has_set_heading(text: &str) -> bool {
    [HeadingStyle::Results, HeadingStyle::MilieuImpact]
        .into_iter()
        .flat_map(|style| [1u8, 2].into_iter().filter_map(move |set| heading(style, set)))
        .any(|re| re.is_match(text))
}

/// Earliest of: a footer marker, the other set's heading, the length cap.
fn section_end(
    text: &str,
    start: usize,
    body_start: usize,
    cap: usize,
    other_set: Option<u8>,
) -> usize {
    let mut end = text[start..]
        .char_indices()
        .nth(cap)
        .map_or(text.len(), |(i, _)| start + i);
    if body_start >= end {
        return end;
    }

    let body = &text[body_start..end];
    let lower = body.to_ascii_lowercase();
    if let Some(pos) = FOOTER_MARKERS.iter().filter_map(|m| lower.find(m)).min() {
        end = body_start + pos;
    }

    if let Some(other) = other_set {
        let body = &text[body_start..end];
        let next = [HeadingStyle::Results, HeadingStyle::MilieuImpact]
            .into_iter()
            .filter_map(|style| heading(style, other))
            .filter_map(|re| re.find(body).map(|m| m.start()))
            .min();
        if let Some(pos) = next {
            end = body_start + pos;
        }
    }

    end
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "Inleiding
Resultaten SBK set 1
Module A1 A2 A3
GWP kg CO2 eq 1,0E+0 2,0E+0 3,0E+0
Resultaten SBK set 2
Module A1 A2 A3
GWP-total kg CO2 eq 4,0E+0 5,0E+0 6,0E+0
Ecochain Technologies B.V.
Amsterdam";

    #[test]
    fn test_locate_set1_ends_at_set2_heading() {
        let s = locate(DOC, 1, HeadingStyle::Results, 12_000).unwrap();
        assert!(s.starts_with("Resultaten SBK set 1"));
        assert!(s.contains("GWP kg CO2 eq"));
        assert!(!s.contains("GWP-total"));
    }

    #[test]
    fn test_locate_set2_ends_at_footer() {
        let s = locate(DOC, 2, HeadingStyle::Results, 12_000).unwrap();
        assert!(s.contains("GWP-total"));
        assert!(!s.contains("Ecochain Technologies"));
    }

    #[test]
    fn test_set2_heading_not_anchored_at_set1() {
        let s = locate(DOC, 2, HeadingStyle::Results, 12_000).unwrap();
        assert!(s.starts_with("Resultaten SBK set 2"));
        assert!(!s.contains("GWP kg CO2 eq 1,0E+0"));
    }

    #[test]
    fn test_missing_heading_is_none() {
        assert!(locate("Geen tabellen hier", 1, HeadingStyle::Results, 12_000).is_none());
        assert!(locate(DOC, 3, HeadingStyle::Results, 12_000).is_none());
    }

    #[test]
    fn test_heading_separator_variants() {
        let text = "Results of the LCA according to SBK-set_2\nGWP-total 1";
        assert!(locate(text, 2, HeadingStyle::Results, 12_000).is_some());
        let text = "Milieu-impact SBK set 1 per ton\nMKI Euro 1,00";
        assert!(locate(text, 1, HeadingStyle::MilieuImpact, 12_000).is_some());
        assert!(locate(text, 1, HeadingStyle::Results, 12_000).is_none());
    }

    #[test]
    fn test_cap_bounds_section() {
        let body = "x".repeat(5_000);
        let text = format!("Resultaten SBK set 1\n{body}");
        let s = locate(&text, 1, HeadingStyle::Results, 1_000).unwrap();
        assert_eq!(s.len(), 1_000);
    }

    #[test]
    fn test_cap_counts_chars() {
        let text = format!("Resultaten SBK set 1\n{}", "é".repeat(100));
        let s = locate(&text, 1, HeadingStyle::Results, 30).unwrap();
        assert_eq!(s.chars().count(), 30);
        assert!(s.ends_with("ééé"));
    }

    #[test]
    fn test_candidates_include_toc_entry() {
        let text = "Inhoud\nResultaten SBK set 1 ..... 4\nBijlage\n\nResultaten SBK set 1\nGWP kg 1";
        let candidates = section_candidates(text, 1, HeadingStyle::Results, 12_000);
        assert_eq!(candidates.len(), 2);
        assert!(candidates[1].text.contains("GWP kg 1"));
    }

    #[test]
    fn test_generic_candidates() {
        let text = "Productinfo\nMilieu-impact per stuk\nGWP-total kg 1\nDisclaimer\nGWP 9";
        let candidates = generic_candidates(text, 14_000);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].text.contains("GWP-total"));
        assert!(!candidates[0].text.contains("GWP 9"));
        assert!(!has_set_heading(text));
        assert!(has_set_heading(DOC));
    }
}
