//! PVC pipe EPDs generated with Ecochain. Results appear under
//! "Milieu-impact SBK set N" headings, or under a plain results heading with
//! the set implied by the indicators used.

use crate::indicators::{self, IndicatorMatcher};
use crate::layouts::common::{
    build_epd, extract_set, first_populated, record_modules, rows_from_records, SetExtraction,
};
use crate::layouts::{LayoutParser, ParseContext};
use crate::model::{NormalizedEpd, ParserMatch, SetType};
use crate::parsing::header::parse_header;
use crate::parsing::rows::RowRecord;
use crate::parsing::section::{generic_candidates, has_set_heading, HeadingStyle};
use crate::trace::{self, Diagnostics};
use regex::Regex;
use std::sync::LazyLock;

pub const ID: &str = "pvc-ecochain";

pub const SECTION_CAP: usize = 14_000;

static ECOCHAIN_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\becochain\b[^\n]{0,20}?\bv?\d+(?:\.\d+)+")
        .expect("valid Ecochain version regex")
});

static U3_PIPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bu3[-\s]?(?:pipe|buis|leiding)").expect("valid U3 pipe regex")
});

static PVC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bpvc\b").expect("valid PVC regex"));

static MILIEU_IMPACT_SET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bmilieu[-\s]?impact[^\n]{0,60}?\bsbk\s*[-_]?\s*set\b")
        .expect("valid milieu-impact regex")
});

/// Magnitude and unit word of a declared unit: "1 ton", "per 2 stuks".
static DECLARED_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:(\d+(?:[.,]\d+)?)\s*)?\b((?:tonne|ton|stuks|stuk|pieces|piece|pcs|kg|strekkende\s+meter|meter|m1)\b|m[23]\b|m[²³]|m\b)",
    )
    .expect("valid declared unit regex")
});

pub struct PvcEcochainParser;

impl PvcEcochainParser {
    pub fn new() -> Self {
        PvcEcochainParser
    }
}

impl Default for PvcEcochainParser {
    fn default() -> Self {
        Self::new()
    }
}

/// `"1 ton"`, `"1 stuk"`, `"2 m"`: magnitude (default 1) plus canonical unit
/// word. Text without a recognised unit word is returned trimmed.
pub fn normalize_declared_unit(raw: &str) -> String {
    let Some(caps) = DECLARED_UNIT.captures(raw) else {
        return raw.trim().to_string();
    };
    let magnitude = caps
        .get(1)
        .map_or_else(|| "1".to_string(), |m| m.as_str().replace(',', "."));
    let word = caps.get(2).map_or("", |m| m.as_str()).to_lowercase();
    let unit = match word.as_str() {
        "ton" | "tonne" => "ton",
        "stuk" | "stuks" | "piece" | "pieces" | "pcs" => "stuk",
        "kg" => "kg",
        "m2" | "m²" => "m2",
        "m3" | "m³" => "m3",
        _ => "m",
    };
    format!("{magnitude} {unit}")
}

/// Set implied by the indicators of an unlabeled table.
pub fn infer_set(records: &[RowRecord]) -> SetType {
    if records.iter().any(|r| indicators::is_set2_only(&r.indicator)) {
        SetType::SbkSet2
    } else {
        SetType::Unknown
    }
}

impl LayoutParser for PvcEcochainParser {
    fn id(&self) -> &str {
        ID
    }

    fn score(&self, text: &str) -> ParserMatch {
        let marker = ECOCHAIN_VERSION.is_match(text);
        let u3 = U3_PIPE.is_match(text);
        let pvc = PVC.is_match(text);

        match (marker, u3 || pvc) {
            (true, true) => {
                let mut score = 0.7;
                let mut reasons = vec!["ecochain version", if u3 { "u3 pipe" } else { "pvc" }];
                if u3 && pvc {
                    score += 0.1;
                    reasons.push("pvc");
                }
                if MILIEU_IMPACT_SET.is_match(text) {
                    score += 0.1;
                    reasons.push("milieu-impact heading");
                }
                ParserMatch::new(score, reasons.join(", "))
            }
            (false, true) => ParserMatch::new(0.3, "pvc without ecochain version"),
            (true, false) => ParserMatch::new(0.1, "ecochain version only"),
            (false, false) => ParserMatch::none("no pvc markers"),
        }
    }

    fn parse(&self, text: &str, ctx: &ParseContext<'_>) -> NormalizedEpd {
        let mut header = parse_header(text, ctx.config.validity_years);
        header.declared_unit = header.declared_unit.as_deref().map(normalize_declared_unit);

        let cap = ctx.config.section_cap(SECTION_CAP);
        let styles = [HeadingStyle::MilieuImpact, HeadingStyle::Results];
        let mut diag = Diagnostics::new();

        let sets: Vec<SetExtraction> = if has_set_heading(text) {
            [1u8, 2]
                .into_iter()
                .map(|set| extract_set(text, set, &styles, cap, &mut diag))
                .collect()
        } else {
            vec![extract_unlabeled(text, cap, &mut diag)]
        };

        build_epd(header, sets, diag)
    }
}

/// Rows of a table under a heading that names no set.
fn extract_unlabeled(text: &str, cap: usize, diag: &mut Diagnostics) -> SetExtraction {
    let matcher = IndicatorMatcher::all();
    let Some((section, records)) = first_populated(generic_candidates(text, cap), &matcher)
    else {
        tracing::debug!("no results section");
        diag.set(trace::UNLABELED_SECTION, trace::NONE);
        return SetExtraction::default();
    };

    let set_type = infer_set(&records);
    tracing::debug!(%set_type, records = records.len(), "unlabeled results section");
    diag.set(trace::UNLABELED_SECTION, section.text.chars().count().to_string());
    diag.set(trace::INFERRED_SET, set_type.to_string());

    let extraction = rows_from_records(section.text, &records, |_| set_type, "results", diag);
    record_modules(diag, trace::UNLABELED_MODULES, &extraction);
    extraction
}
