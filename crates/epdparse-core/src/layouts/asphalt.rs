//! Asphalt EPDs generated with Ecochain: one results table per SBK set under
//! "Resultaten ... SBK set N" headings.

use crate::layouts::common::{build_epd, extract_set};
use crate::layouts::{LayoutParser, ParseContext};
use crate::model::{NormalizedEpd, ParserMatch, PcrInfo};
use crate::parsing::header::{extract_labeled, parse_header};
use crate::parsing::references::{parse_database, parse_pcr};
use crate::parsing::section::{has_set_heading, HeadingStyle};
use crate::trace::Diagnostics;
use regex::Regex;
use std::sync::LazyLock;

pub const ID: &str = "asphalt-ecochain";

/// Results tables rarely exceed this many characters.
pub const SECTION_CAP: usize = 12_000;

const SCORE_ASFALT: f64 = 0.35;
const SCORE_ECOCHAIN: f64 = 0.25;
const SCORE_PCR: f64 = 0.3;
const SCORE_HEADING: f64 = 0.1;

const DATABASE_LABELS: &[&str] = &[
    "nmd-database",
    "nmd database",
    "gebruikte databases",
    "achtergrondgegevens",
    "achtergronddata",
];

static PCR_ASFALT_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bpcr\b[^\n]{0,40}\basfalt|\basfalt[^\n]{0,20}\bpcr\b")
        .expect("valid asphalt PCR regex")
});

static NL_PCR_ASFALT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bNL[-\s]?PCR\s+asfalt\b").expect("valid NL-PCR regex")
});

static PCR_ASFALT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bPCR\s+asfalt\b").expect("valid PCR asfalt regex"));

static BARE_ASFALT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*asfalt\b").expect("valid bare asfalt regex"));

pub struct AsphaltEcochainParser;

impl AsphaltEcochainParser {
    pub fn new() -> Self {
        AsphaltEcochainParser
    }
}

impl Default for AsphaltEcochainParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical PCR name for asphalt documents, version taken from the line.
pub fn canonical_pcr(raw: &str) -> PcrInfo {
    let parsed = parse_pcr(raw);
    let name = if NL_PCR_ASFALT.is_match(raw) {
        "NL-PCR Asfalt"
    } else if PCR_ASFALT.is_match(raw) {
        "PCR Asfalt"
    } else if BARE_ASFALT.is_match(raw) {
        "Asfalt"
    } else {
        return parsed;
    };
    PcrInfo {
        name: name.to_string(),
        version: parsed.version,
    }
}

impl LayoutParser for AsphaltEcochainParser {
    fn id(&self) -> &str {
        ID
    }

    fn score(&self, text: &str) -> ParserMatch {
        let lower = text.to_lowercase();
        let mut score = 0.0;
        let mut reasons = Vec::new();

        if lower.contains("asfalt") {
            score += SCORE_ASFALT;
            reasons.push("asfalt");
        }
        if lower.contains("ecochain") {
            score += SCORE_ECOCHAIN;
            reasons.push("ecochain");
        }
        if PCR_ASFALT_MENTION.is_match(text) {
            score += SCORE_PCR;
            reasons.push("pcr asfalt");
        }
        if score > 0.0 && has_set_heading(text) {
            score += SCORE_HEADING;
            reasons.push("sbk set heading");
        }

        if reasons.is_empty() {
            ParserMatch::none("no asphalt markers")
        } else {
            ParserMatch::new(score, reasons.join(", "))
        }
    }

    fn parse(&self, text: &str, ctx: &ParseContext<'_>) -> NormalizedEpd {
        let mut header = parse_header(text, ctx.config.validity_years);
        header.pcr = header.pcr_raw.as_deref().map(canonical_pcr);
        if header.database_raw.is_none() {
            header.database_raw = extract_labeled(text, DATABASE_LABELS);
            header.database = parse_database(header.database_raw.as_deref(), Some(text));
        }

        let cap = ctx.config.section_cap(SECTION_CAP);
        let styles = [HeadingStyle::Results, HeadingStyle::MilieuImpact];
        let mut diag = Diagnostics::new();
        let sets = [1u8, 2]
            .into_iter()
            .map(|set| extract_set(text, set, &styles, cap, &mut diag))
            .collect();

        build_epd(header, sets, diag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::layouts::Metadata;
    use crate::model::SetType;

    #[test]
    fn test_canonical_pcr_variants() {
        let pcr = canonical_pcr("NL PCR asfalt versie 1.1");
        assert_eq!(pcr.name, "NL-PCR Asfalt");
        assert_eq!(pcr.version.as_deref(), Some("1.1"));
        assert_eq!(canonical_pcr("PCR ASFALT 2.0").name, "PCR Asfalt");
        assert_eq!(canonical_pcr("Asfalt, v1.0").name, "Asfalt");
        assert_eq!(canonical_pcr("PCR Betonmortel 1.0").name, "Betonmortel");
    }

    #[test]
    fn test_score_full_match() {
        let text = "Asfalt EPD\nEcochain\nPCR: NL-PCR Asfalt 1.0\nResultaten SBK set 1";
        let m = AsphaltEcochainParser.score(text);
        assert!((m.score - 1.0).abs() < 1e-9);
        assert_eq!(
            m.reason.as_deref(),
            Some("asfalt, ecochain, pcr asfalt, sbk set heading")
        );
    }

    #[test]
    fn test_score_partial_and_none() {
        let m = AsphaltEcochainParser.score("Ecochain rapport");
        assert!((m.score - 0.25).abs() < 1e-9);
        let m = AsphaltEcochainParser.score("PVC buis");
        assert_eq!(m.score, 0.0);
        assert_eq!(m.reason.as_deref(), Some("no asphalt markers"));
    }

    #[test]
    fn test_parse_both_sets() {
        let text = "Productnaam: AC 16 Surf
PCR: NL-PCR Asfalt versie 1.0
Resultaten SBK set 1
Indicator Eenheid A1 A2 A3 D
GWP kg CO2 eq 1,0E+0 2,0E+0 3,0E+0 4,0E+0
Resultaten SBK set 2
Indicator Eenheid A1 A2 A3 D
GWP-total kg CO2 eq 5,0E+0 6,0E+0 7,0E+0 8,0E+0
Ecochain Technologies";
        let config = EngineConfig::default();
        let metadata = Metadata::new();
        let ctx = ParseContext {
            config: &config,
            metadata: &metadata,
        };
        let epd = AsphaltEcochainParser.parse(text, &ctx);
        assert_eq!(epd.standard_set, SetType::SbkBoth);
        assert_eq!(epd.results.len(), 2);
        assert_eq!(epd.results[1].indicator, "GWP-TOTAL");
        assert_eq!(epd.pcr.unwrap().name, "NL-PCR Asfalt");
        assert_eq!(epd.impacts.len(), 8);
    }
}
