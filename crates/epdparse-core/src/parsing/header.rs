use crate::model::{DatabaseInfo, PcrInfo};
use crate::parsing::dates::{default_expiration, normalize_date};
use crate::parsing::references::{parse_database, parse_pcr};
use regex::Regex;
use std::sync::LazyLock;

pub const PRODUCT_LABELS: &[&str] = &[
    "productnaam",
    "product naam",
    "naam product",
    "naam van het product",
    "product name",
];

pub const DECLARED_UNIT_LABELS: &[&str] = &[
    "functionele eenheid",
    "functional unit",
    "declared unit",
    "gedeclareerde eenheid",
    "verklaarde eenheid",
];

pub const MANUFACTURER_LABELS: &[&str] = &[
    "producent",
    "fabrikant",
    "manufacturer",
    "producer",
    "eigenaar van de epd",
    "epd-eigenaar",
    "epd eigenaar",
    "epd owner",
    "owner of the declaration",
    "bedrijfsnaam",
];

pub const ISSUE_DATE_LABELS: &[&str] = &[
    "datum van publicatie",
    "publicatiedatum",
    "datum publicatie",
    "uitgiftedatum",
    "datum uitgifte",
    "date of issue",
    "date of publication",
    "publication date",
    "issue date",
];

pub const VALID_UNTIL_LABELS: &[&str] = &[
    "geldig tot",
    "geldig t/m",
    "einde geldigheid",
    "vervaldatum",
    "geldigheidsdatum",
    "valid until",
    "valid to",
    "expiry date",
    "expiration date",
];

pub const VERIFIER_LABELS: &[&str] = &[
    "verificateur",
    "geverifieerd door",
    "toetser",
    "verifier",
    "verified by",
];

pub const PCR_LABELS: &[&str] = &[
    "pcr",
    "product category rules",
    "productcategorieregels",
    "productcategorie regels",
];

pub const DATABASE_LABELS: &[&str] = &[
    "database",
    "databank",
    "achtergronddatabase",
    "gebruikte database",
    "background database",
    "lca database",
    "lca-database",
];

const DATE: &str = r"(\d{4}[-/.]\d{1,2}[-/.]\d{1,2}|\d{1,2}[-/.]\d{1,2}[-/.]\d{4}|\d{1,2}\s+[A-Za-z]{3,10}\.?\s+\d{4})";

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid field regex")
}

static PRODUCT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        regex(r"(?im)^\s*(?:product\s*naam|product\s*name|product)\s*[:\-]\s*(.+)$"),
        regex(r"(?im)^EPD\s+(?:van|voor|for|of)\s+(.+)$"),
    ]
});

static DECLARED_UNIT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        regex(r"(?i)functionele\s+eenheid\s*(?:is|:)?\s*([^\n]+)"),
        regex(r"(?i)(?:declared|functional)\s+unit\s*(?:is|:)?\s*([^\n]+)"),
        regex(r"(?i)\bper\s+(1\s*(?:ton|tonne|kg|stuk|piece|m2|m3|m1|meter|m)\b[^\n]{0,60})"),
    ]
});

static MANUFACTURER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![regex(
        r"(?i)(?:opgesteld\s+voor|prepared\s+for|in\s+opdracht\s+van)\s*:?\s*([^\n]+)",
    )]
});

static ISSUE_DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![regex(&format!(
        r"(?i)(?:publicatie\s*datum|datum\s+van\s+publicatie|uitgifte\s*datum|date\s+of\s+(?:issue|publication)|issued|gepubliceerd)[^\n\d]{{0,25}}{DATE}"
    ))]
});

static VALID_UNTIL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        regex(&format!(
            r"(?i)(?:geldig\s+tot|geldig\s+t/m|valid\s+until|valid\s+to|einde\s+geldigheid|expiry|expiration)[^\n\d]{{0,25}}{DATE}"
        )),
        regex(&format!(
            r"(?i)geldigheid[^\n]{{0,40}}?(?:tot|t/m|until)\s*:?\s*{DATE}"
        )),
    ]
});

static VERIFIER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![regex(
        r"(?i)(?:geverifieerd\s+door|verified\s+by|verificateur)\s*:?\s*([^\n]+)",
    )]
});

static PCR_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| vec![regex(r"(?i)\b((?:NL[-\s]?)?PCR\b[^\n]{0,80})")]);

static LCA_STANDARD: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?i)\bEN\s*15804\s*(?:\+\s*(A[12])\b)?"));

static BEPALINGSMETHODE: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(?i)bepalingsmethode[^\n\d]{0,60}?(\d+(?:\.\d+)+)"));

static VERIFIED_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    regex(
        r"(?i)onafhankelijk\w*\s+(?:extern\w*\s+)?(?:geverifieerd|verificatie|getoetst)|independent(?:ly)?\s+(?:external\s+|third[- ]party\s+)?verifi\w*|third[- ]party\s+verifi\w*|extern\w*\s+geverifieerd",
    )
});

/// Scalar fields found in an EPD document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpdHeader {
    pub product_name: Option<String>,
    pub declared_unit: Option<String>,
    pub manufacturer: Option<String>,
    pub issue_date: Option<String>,
    pub valid_until: Option<String>,
    /// True when `valid_until` was derived from the issue date.
    pub valid_until_defaulted: bool,
    pub pcr_raw: Option<String>,
    pub pcr: Option<PcrInfo>,
    pub lca_standard: Option<String>,
    pub verified: bool,
    pub verifier: Option<String>,
    pub database_raw: Option<String>,
    pub database: Option<DatabaseInfo>,
}

/// Extract all scalar fields from normalized document text.
///
/// `validity_years` is the default validity window applied when only a
/// publication date is present.
pub fn parse_header(text: &str, validity_years: u32) -> EpdHeader {
    let mut header = EpdHeader {
        product_name: extract_field(text, PRODUCT_LABELS, &PRODUCT_PATTERNS),
        declared_unit: extract_field(text, DECLARED_UNIT_LABELS, &DECLARED_UNIT_PATTERNS),
        manufacturer: extract_field(text, MANUFACTURER_LABELS, &MANUFACTURER_PATTERNS),
        issue_date: extract_date(text, ISSUE_DATE_LABELS, &ISSUE_DATE_PATTERNS),
        valid_until: extract_date(text, VALID_UNTIL_LABELS, &VALID_UNTIL_PATTERNS),
        verifier: extract_field(text, VERIFIER_LABELS, &VERIFIER_PATTERNS),
        pcr_raw: extract_field(text, PCR_LABELS, &PCR_PATTERNS),
        database_raw: extract_labeled(text, DATABASE_LABELS),
        lca_standard: extract_lca_standard(text),
        ..EpdHeader::default()
    };

    if header.valid_until.is_none() {
        if let Some(issued) = &header.issue_date {
            header.valid_until = default_expiration(issued, validity_years);
            header.valid_until_defaulted = header.valid_until.is_some();
        }
    }

    header.pcr = header.pcr_raw.as_deref().map(parse_pcr);
    header.database = parse_database(header.database_raw.as_deref(), Some(text));
    header.verified = header.verifier.is_some() || VERIFIED_STATEMENT.is_match(text);

    header
}

/// Label-anchored search first, then the fallback patterns.
pub fn extract_field(text: &str, labels: &[&str], patterns: &[Regex]) -> Option<String> {
    extract_labeled(text, labels).or_else(|| extract_by_patterns(text, patterns))
}

/// First value on a line that starts with one of `labels` (case-insensitive).
///
/// The value is everything after the first colon. A label alone on its line
/// takes the next line as value unless that line looks like another
/// `label: value` pair. Other colon-less lines are skipped.
pub fn extract_labeled(text: &str, labels: &[&str]) -> Option<String> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    for (i, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();
        for label in labels {
            if !lower.starts_with(label) || !label_boundary(&lower, label.len()) {
                continue;
            }
            let value = match line.find(':') {
                Some(idx) => line[idx + 1..].trim(),
                None if line.get(label.len()..).unwrap_or("").trim().is_empty() => "",
                None => continue,
            };
            if !value.is_empty() {
                return Some(value.to_string());
            }
            if let Some(next) = lines.get(i + 1) {
                if !next.is_empty() && !next.contains(':') {
                    return Some(next.to_string());
                }
            }
        }
    }

    None
}

/// The label must end at a word boundary: "product" must not match "productie".
fn label_boundary(lower: &str, len: usize) -> bool {
    lower[len..]
        .chars()
        .next()
        .map_or(true, |c| !c.is_alphanumeric())
}

/// First capture group of the first matching pattern, trimmed.
pub fn extract_by_patterns(text: &str, patterns: &[Regex]) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

fn extract_date(text: &str, labels: &[&str], patterns: &[Regex]) -> Option<String> {
    extract_labeled(text, labels)
        .and_then(|v| normalize_date(&v))
        .or_else(|| extract_by_patterns(text, patterns).and_then(|v| normalize_date(&v)))
}

/// "EN 15804+A2" style reference, preferring one that names the amendment,
/// otherwise the NMD determination method version.
pub fn extract_lca_standard(text: &str) -> Option<String> {
    let mut plain = false;
    for caps in LCA_STANDARD.captures_iter(text) {
        match caps.get(1) {
            Some(amendment) => {
                return Some(format!("EN 15804+{}", amendment.as_str().to_uppercase()))
            }
            None => plain = true,
        }
    }
    if plain {
        return Some("EN 15804".to_string());
    }
    BEPALINGSMETHODE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|v| format!("Bepalingsmethode v{}", v.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "Milieuproductverklaring
Productnaam: Asfalt AC 16 Surf
Producent: Wegenbouw B.V.
Functionele eenheid: 1 ton asfalt
Datum van publicatie: 15-03-2022
PCR: NL-PCR Asfalt versie 1.0
Database: Nationale Milieudatabase versie 3.5 en Ecoinvent 3.6
Verificateur: J. Jansen, LCA Toetsing
Conform EN 15804+A2";

    #[test]
    fn test_parse_header_basic() {
        let h = parse_header(DOC, 5);
        assert_eq!(h.product_name.as_deref(), Some("Asfalt AC 16 Surf"));
        assert_eq!(h.manufacturer.as_deref(), Some("Wegenbouw B.V."));
        assert_eq!(h.declared_unit.as_deref(), Some("1 ton asfalt"));
        assert_eq!(h.issue_date.as_deref(), Some("2022-03-15"));
        assert_eq!(h.verifier.as_deref(), Some("J. Jansen, LCA Toetsing"));
        assert!(h.verified);
        assert_eq!(h.lca_standard.as_deref(), Some("EN 15804+A2"));
        assert_eq!(
            h.database.unwrap().label,
            "NMD v3.5 | EcoInvent v3.6"
        );
        let pcr = h.pcr.unwrap();
        assert_eq!(pcr.version.as_deref(), Some("1.0"));
    }

    #[test]
    fn test_expiration_defaults_to_five_years() {
        let h = parse_header("Publicatiedatum: 2022-01-01", 5);
        assert_eq!(h.valid_until.as_deref(), Some("2027-01-01"));
        assert!(h.valid_until_defaulted);
    }

    #[test]
    fn test_explicit_expiration_kept() {
        let h = parse_header("Publicatiedatum: 2022-01-01\nGeldig tot: 31-12-2025", 5);
        assert_eq!(h.valid_until.as_deref(), Some("2025-12-31"));
        assert!(!h.valid_until_defaulted);
    }

    #[test]
    fn test_label_boundary() {
        assert_eq!(
            extract_labeled("Productnaamgeving: x\nProductnaam: Buis", PRODUCT_LABELS).as_deref(),
            Some("Buis")
        );
        let h = parse_header("Productie: continu\nProduct: Buis", 5);
        assert_eq!(h.product_name.as_deref(), Some("Buis"));
    }

    #[test]
    fn test_label_without_colon_is_not_a_value() {
        let h = parse_header("Product description\nProductnaam: AC 16 Surf", 5);
        assert_eq!(h.product_name.as_deref(), Some("AC 16 Surf"));

        let h = parse_header("PCR Asfalt versie 1.0", 5);
        assert_eq!(h.pcr_raw.as_deref(), Some("PCR Asfalt versie 1.0"));
        assert_eq!(h.pcr.unwrap().version.as_deref(), Some("1.0"));
    }

    #[test]
    fn test_product_category_rules_not_product_name() {
        let h = parse_header(
            "Product category rules: NL-PCR Asfalt 1.0\nProductnaam: AC 16 Surf",
            5,
        );
        assert_eq!(h.product_name.as_deref(), Some("AC 16 Surf"));
        assert_eq!(h.pcr_raw.as_deref(), Some("NL-PCR Asfalt 1.0"));
    }

    #[test]
    fn test_label_value_on_next_line() {
        assert_eq!(
            extract_labeled("Productnaam\nPVC U3 buis", PRODUCT_LABELS).as_deref(),
            Some("PVC U3 buis")
        );
        assert_eq!(
            extract_labeled("Productnaam\nProducent: X", PRODUCT_LABELS),
            None
        );
    }

    #[test]
    fn test_pattern_fallback() {
        let text = "De functionele eenheid is 1 stuk buis";
        assert_eq!(
            extract_field(text, DECLARED_UNIT_LABELS, &DECLARED_UNIT_PATTERNS).as_deref(),
            Some("1 stuk buis")
        );
    }

    #[test]
    fn test_nothing_found() {
        let h = parse_header("", 5);
        assert_eq!(h, EpdHeader::default());
    }

    #[test]
    fn test_lca_standard_variants() {
        assert_eq!(
            extract_lca_standard("volgens EN 15804 en EN15804 +A1").as_deref(),
            Some("EN 15804+A1")
        );
        assert_eq!(
            extract_lca_standard("EN 15804").as_deref(),
            Some("EN 15804")
        );
        assert_eq!(
            extract_lca_standard("NMD Bepalingsmethode versie 1.1").as_deref(),
            Some("Bepalingsmethode v1.1")
        );
        assert_eq!(extract_lca_standard("niets"), None);
    }

    #[test]
    fn test_verified_statement_without_verifier() {
        let h = parse_header("Deze EPD is onafhankelijk extern geverifieerd.", 5);
        assert!(h.verified);
        assert!(h.verifier.is_none());
    }
}
