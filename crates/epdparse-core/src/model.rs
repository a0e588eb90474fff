use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Diagnostic side channel attached to every parse result.
pub type RawExtract = BTreeMap<String, String>;

/// Stage -> value map of one result row. `None` marks a stage declared MND.
pub type StageValues = BTreeMap<String, Option<Decimal>>;

/// The SBK indicator scheme a value was declared under.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum SetType {
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
    #[serde(rename = "SBK_SET_1")]
    SbkSet1,
    #[serde(rename = "SBK_SET_2")]
    SbkSet2,
    #[serde(rename = "SBK_BOTH")]
    SbkBoth,
}

impl fmt::Display for SetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetType::Unknown => write!(f, "UNKNOWN"),
            SetType::SbkSet1 => write!(f, "SBK_SET_1"),
            SetType::SbkSet2 => write!(f, "SBK_SET_2"),
            SetType::SbkBoth => write!(f, "SBK_BOTH"),
        }
    }
}

impl SetType {
    /// Map a set number as printed in headings ("SBK set 1") to its set type.
    pub fn from_set_number(n: u8) -> Option<SetType> {
        match n {
            1 => Some(SetType::SbkSet1),
            2 => Some(SetType::SbkSet2),
            _ => None,
        }
    }

    /// Combine the sets two groups of rows were declared under.
    pub fn combine(self, other: SetType) -> SetType {
        match (self, other) {
            (a, b) if a == b => a,
            (SetType::Unknown, b) => b,
            (a, SetType::Unknown) => a,
            _ => SetType::SbkBoth,
        }
    }
}

/// Legacy flat impact value: one indicator, one set, one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactRecord {
    pub indicator: String,
    pub set_type: SetType,
    pub stage: String,
    pub value: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Grouped impact row: one indicator in one set with all of its stage values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    pub indicator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub set_type: SetType,
    pub values: StageValues,
}

impl ResultRow {
    pub fn new(indicator: impl Into<String>, set_type: SetType) -> Self {
        ResultRow {
            indicator: indicator.into(),
            unit: None,
            set_type,
            values: StageValues::new(),
        }
    }

    /// True if at least one stage carries a number.
    pub fn has_values(&self) -> bool {
        self.values.values().any(Option::is_some)
    }
}

/// Whether the document declares a life-cycle stage at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDeclaration {
    pub module: String,
    pub declared: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mnd: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcrInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl fmt::Display for PcrInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{} {}", self.name, v),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Background database versions. `label` is the canonical joined form
/// ("NMD v3.5 | EcoInvent v3.6") or the raw text when no version was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nmd_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecoinvent_version: Option<String>,
    pub label: String,
}

/// Canonical parse result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEpd {
    pub product_name: Option<String>,
    pub declared_unit: Option<String>,
    pub manufacturer: Option<String>,
    /// ISO 8601 date (YYYY-MM-DD).
    pub issue_date: Option<String>,
    /// ISO 8601 date (YYYY-MM-DD).
    pub valid_until: Option<String>,
    pub pcr: Option<PcrInfo>,
    pub lca_standard: Option<String>,
    pub verified: bool,
    pub verifier: Option<String>,
    pub database: Option<DatabaseInfo>,
    pub modules_declared: Vec<ModuleDeclaration>,
    pub results: Vec<ResultRow>,
    pub impacts: Vec<ImpactRecord>,
    pub standard_set: SetType,
    pub raw_extract: RawExtract,
}

/// Flat record shape consumed by the save/update API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyExtract {
    pub product_name: Option<String>,
    pub functional_unit: Option<String>,
    pub producer: Option<String>,
    pub publication_date: Option<String>,
    pub expiration_date: Option<String>,
    pub pcr_version: Option<String>,
    pub database_version: Option<String>,
    pub lca_method: Option<String>,
    pub verified: bool,
    pub verifier: Option<String>,
    pub standard_set: SetType,
    pub impacts: Vec<ImpactRecord>,
    #[serde(default)]
    pub raw_extract: RawExtract,
}

/// Confidence that a layout parser understands a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParserMatch {
    /// In `[0, 1]`.
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ParserMatch {
    pub fn new(score: f64, reason: impl Into<String>) -> Self {
        let score = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        };
        ParserMatch {
            score,
            reason: Some(reason.into()),
        }
    }

    pub fn none(reason: impl Into<String>) -> Self {
        ParserMatch::new(0.0, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_type_serializes_screaming() {
        let json = serde_json::to_string(&SetType::SbkSet1).unwrap();
        assert_eq!(json, "\"SBK_SET_1\"");
        let back: SetType = serde_json::from_str("\"SBK_BOTH\"").unwrap();
        assert_eq!(back, SetType::SbkBoth);
    }

    #[test]
    fn test_set_type_combine() {
        assert_eq!(
            SetType::SbkSet1.combine(SetType::SbkSet2),
            SetType::SbkBoth
        );
        assert_eq!(SetType::Unknown.combine(SetType::SbkSet2), SetType::SbkSet2);
        assert_eq!(SetType::SbkSet1.combine(SetType::SbkSet1), SetType::SbkSet1);
    }

    #[test]
    fn test_parser_match_clamps() {
        assert_eq!(ParserMatch::new(1.7, "x").score, 1.0);
        assert_eq!(ParserMatch::new(-0.2, "x").score, 0.0);
        assert_eq!(ParserMatch::new(f64::NAN, "x").score, 0.0);
    }

    #[test]
    fn test_pcr_display() {
        let pcr = PcrInfo {
            name: "NL-PCR Asfalt".into(),
            version: Some("1.0".into()),
        };
        assert_eq!(pcr.to_string(), "NL-PCR Asfalt 1.0");
    }
}
