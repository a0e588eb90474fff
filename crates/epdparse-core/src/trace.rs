//! The `rawExtract` diagnostic map attached to every parse result.

use crate::model::RawExtract;
use serde::Serialize;

pub const PARSER_ID: &str = "parserId";
pub const PARSER_SCORES: &str = "parserScores";
pub const PARSER_FALLBACK: &str = "parserFallback";
pub const WARNINGS: &str = "warnings";
pub const VALID_UNTIL_DEFAULTED: &str = "validUntilDefaulted";
pub const META_PREFIX: &str = "meta.";

/// Results table under a heading that names no set.
pub const UNLABELED_SECTION: &str = "unlabeledSection";
pub const UNLABELED_MODULES: &str = "unlabeledModules";
pub const INFERRED_SET: &str = "inferredSet";

/// Written for a set whose results section was not found.
pub const NONE: &str = "none";

/// `set1Section`, `set2Section`.
pub fn section_key(set: u8) -> String {
    format!("set{set}Section")
}

/// `set1Modules`, `set2Modules`.
pub fn modules_key(set: u8) -> String {
    format!("set{set}Modules")
}

/// One candidate's score, as recorded in the score trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserScore {
    pub parser_id: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `"<id>=<score to 2 decimals>:<reason>"`.
pub fn format_score_entry(score: &ParserScore) -> String {
    format!(
        "{}={:.2}:{}",
        score.parser_id,
        score.score,
        score.reason.as_deref().unwrap_or("")
    )
}

/// All entries joined with `" | "`, in registration order.
pub fn format_score_trace(scores: &[ParserScore]) -> String {
    scores
        .iter()
        .map(format_score_entry)
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Collects diagnostic entries and warnings while a document is parsed.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: RawExtract,
    warnings: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(warning = %message, "parse warning");
        self.warnings.push(message);
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// The finished map; `warnings` is present only when something was reported.
    pub fn into_raw_extract(self) -> RawExtract {
        let mut raw = self.entries;
        if !self.warnings.is_empty() {
            raw.insert(WARNINGS.to_string(), self.warnings.join("; "));
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(id: &str, score: f64, reason: &str) -> ParserScore {
        ParserScore {
            parser_id: id.into(),
            score,
            reason: Some(reason.into()),
        }
    }

    #[test]
    fn test_score_entry_two_decimals() {
        assert_eq!(
            format_score_entry(&score("asphalt-ecochain", 0.6, "asfalt")),
            "asphalt-ecochain=0.60:asfalt"
        );
        let bare = ParserScore {
            parser_id: "x".into(),
            score: 0.0,
            reason: None,
        };
        assert_eq!(format_score_entry(&bare), "x=0.00:");
    }

    #[test]
    fn test_score_trace_joined() {
        let trace = format_score_trace(&[score("a", 0.6, "r1"), score("b", 0.3, "r2")]);
        assert_eq!(trace, "a=0.60:r1 | b=0.30:r2");
    }

    #[test]
    fn test_diagnostics_warnings_only_when_present() {
        let mut d = Diagnostics::new();
        d.set(PARSER_ID, "p");
        let raw = d.clone().into_raw_extract();
        assert!(!raw.contains_key(WARNINGS));

        d.warn("first");
        d.warn("second");
        let raw = d.into_raw_extract();
        assert_eq!(raw[WARNINGS], "first; second");
        assert_eq!(raw[PARSER_ID], "p");
    }

    #[test]
    fn test_keys() {
        assert_eq!(section_key(1), "set1Section");
        assert_eq!(modules_key(2), "set2Modules");
    }
}
