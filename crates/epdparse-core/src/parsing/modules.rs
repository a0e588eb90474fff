//! Life-cycle stage (module) columns of a results table.

use crate::model::StageValues;
use crate::parsing::values::{is_mnd, parse_number};
use regex::Regex;
use std::sync::LazyLock;

/// Column order assumed for 9-value rows when the table has no stage header.
pub const FALLBACK_MODULES: [&str; 9] = ["A1", "A2", "A3", "A1-A3", "C2", "C3", "C4", "D", "Total"];

/// Minimum row width before the fallback column order is assumed.
pub const MIN_FALLBACK_TOKENS: usize = FALLBACK_MODULES.len();

/// A header line names at least this many stages.
pub const MIN_HEADER_STAGES: usize = 3;

/// Canonical life-cycle order, used when stages from several rows are merged.
pub const CANONICAL_STAGES: &[&str] = &[
    "A1", "A2", "A3", "A1-A3", "A4", "A5", "B1", "B2", "B3", "B4", "B5", "B6", "B7", "B8", "B9",
    "C1", "C2", "C3", "C4", "D", "Total",
];

static STAGE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:A1\s*[-\x{2013}]\s*A?3|A1A3|A[1-5]|B[1-9]|C[1-4]|D|(?i:totaal|total))\b")
        .expect("valid stage token regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleSource {
    /// Read from a stage header row.
    Header,
    /// Assumed from [`FALLBACK_MODULES`].
    Fallback,
}

impl ModuleSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ModuleSource::Header => "header",
            ModuleSource::Fallback => "fallback",
        }
    }
}

/// The stage each value column of a section belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSequence {
    pub modules: Vec<String>,
    pub source: ModuleSource,
}

impl ModuleSequence {
    /// `"A1,A2,A3 (header)"`.
    pub fn describe(&self) -> String {
        format!("{} ({})", self.modules.join(","), self.source.as_str())
    }
}

/// Canonical spelling of a stage token: `Totaal` -> `Total`, `A1A3` -> `A1-A3`.
pub fn normalize_stage(token: &str) -> String {
    let compact: String = token
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '\u{2013}' { '-' } else { c })
        .collect::<String>()
        .to_ascii_uppercase();
    match compact.as_str() {
        "A1A3" | "A1-3" | "A1-A3" => "A1-A3".to_string(),
        "TOTAAL" | "TOTAL" => "Total".to_string(),
        _ => compact,
    }
}

/// Stage tokens on one line, normalized, in order.
pub fn stage_tokens(line: &str) -> Vec<String> {
    STAGE_TOKEN
        .find_iter(line)
        .map(|m| normalize_stage(m.as_str()))
        .collect()
}

/// Find the stage header of a table: a line with three or more stage tokens,
/// or two consecutive lines that together have three or more.
pub fn detect_module_header(lines: &[&str]) -> Option<Vec<String>> {
    for (i, line) in lines.iter().enumerate() {
        let tokens = stage_tokens(line);
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() >= MIN_HEADER_STAGES {
            return Some(dedup(tokens));
        }
        if let Some(next) = lines.get(i + 1) {
            let next_tokens = stage_tokens(next);
            if !next_tokens.is_empty() && tokens.len() + next_tokens.len() >= MIN_HEADER_STAGES {
                return Some(dedup(tokens.into_iter().chain(next_tokens).collect()));
            }
        }
    }
    None
}

fn dedup(tokens: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    for t in tokens {
        if !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

/// Stage columns for a section: its header row, or the fallback order when the
/// widest row has at least nine values. `None` when neither applies.
pub fn resolve_modules(lines: &[&str], max_tokens: usize) -> Option<ModuleSequence> {
    if let Some(modules) = detect_module_header(lines) {
        return Some(ModuleSequence {
            modules,
            source: ModuleSource::Header,
        });
    }
    if max_tokens >= MIN_FALLBACK_TOKENS {
        return Some(ModuleSequence {
            modules: FALLBACK_MODULES.iter().map(|s| s.to_string()).collect(),
            source: ModuleSource::Fallback,
        });
    }
    None
}

/// Values of one row mapped onto stage columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageAssignment {
    pub values: StageValues,
    /// Stages the row marks MND.
    pub mnd: Vec<String>,
    /// Tokens beyond the last stage column.
    pub overflow: usize,
    /// Tokens that matched the value grammar but are not valid numbers.
    pub rejected: Vec<String>,
}

/// Map tokens to stages positionally. Missing trailing tokens leave their
/// stages unset; `MND` yields `None`.
pub fn assign_stages(modules: &[String], tokens: &[String]) -> StageAssignment {
    let mut out = StageAssignment {
        overflow: tokens.len().saturating_sub(modules.len()),
        ..StageAssignment::default()
    };

    for (stage, token) in modules.iter().zip(tokens) {
        if is_mnd(token) {
            out.values.insert(stage.clone(), None);
            out.mnd.push(stage.clone());
            continue;
        }
        match parse_number(token) {
            Ok(v) => {
                out.values.insert(stage.clone(), Some(v));
            }
            Err(_) => out.rejected.push(token.clone()),
        }
    }

    out
}

/// Position of a stage in the canonical life-cycle order; unknown stages sort last.
pub fn stage_rank(stage: &str) -> usize {
    CANONICAL_STAGES
        .iter()
        .position(|s| *s == stage)
        .unwrap_or(CANONICAL_STAGES.len())
}
