//! Building blocks shared by the layout parsers: per-set row extraction,
//! module declarations and assembly of the final record.

use crate::adapter::{reconcile_eci_mki, standard_set_of, to_impact_records};
use crate::indicators::{self, IndicatorMatcher};
use crate::model::{ModuleDeclaration, NormalizedEpd, ResultRow, SetType};
use crate::parsing::header::EpdHeader;
use crate::parsing::modules::{
    assign_stages, resolve_modules, stage_rank, ModuleSequence, ModuleSource,
};
use crate::parsing::rows::{max_token_count, tokenize, RowRecord};
use crate::parsing::section::{section_candidates, HeadingStyle, Section};
use crate::trace::{self, Diagnostics};

/// Rows found for one SBK set, or for a table without a set heading.
#[derive(Debug, Clone, Default)]
pub struct SetExtraction {
    pub rows: Vec<ResultRow>,
    pub modules: Option<ModuleSequence>,
    /// Stages marked MND by any row.
    pub mnd_stages: Vec<String>,
}

/// The first candidate section that contains indicator records.
pub fn first_populated<'a>(
    candidates: Vec<Section<'a>>,
    matcher: &IndicatorMatcher,
) -> Option<(Section<'a>, Vec<RowRecord>)> {
    candidates.into_iter().find_map(|section| {
        let records = tokenize(section.text, matcher);
        (!records.is_empty()).then_some((section, records))
    })
}

/// Locate the results table of `set` (heading styles tried in order) and
/// turn its records into rows.
pub fn extract_set(
    text: &str,
    set: u8,
    styles: &[HeadingStyle],
    cap: usize,
    diag: &mut Diagnostics,
) -> SetExtraction {
    let matcher = IndicatorMatcher::for_set(set);
    let set_type = SetType::from_set_number(set).unwrap_or_default();

    let found = styles
        .iter()
        .find_map(|style| first_populated(section_candidates(text, set, *style, cap), &matcher));
    let Some((section, records)) = found else {
        tracing::debug!(set, "no results section");
        diag.set(trace::section_key(set), trace::NONE);
        return SetExtraction::default();
    };

    tracing::debug!(
        set,
        start = section.start,
        len = section.text.len(),
        records = records.len(),
        "results section located"
    );
    diag.set(
        trace::section_key(set),
        section.text.chars().count().to_string(),
    );

    let extraction = rows_from_records(
        section.text,
        &records,
        |_| set_type,
        &format!("set {set}"),
        diag,
    );
    record_modules(diag, &trace::modules_key(set), &extraction);
    extraction
}

pub fn record_modules(diag: &mut Diagnostics, key: &str, extraction: &SetExtraction) {
    let value = extraction
        .modules
        .as_ref()
        .map_or_else(|| "unresolved".to_string(), ModuleSequence::describe);
    diag.set(key, value);
}

/// Map records onto stage columns.
///
/// The first record with values wins per (indicator, set); an earlier record
/// without values is replaced. Rows are skipped and reported when the stage
/// columns cannot be resolved.
pub fn rows_from_records(
    section: &str,
    records: &[RowRecord],
    set_of: impl Fn(&RowRecord) -> SetType,
    scope: &str,
    diag: &mut Diagnostics,
) -> SetExtraction {
    let lines: Vec<&str> = section
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let Some(modules) = resolve_modules(&lines, max_token_count(records)) else {
        for record in records.iter().filter(|r| !r.tokens.is_empty()) {
            diag.warn(format!(
                "{scope}: modules unresolved, skipped {} ({} values)",
                record.indicator,
                record.tokens.len()
            ));
        }
        return SetExtraction::default();
    };
    if modules.source == ModuleSource::Fallback {
        tracing::info!(scope, "no stage header, assuming fallback column order");
    }

    let mut rows: Vec<ResultRow> = Vec::new();
    let mut mnd_stages: Vec<String> = Vec::new();

    for record in records {
        let set_type = set_of(record);
        let existing = rows
            .iter()
            .position(|r| r.indicator == record.indicator && r.set_type == set_type);

        if let Some(idx) = existing {
            if !rows[idx].values.is_empty() || record.tokens.is_empty() {
                if !record.tokens.is_empty() {
                    diag.warn(format!(
                        "{scope}: duplicate {} row ignored",
                        record.indicator
                    ));
                }
                continue;
            }
        }

        let assignment = assign_stages(&modules.modules, &record.tokens);
        if assignment.overflow > 0 {
            diag.warn(format!(
                "{scope}: {} has {} values beyond {} stages",
                record.indicator,
                assignment.overflow,
                modules.modules.len()
            ));
        }
        for token in &assignment.rejected {
            diag.warn(format!(
                "{scope}: {} value '{token}' not a number",
                record.indicator
            ));
        }
        for stage in assignment.mnd {
            if !mnd_stages.contains(&stage) {
                mnd_stages.push(stage);
            }
        }

        let unit = if record.unit.is_empty() {
            indicators::default_unit(&record.indicator).map(String::from)
        } else {
            Some(record.unit.clone())
        };
        let row = ResultRow {
            indicator: record.indicator.clone(),
            unit,
            set_type,
            values: assignment.values,
        };
        match existing {
            Some(idx) => rows[idx] = row,
            None => rows.push(row),
        }
    }

    SetExtraction {
        rows: reconcile_eci_mki(rows),
        modules: Some(modules),
        mnd_stages,
    }
}

/// Stages declared by the sets that produced rows, in life-cycle order.
/// A stage marked MND anywhere is not declared.
pub fn module_declarations(sets: &[SetExtraction]) -> Vec<ModuleDeclaration> {
    let mut stages: Vec<&str> = Vec::new();
    for set in sets.iter().filter(|s| !s.rows.is_empty()) {
        for stage in set.modules.iter().flat_map(|m| m.modules.iter()) {
            if !stages.contains(&stage.as_str()) {
                stages.push(stage);
            }
        }
    }
    stages.sort_by_key(|s| stage_rank(s));

    stages
        .into_iter()
        .map(|stage| {
            let mnd = sets
                .iter()
                .any(|s| s.mnd_stages.iter().any(|m| m == stage));
            ModuleDeclaration {
                module: stage.to_string(),
                declared: !mnd,
                mnd: mnd.then_some(true),
            }
        })
        .collect()
}

/// Assemble the final record from header fields and per-set rows.
pub fn build_epd(header: EpdHeader, sets: Vec<SetExtraction>, mut diag: Diagnostics) -> NormalizedEpd {
    if header.valid_until_defaulted {
        diag.set(trace::VALID_UNTIL_DEFAULTED, "true");
    }

    let modules_declared = module_declarations(&sets);
    let results: Vec<ResultRow> = sets.into_iter().flat_map(|s| s.rows).collect();
    let impacts = to_impact_records(&results);
    let standard_set = standard_set_of(&results);

    NormalizedEpd {
        product_name: header.product_name,
        declared_unit: header.declared_unit,
        manufacturer: header.manufacturer,
        issue_date: header.issue_date,
        valid_until: header.valid_until,
        pcr: header.pcr,
        lca_standard: header.lca_standard,
        verified: header.verified,
        verifier: header.verifier,
        database: header.database,
        modules_declared,
        results,
        impacts,
        standard_set,
        raw_extract: diag.into_raw_extract(),
    }
}
