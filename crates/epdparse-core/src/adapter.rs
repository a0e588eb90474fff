//! Conversions between the flat legacy impact list and grouped result rows,
//! and the ECI/MKI alias rule both shapes share.

use crate::model::{
    ImpactRecord, LegacyExtract, ModuleDeclaration, NormalizedEpd, ResultRow, SetType,
};
use crate::parsing::modules::stage_rank;
use crate::parsing::references::{parse_database, parse_pcr};
use std::collections::BTreeMap;

pub const MKI: &str = "MKI";
pub const ECI: &str = "ECI";

/// Expand grouped rows into one record per stage that has a number.
/// MND stages carry no number and produce no record.
pub fn to_impact_records(rows: &[ResultRow]) -> Vec<ImpactRecord> {
    rows.iter()
        .flat_map(|row| {
            row.values.iter().filter_map(move |(stage, value)| {
                value.map(|value| ImpactRecord {
                    indicator: row.indicator.clone(),
                    set_type: row.set_type,
                    stage: stage.clone(),
                    value,
                    unit: row.unit.clone(),
                })
            })
        })
        .collect()
}

/// Group flat records by (indicator, set), in first-seen order.
///
/// The first non-empty unit of a group wins, as does the first value seen for
/// a stage.
pub fn to_result_rows(records: &[ImpactRecord]) -> Vec<ResultRow> {
    let mut rows: Vec<ResultRow> = Vec::new();

    for record in records {
        let idx = match rows
            .iter()
            .position(|r| r.indicator == record.indicator && r.set_type == record.set_type)
        {
            Some(idx) => idx,
            None => {
                rows.push(ResultRow::new(record.indicator.clone(), record.set_type));
                rows.len() - 1
            }
        };
        let row = &mut rows[idx];

        if row.unit.is_none() {
            row.unit = record.unit.clone().filter(|u| !u.trim().is_empty());
        }
        row.values
            .entry(record.stage.clone())
            .or_insert(Some(record.value));
    }

    rows
}

/// Apply the ECI/MKI alias rule within each set.
///
/// - An ECI row with values becomes the MKI row; a separate MKI row is dropped.
/// - Otherwise an MKI row is kept and also emitted as ECI; an empty ECI row is
///   replaced by that alias.
pub fn reconcile_eci_mki(rows: Vec<ResultRow>) -> Vec<ResultRow> {
    let mut sets: Vec<SetType> = Vec::new();
    for row in &rows {
        if !sets.contains(&row.set_type) {
            sets.push(row.set_type);
        }
    }

    let mut rows = rows;
    for set in sets {
        rows = reconcile_set(rows, set);
    }
    rows
}

fn reconcile_set(mut rows: Vec<ResultRow>, set: SetType) -> Vec<ResultRow> {
    let find = |rows: &[ResultRow], code: &str| {
        rows.iter()
            .position(|r| r.set_type == set && r.indicator == code)
    };

    let eci = find(&rows, ECI);
    let mki = find(&rows, MKI);

    match (eci, mki) {
        (Some(e), mki) if rows[e].has_values() => {
            let mki_unit = mki.and_then(|m| rows[m].unit.clone());
            let row = &mut rows[e];
            row.indicator = MKI.to_string();
            if row.unit.is_none() {
                row.unit = mki_unit;
            }
            if let Some(m) = mki {
                rows.remove(m);
            }
        }
        (eci, Some(m)) => {
            let mut alias = rows[m].clone();
            alias.indicator = ECI.to_string();
            match eci {
                Some(e) => rows[e] = alias,
                None => rows.insert(m + 1, alias),
            }
        }
        (_, None) => {}
    }

    rows
}

/// Stages present across `rows`, in life-cycle order. A stage whose every
/// value is MND is not declared.
pub fn infer_modules(rows: &[ResultRow]) -> Vec<ModuleDeclaration> {
    let mut any_number: BTreeMap<&str, bool> = BTreeMap::new();
    for row in rows {
        for (stage, value) in &row.values {
            let entry = any_number.entry(stage.as_str()).or_insert(false);
            *entry |= value.is_some();
        }
    }

    let mut stages: Vec<(&str, bool)> = any_number.into_iter().collect();
    stages.sort_by(|a, b| stage_rank(a.0).cmp(&stage_rank(b.0)).then_with(|| a.0.cmp(b.0)));

    stages
        .into_iter()
        .map(|(stage, has_number)| ModuleDeclaration {
            module: stage.to_string(),
            declared: has_number,
            mnd: (!has_number).then_some(true),
        })
        .collect()
}

/// Combined set of all rows; `Unknown` when there are none.
pub fn standard_set_of(rows: &[ResultRow]) -> SetType {
    rows.iter()
        .map(|r| r.set_type)
        .fold(SetType::Unknown, SetType::combine)
}

impl From<&NormalizedEpd> for LegacyExtract {
    fn from(epd: &NormalizedEpd) -> Self {
        LegacyExtract {
            product_name: epd.product_name.clone(),
            functional_unit: epd.declared_unit.clone(),
            producer: epd.manufacturer.clone(),
            publication_date: epd.issue_date.clone(),
            expiration_date: epd.valid_until.clone(),
            pcr_version: epd.pcr.as_ref().map(|p| p.to_string()),
            database_version: epd.database.as_ref().map(|d| d.label.clone()),
            lca_method: epd.lca_standard.clone(),
            verified: epd.verified,
            verifier: epd.verifier.clone(),
            standard_set: epd.standard_set,
            impacts: epd.impacts.clone(),
            raw_extract: epd.raw_extract.clone(),
        }
    }
}

/// Rebuild the canonical record from the legacy flat shape.
pub fn normalize_legacy(legacy: &LegacyExtract) -> NormalizedEpd {
    let results = reconcile_eci_mki(to_result_rows(&legacy.impacts));
    let standard_set = match legacy.standard_set {
        SetType::Unknown => standard_set_of(&results),
        declared => declared,
    };

    NormalizedEpd {
        product_name: legacy.product_name.clone(),
        declared_unit: legacy.functional_unit.clone(),
        manufacturer: legacy.producer.clone(),
        issue_date: legacy.publication_date.clone(),
        valid_until: legacy.expiration_date.clone(),
        pcr: legacy.pcr_version.as_deref().map(parse_pcr),
        lca_standard: legacy.lca_method.clone(),
        verified: legacy.verified,
        verifier: legacy.verifier.clone(),
        database: legacy
            .database_version
            .as_deref()
            .and_then(|d| parse_database(Some(d), None)),
        modules_declared: infer_modules(&results),
        impacts: to_impact_records(&results),
        results,
        standard_set,
        raw_extract: legacy.raw_extract.clone(),
    }
}
