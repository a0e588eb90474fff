use epdparse_core::model::{LegacyExtract, NormalizedEpd, ResultRow, SetType};
use epdparse_core::parsing::modules::stage_rank;
use epdparse_core::registry::Selection;
use epdparse_core::trace;

const SETS: [SetType; 3] = [SetType::SbkSet1, SetType::SbkSet2, SetType::Unknown];

pub fn format_epd(epd: &NormalizedEpd) -> String {
    let mut lines = Vec::new();

    field(&mut lines, "Product", epd.product_name.as_deref());
    field(&mut lines, "Declared unit", epd.declared_unit.as_deref());
    field(&mut lines, "Manufacturer", epd.manufacturer.as_deref());
    field(&mut lines, "Issued", epd.issue_date.as_deref());
    let valid_until = match (&epd.valid_until, epd.raw_extract.get(trace::VALID_UNTIL_DEFAULTED)) {
        (Some(v), Some(_)) => Some(format!("{v} (assumed)")),
        (v, _) => v.clone(),
    };
    field(&mut lines, "Valid until", valid_until.as_deref());
    field(
        &mut lines,
        "PCR",
        epd.pcr.as_ref().map(|p| p.to_string()).as_deref(),
    );
    field(&mut lines, "LCA standard", epd.lca_standard.as_deref());
    field(
        &mut lines,
        "Database",
        epd.database.as_ref().map(|d| d.label.as_str()),
    );
    field(
        &mut lines,
        "Verified",
        Some(match (epd.verified, &epd.verifier) {
            (true, Some(v)) => format!("yes ({v})"),
            (true, None) => "yes".to_string(),
            (false, _) => "no".to_string(),
        })
        .as_deref(),
    );
    field(&mut lines, "Standard set", Some(epd.standard_set.to_string()).as_deref());
    field(
        &mut lines,
        "Parser",
        epd.raw_extract.get(trace::PARSER_ID).map(String::as_str),
    );

    if !epd.modules_declared.is_empty() {
        let modules: Vec<String> = epd
            .modules_declared
            .iter()
            .map(|m| {
                if m.declared {
                    m.module.clone()
                } else {
                    format!("{} (MND)", m.module)
                }
            })
            .collect();
        field(&mut lines, "Modules", Some(modules.join(", ").as_str()));
    }

    for set in SETS {
        let rows: Vec<&ResultRow> = epd.results.iter().filter(|r| r.set_type == set).collect();
        if rows.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("=== {set} ==="));
        lines.push(String::new());
        lines.extend(results_table(&rows));
    }

    if epd.results.is_empty() {
        lines.push(String::new());
        lines.push("  No result rows found.".to_string());
    }

    if let Some(warnings) = epd.raw_extract.get(trace::WARNINGS) {
        lines.push(String::new());
        for w in warnings.split("; ") {
            lines.push(format!("  warning: {w}"));
        }
    }

    lines.join("\n")
}

pub fn format_legacy(legacy: &LegacyExtract) -> String {
    let mut lines = Vec::new();

    field(&mut lines, "Product", legacy.product_name.as_deref());
    field(&mut lines, "Functional unit", legacy.functional_unit.as_deref());
    field(&mut lines, "Producer", legacy.producer.as_deref());
    field(&mut lines, "Published", legacy.publication_date.as_deref());
    field(&mut lines, "Expires", legacy.expiration_date.as_deref());
    field(&mut lines, "PCR", legacy.pcr_version.as_deref());
    field(&mut lines, "Database", legacy.database_version.as_deref());
    field(&mut lines, "LCA method", legacy.lca_method.as_deref());
    field(
        &mut lines,
        "Standard set",
        Some(legacy.standard_set.to_string()).as_deref(),
    );

    lines.push(String::new());
    let width = legacy
        .impacts
        .iter()
        .map(|i| i.indicator.len())
        .max()
        .unwrap_or(10);
    for impact in &legacy.impacts {
        lines.push(format!(
            "  {:<width$}  {:<9}  {:<6}  {} {}",
            impact.indicator,
            impact.set_type.to_string(),
            impact.stage,
            impact.value.normalize(),
            impact.unit.as_deref().unwrap_or(""),
            width = width
        ));
    }

    lines.join("\n")
}

pub fn format_selection(selection: &Selection<'_>) -> String {
    let width = selection
        .scores
        .iter()
        .map(|s| s.parser_id.len())
        .max()
        .unwrap_or(10);

    let mut lines: Vec<String> = selection
        .scores
        .iter()
        .map(|s| {
            let marker = if s.parser_id == selection.parser.id() {
                "  <- selected"
            } else {
                ""
            };
            format!(
                "  {:<width$}  {:.2}  {}{}",
                s.parser_id,
                s.score,
                s.reason.as_deref().unwrap_or(""),
                marker,
                width = width
            )
        })
        .collect();

    if selection.fallback {
        lines.push(String::new());
        lines.push(format!(
            "  No parser matched; default {} would be used.",
            selection.parser.id()
        ));
    }
    lines.join("\n")
}

fn field(lines: &mut Vec<String>, label: &str, value: Option<&str>) {
    lines.push(format!("  {:<14} {}", format!("{label}:"), value.unwrap_or("-")));
}

/// One line per indicator; stage columns in life-cycle order.
fn results_table(rows: &[&ResultRow]) -> Vec<String> {
    let mut stages: Vec<&str> = Vec::new();
    for row in rows {
        for stage in row.values.keys() {
            if !stages.contains(&stage.as_str()) {
                stages.push(stage);
            }
        }
    }
    stages.sort_by_key(|s| stage_rank(s));

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            stages
                .iter()
                .map(|stage| match row.values.get(*stage) {
                    Some(Some(v)) => v.normalize().to_string(),
                    Some(None) => "MND".to_string(),
                    None => "-".to_string(),
                })
                .collect()
        })
        .collect();

    let name_width = rows.iter().map(|r| r.indicator.len()).max().unwrap_or(9).max(9);
    let unit_width = rows
        .iter()
        .map(|r| r.unit.as_deref().unwrap_or("").len())
        .max()
        .unwrap_or(4)
        .max(4);
    let col_widths: Vec<usize> = stages
        .iter()
        .enumerate()
        .map(|(i, stage)| {
            cells
                .iter()
                .map(|c| c[i].len())
                .max()
                .unwrap_or(0)
                .max(stage.len())
        })
        .collect();

    let mut header = format!(
        "  {:<name_width$}  {:<unit_width$}",
        "Indicator",
        "Unit",
        name_width = name_width,
        unit_width = unit_width
    );
    for (stage, w) in stages.iter().zip(&col_widths) {
        header.push_str(&format!("  {:>w$}", stage, w = *w));
    }

    let mut lines = vec![header.trim_end().to_string()];
    for (row, row_cells) in rows.iter().zip(&cells) {
        let mut line = format!(
            "  {:<name_width$}  {:<unit_width$}",
            row.indicator,
            row.unit.as_deref().unwrap_or(""),
            name_width = name_width,
            unit_width = unit_width
        );
        for (cell, w) in row_cells.iter().zip(&col_widths) {
            line.push_str(&format!("  {:>w$}", cell, w = *w));
        }
        lines.push(line.trim_end().to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "Productnaam: Asfalt AC 16 Surf
Datum van publicatie: 01-01-2022
PCR: NL-PCR Asfalt versie 1.0
Resultaten SBK set 1
Indicator Eenheid A1 A2 A3 D
GWP kg CO2 eq 1,0E+0 2,0E+0 3,0E+0 MND
Ecochain Technologies";

    #[test]
    fn test_format_epd_lists_fields_and_rows() {
        let epd = epdparse_core::parse_epd(DOC);
        let out = format_epd(&epd);
        let product = out.lines().find(|l| l.contains("Product:")).unwrap();
        assert!(product.ends_with("Asfalt AC 16 Surf"));
        assert!(out.contains("2027-01-01 (assumed)"));
        assert!(out.contains("=== SBK_SET_1 ==="));
        assert!(out.contains("D (MND)"));
        let gwp = out.lines().find(|l| l.trim_start().starts_with("GWP")).unwrap();
        assert!(gwp.contains("kg CO2 eq"));
        assert!(gwp.ends_with("MND"));
    }

    #[test]
    fn test_format_epd_without_rows() {
        let out = format_epd(&epdparse_core::parse_epd(""));
        assert!(out.contains("No result rows found."));
        let product = out.lines().find(|l| l.contains("Product:")).unwrap();
        assert!(product.ends_with('-'));
    }

    #[test]
    fn test_format_legacy_impacts() {
        let legacy = epdparse_core::parse_epd_legacy(DOC);
        let out = format_legacy(&legacy);
        assert!(out.contains("Functional unit:"));
        assert_eq!(out.lines().filter(|l| l.starts_with("  GWP")).count(), 3);
    }

    #[test]
    fn test_format_selection_marks_choice() {
        let registry = epdparse_core::registry::ParserRegistry::default();
        let selection = registry.select("PVC U3 buis\nEcochain v3.1");
        let out = format_selection(&selection);
        let pvc = out.lines().find(|l| l.contains("pvc-ecochain")).unwrap();
        assert!(pvc.ends_with("<- selected"));
        assert!(!out.contains("No parser matched"));
    }
}
