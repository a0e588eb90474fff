use epdparse_core::error::EpdError;
use epdparse_core::model::{LegacyExtract, NormalizedEpd};
use epdparse_core::registry::Selection;
use serde_json::json;

pub fn epd(epd: &NormalizedEpd) -> Result<String, EpdError> {
    Ok(serde_json::to_string_pretty(epd)?)
}

pub fn legacy(legacy: &LegacyExtract) -> Result<String, EpdError> {
    Ok(serde_json::to_string_pretty(legacy)?)
}

pub fn selection(selection: &Selection<'_>) -> Result<String, EpdError> {
    let value = json!({
        "selected": selection.parser.id(),
        "fallback": selection.fallback,
        "scores": selection.scores,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}
