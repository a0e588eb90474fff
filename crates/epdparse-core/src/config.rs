//! Engine configuration, loaded from JSON.

use crate::error::EpdError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PARSER: &str = "asphalt-ecochain";
pub const DEFAULT_VALIDITY_YEARS: u32 = 5;

const VALIDITY_YEARS_RANGE: std::ops::RangeInclusive<u32> = 1..=25;
const SECTION_MAX_CHARS_RANGE: std::ops::RangeInclusive<usize> = 1_000..=50_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Parser used when no registered parser reports a positive score.
    pub default_parser: String,
    /// Validity window applied when a document states only a publication date.
    pub validity_years: u32,
    /// Overrides every layout's own results-section length cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_max_chars: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_parser: DEFAULT_PARSER.to_string(),
            validity_years: DEFAULT_VALIDITY_YEARS,
            section_max_chars: None,
        }
    }
}

impl EngineConfig {
    /// The configured cap, or the layout's own.
    pub fn section_cap(&self, layout_default: usize) -> usize {
        self.section_max_chars.unwrap_or(layout_default)
    }
}

/// Load a config from a JSON file.
pub fn load_config(path: &Path) -> Result<EngineConfig, EpdError> {
    let content = std::fs::read_to_string(path).map_err(|e| EpdError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let config: EngineConfig =
        serde_json::from_str(&content).map_err(|e| EpdError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse a config from a JSON string (no file path context).
pub fn parse_config_str(json: &str) -> Result<EngineConfig, EpdError> {
    let config: EngineConfig = serde_json::from_str(json)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &EngineConfig) -> Result<(), EpdError> {
    if config.default_parser.trim().is_empty() {
        return Err(EpdError::ConfigInvalid(
            "default_parser must not be empty".into(),
        ));
    }

    if !VALIDITY_YEARS_RANGE.contains(&config.validity_years) {
        return Err(EpdError::ConfigInvalid(format!(
            "validity_years {} outside {}..={}",
            config.validity_years,
            VALIDITY_YEARS_RANGE.start(),
            VALIDITY_YEARS_RANGE.end()
        )));
    }

    if let Some(cap) = config.section_max_chars {
        if !SECTION_MAX_CHARS_RANGE.contains(&cap) {
            return Err(EpdError::ConfigInvalid(format!(
                "section_max_chars {} outside {}..={}",
                cap,
                SECTION_MAX_CHARS_RANGE.start(),
                SECTION_MAX_CHARS_RANGE.end()
            )));
        }
    }

    Ok(())
}
