pub mod adapter;
pub mod config;
pub mod error;
pub mod indicators;
pub mod layouts;
pub mod model;
pub mod parsing;
pub mod registry;
pub mod trace;

use config::{validate_config, EngineConfig};
use error::EpdError;
use layouts::{Metadata, ParseContext};
use model::{LegacyExtract, NormalizedEpd};
use registry::ParserRegistry;

/// Main API entry point: extract a structured EPD record from linearized
/// document text using the built-in parsers and default settings.
///
/// Never fails; text the parsers do not understand yields a mostly empty
/// record whose `raw_extract` explains the parser choice.
pub fn parse_epd(text: &str) -> NormalizedEpd {
    let config = EngineConfig::default();
    let metadata = Metadata::new();
    ParserRegistry::default().parse(
        text,
        &ParseContext {
            config: &config,
            metadata: &metadata,
        },
    )
}

/// Like [`parse_epd`], with explicit settings and caller metadata.
///
/// Fails only on an invalid config or an unregistered default parser.
pub fn parse_epd_with(
    text: &str,
    config: &EngineConfig,
    metadata: &Metadata,
) -> Result<NormalizedEpd, EpdError> {
    validate_config(config)?;
    let registry = ParserRegistry::builtin(config)?;
    Ok(registry.parse(text, &ParseContext { config, metadata }))
}

/// [`parse_epd`] in the flat shape consumed by the save API.
pub fn parse_epd_legacy(text: &str) -> LegacyExtract {
    LegacyExtract::from(&parse_epd(text))
}
