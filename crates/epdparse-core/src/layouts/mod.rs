pub mod asphalt;
pub mod common;
pub mod pvc;

use crate::config::EngineConfig;
use crate::model::{NormalizedEpd, ParserMatch};
use std::collections::BTreeMap;

pub use asphalt::AsphaltEcochainParser;
pub use pvc::PvcEcochainParser;

/// Caller-supplied hints; copied into the diagnostics under `meta.`.
pub type Metadata = BTreeMap<String, String>;

/// Settings and hints shared by every parser during one parse call.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    pub config: &'a EngineConfig,
    pub metadata: &'a Metadata,
}

/// A parser for one family of EPD documents.
///
/// Both methods receive normalized text. `parse` is total: a document the
/// parser does not understand yields a mostly empty record, never an error.
pub trait LayoutParser: Send + Sync {
    /// Stable identifier, reported as `parserId`.
    fn id(&self) -> &str;

    /// How confident this parser is that it understands `text`.
    fn score(&self, text: &str) -> ParserMatch;

    fn parse(&self, text: &str, ctx: &ParseContext<'_>) -> NormalizedEpd;
}
