//! Scoring candidate layout parsers and running the best one.

use crate::config::EngineConfig;
use crate::error::EpdError;
use crate::layouts::{
    AsphaltEcochainParser, LayoutParser, Metadata, ParseContext, PvcEcochainParser,
};
use crate::model::{NormalizedEpd, RawExtract};
use crate::parsing::normalize::normalize_text;
use crate::trace::{self, format_score_trace, ParserScore};

/// Registered layout parsers, in registration order, plus the fallback.
pub struct ParserRegistry {
    parsers: Vec<Box<dyn LayoutParser>>,
    default_index: usize,
}

/// Outcome of scoring every registered parser against one document.
pub struct Selection<'a> {
    pub parser: &'a dyn LayoutParser,
    /// One entry per registered parser, in registration order.
    pub scores: Vec<ParserScore>,
    /// True when no parser scored above zero and the default was used.
    pub fallback: bool,
}

impl ParserRegistry {
    /// A registry whose fallback is `default`.
    pub fn new(default: Box<dyn LayoutParser>) -> Self {
        ParserRegistry {
            parsers: vec![default],
            default_index: 0,
        }
    }

    /// The built-in parsers (asphalt first, then PVC) with the configured fallback.
    pub fn builtin(config: &EngineConfig) -> Result<Self, EpdError> {
        let mut registry = ParserRegistry::default();
        registry.set_default(&config.default_parser)?;
        Ok(registry)
    }

    pub fn register(&mut self, parser: Box<dyn LayoutParser>) -> &mut Self {
        self.parsers.push(parser);
        self
    }

    pub fn set_default(&mut self, id: &str) -> Result<(), EpdError> {
        self.default_index = self.index_of(id)?;
        Ok(())
    }

    pub fn ids(&self) -> Vec<&str> {
        self.parsers.iter().map(|p| p.id()).collect()
    }

    pub fn default_id(&self) -> &str {
        self.parsers[self.default_index].id()
    }

    pub fn get(&self, id: &str) -> Option<&dyn LayoutParser> {
        self.parsers
            .iter()
            .find(|p| p.id() == id)
            .map(|p| p.as_ref())
    }

    fn index_of(&self, id: &str) -> Result<usize, EpdError> {
        self.parsers
            .iter()
            .position(|p| p.id() == id)
            .ok_or_else(|| EpdError::UnknownParser {
                id: id.to_string(),
                registered: self.ids().join(", "),
            })
    }

    fn scores(&self, text: &str) -> Vec<ParserScore> {
        self.parsers
            .iter()
            .map(|p| {
                let m = p.score(text);
                tracing::debug!(parser = p.id(), score = m.score, reason = ?m.reason, "parser scored");
                ParserScore {
                    parser_id: p.id().to_string(),
                    score: m.score,
                    reason: m.reason,
                }
            })
            .collect()
    }

    /// Score every parser and pick the highest. The first registered parser
    /// wins a tie; the default parser is used when every score is zero.
    pub fn select(&self, text: &str) -> Selection<'_> {
        let scores = self.scores(text);

        let mut best: Option<usize> = None;
        for (i, s) in scores.iter().enumerate() {
            if s.score > 0.0 && best.map_or(true, |b| s.score > scores[b].score) {
                best = Some(i);
            }
        }

        let fallback = best.is_none();
        let index = best.unwrap_or(self.default_index);
        let parser = self.parsers[index].as_ref();
        if fallback {
            tracing::info!(parser = parser.id(), "no parser matched, using default");
        } else {
            tracing::info!(parser = parser.id(), score = scores[index].score, "parser selected");
        }

        Selection {
            parser,
            scores,
            fallback,
        }
    }

    /// Normalize `text`, select a parser and run it. Never fails.
    pub fn parse(&self, text: &str, ctx: &ParseContext<'_>) -> NormalizedEpd {
        let normalized = normalize_text(text);
        let selection = self.select(&normalized);
        let mut epd = selection.parser.parse(&normalized, ctx);
        attach_selection(
            &mut epd.raw_extract,
            selection.parser.id(),
            &selection.scores,
            selection.fallback,
            ctx.metadata,
        );
        epd
    }

    /// Run the parser registered as `id`, regardless of scores.
    pub fn parse_with(
        &self,
        id: &str,
        text: &str,
        ctx: &ParseContext<'_>,
    ) -> Result<NormalizedEpd, EpdError> {
        let parser = self.parsers[self.index_of(id)?].as_ref();
        let normalized = normalize_text(text);
        let scores = self.scores(&normalized);
        let mut epd = parser.parse(&normalized, ctx);
        attach_selection(&mut epd.raw_extract, parser.id(), &scores, false, ctx.metadata);
        Ok(epd)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        let mut registry = ParserRegistry::new(Box::new(AsphaltEcochainParser::new()));
        registry.register(Box::new(PvcEcochainParser::new()));
        registry
    }
}

fn attach_selection(
    raw: &mut RawExtract,
    parser_id: &str,
    scores: &[ParserScore],
    fallback: bool,
    metadata: &Metadata,
) {
    raw.insert(trace::PARSER_ID.to_string(), parser_id.to_string());
    raw.insert(trace::PARSER_SCORES.to_string(), format_score_trace(scores));
    raw.insert(trace::PARSER_FALLBACK.to_string(), fallback.to_string());
    for (key, value) in metadata {
        raw.insert(format!("{}{key}", trace::META_PREFIX), value.clone());
    }
}
