use epdparse_core::error::EpdError;
use epdparse_core::layouts::{Metadata, ParseContext};
use epdparse_core::model::{LegacyExtract, NormalizedEpd};
use epdparse_core::registry::ParserRegistry;
use epdparse_core::trace;
use std::path::{Path, PathBuf};

use crate::commands::{engine_config, read_input};
use crate::output;

pub struct ParseArgs {
    pub input_file: PathBuf,
    pub output_format: String,
    pub output_file: Option<PathBuf>,
    pub legacy: bool,
    pub config: Option<PathBuf>,
    pub parser: Option<String>,
    pub meta: Vec<(String, String)>,
}

pub fn run(args: ParseArgs) -> Result<(), EpdError> {
    let text = read_input(&args.input_file)?;
    let config = engine_config(args.config)?;
    let registry = ParserRegistry::builtin(&config)?;
    let metadata = metadata(&args.input_file, args.meta);
    let ctx = ParseContext {
        config: &config,
        metadata: &metadata,
    };

    let epd = match &args.parser {
        Some(id) => registry.parse_with(id, &text, &ctx)?,
        None => registry.parse(&text, &ctx),
    };
    tracing::info!(
        parser = epd.raw_extract.get(trace::PARSER_ID).map(String::as_str).unwrap_or("-"),
        rows = epd.results.len(),
        "parsed {}",
        args.input_file.display()
    );
    let legacy = args.legacy.then(|| LegacyExtract::from(&epd));

    match args.output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = match &legacy {
                Some(l) => output::json::legacy(l)?,
                None => output::json::epd(&epd)?,
            };
            std::fs::write(&path, json)?;
            eprintln!(
                "Parsed {} result row(s) with {}, written to {}",
                epd.results.len(),
                epd.raw_extract
                    .get(trace::PARSER_ID)
                    .map_or("unknown parser", String::as_str),
                path.display()
            );
            for w in warnings(&epd) {
                eprintln!("  warning: {w}");
            }
        }
        None => {
            let output_str = match (args.output_format.as_str(), &legacy) {
                ("json", Some(l)) => output::json::legacy(l)?,
                ("json", None) => output::json::epd(&epd)?,
                (_, Some(l)) => output::table::format_legacy(l),
                (_, None) => output::table::format_epd(&epd),
            };
            println!("{output_str}");
        }
    }

    Ok(())
}

/// The input file name, overridden or extended by `--meta` pairs.
fn metadata(input: &Path, pairs: Vec<(String, String)>) -> Metadata {
    let mut metadata = Metadata::new();
    if input != Path::new("-") {
        if let Some(name) = input.file_name() {
            metadata.insert("fileName".into(), name.to_string_lossy().into_owned());
        }
    }
    metadata.extend(pairs);
    metadata
}

fn warnings(epd: &NormalizedEpd) -> Vec<&str> {
    epd.raw_extract
        .get(trace::WARNINGS)
        .map(|w| w.split("; ").collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_file_name_and_overrides() {
        let meta = metadata(
            Path::new("/tmp/ac16.txt"),
            vec![("supplier".into(), "BAM".into())],
        );
        assert_eq!(meta["fileName"], "ac16.txt");
        assert_eq!(meta["supplier"], "BAM");

        let meta = metadata(
            Path::new("/tmp/ac16.txt"),
            vec![("fileName".into(), "ac16.pdf".into())],
        );
        assert_eq!(meta["fileName"], "ac16.pdf");

        assert!(metadata(Path::new("-"), vec![]).is_empty());
    }

    #[test]
    fn test_warnings_split() {
        let mut epd = NormalizedEpd::default();
        assert!(warnings(&epd).is_empty());
        epd.raw_extract
            .insert(trace::WARNINGS.into(), "a; b".into());
        assert_eq!(warnings(&epd), vec!["a", "b"]);
    }
}
