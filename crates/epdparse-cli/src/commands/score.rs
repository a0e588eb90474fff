use epdparse_core::error::EpdError;
use epdparse_core::parsing::normalize::normalize_text;
use epdparse_core::registry::ParserRegistry;
use std::path::PathBuf;

use crate::commands::{engine_config, read_input};
use crate::output;

pub fn run(
    input_file: PathBuf,
    output_format: &str,
    config: Option<PathBuf>,
) -> Result<(), EpdError> {
    let text = read_input(&input_file)?;
    let config = engine_config(config)?;
    let registry = ParserRegistry::builtin(&config)?;

    let normalized = normalize_text(&text);
    let selection = registry.select(&normalized);

    match output_format {
        "json" => println!("{}", output::json::selection(&selection)?),
        _ => println!("{}", output::table::format_selection(&selection)),
    }
    Ok(())
}
