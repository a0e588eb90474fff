use epdparse_core::error::EpdError;
use epdparse_core::registry::ParserRegistry;
use std::path::PathBuf;

use crate::commands::engine_config;

pub fn run(config: Option<PathBuf>) -> Result<(), EpdError> {
    let config = engine_config(config)?;
    let registry = ParserRegistry::builtin(&config)?;

    println!("Registered layout parsers (scored in this order):\n");
    for id in registry.ids() {
        let marker = if id == registry.default_id() {
            "  (default)"
        } else {
            ""
        };
        println!("  {id}{marker}");
    }
    Ok(())
}
