pub mod parse;
pub mod parsers;
pub mod score;

use epdparse_core::config::{load_config, EngineConfig};
use epdparse_core::error::EpdError;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Document text from a file, or stdin for `-`.
pub fn read_input(path: &Path) -> Result<String, EpdError> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    Ok(std::fs::read_to_string(path)?)
}

pub fn engine_config(path: Option<PathBuf>) -> Result<EngineConfig, EpdError> {
    match path {
        Some(p) => load_config(&p),
        None => Ok(EngineConfig::default()),
    }
}
