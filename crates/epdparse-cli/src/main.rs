mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "epdparse",
    version,
    about = "Extract structured data from Dutch EPD documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse linearized EPD text into a structured record
    Parse {
        /// Path to a text file extracted from the EPD PDF ("-" for stdin)
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write parsed output to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Emit the flat legacy record instead of the normalized one
        #[arg(long)]
        legacy: bool,

        /// JSON engine config
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Force a layout parser instead of scoring (see `epdparse parsers`)
        #[arg(short, long, value_name = "ID")]
        parser: Option<String>,

        /// Caller metadata copied into rawExtract as meta.KEY
        #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_meta)]
        meta: Vec<(String, String)>,
    },
    /// Show how every layout parser scores a document
    Score {
        /// Path to a text file extracted from the EPD PDF ("-" for stdin)
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// JSON engine config
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// List the registered layout parsers
    Parsers {
        /// JSON engine config
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn parse_meta(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            input_file,
            output,
            out,
            legacy,
            config,
            parser,
            meta,
        } => commands::parse::run(commands::parse::ParseArgs {
            input_file,
            output_format: output,
            output_file: out,
            legacy,
            config,
            parser,
            meta,
        }),
        Commands::Score {
            input_file,
            output,
            config,
        } => commands::score::run(input_file, &output, config),
        Commands::Parsers { config } => commands::parsers::run(config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
