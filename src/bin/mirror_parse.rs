//! Mirrorterm Parse Tool
//!
//! Prints the actions the parser produces for a byte stream, one per line.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as _;
use mirrorterm::{Action, Parser};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// CLI arguments for the parse tool
#[derive(clap::Parser, Debug)]
#[command(name = "mirror-parse")]
#[command(version)]
#[command(about = "Print one line per parsed action", long_about = None)]
#[command(after_help = "Reads stdin when no file is given.")]
struct CliArgs {
    /// Byte stream to parse
    #[arg(value_name = "INPUT_FILE")]
    input: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let input_data = match &args.input {
        Some(path) => match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            },
        },
        None => {
            let mut data = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut data) {
                eprintln!("Error reading stdin: {}", e);
                return ExitCode::FAILURE;
            }
            data
        },
    };

    let mut parser = Parser::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for action in parser.parse(&input_data) {
        if action == Action::Ignore {
            continue;
        }
        if let Err(e) = writeln!(out, "{:?}", action) {
            eprintln!("Error writing output: {}", e);
            return ExitCode::FAILURE;
        }
    }
    if !parser.is_ground() {
        tracing::debug!("input ended inside {:?}", parser.state());
    }

    ExitCode::SUCCESS
}
