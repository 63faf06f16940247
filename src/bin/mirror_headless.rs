//! Mirrorterm Headless Runner
//!
//! Feeds a byte stream into a terminal model and prints the resulting
//! screen state, either as text, as a JSON snapshot, or as the byte stream
//! that would repaint it on a real terminal.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mirrorterm::{CompleteTerminal, Config, Display, Error, Snapshot};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Terminal size given on the command line as `<cols>x<rows>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Size {
    cols: usize,
    rows: usize,
}

/// CLI arguments for the headless runner
#[derive(Parser, Debug)]
#[command(name = "mirror-headless")]
#[command(version)]
#[command(about = "Feed a byte stream into a terminal model and print the screen", long_about = None)]
#[command(after_help = "If no input file is specified, reads from stdin.\n\n\
Examples:\n  \
printf 'Hello\\033[31mWorld\\033[0m' | mirror-headless\n  \
mirror-headless --size 120x40 session.log\n  \
mirror-headless --render session.log > /dev/tty")]
struct CliArgs {
    /// Load settings from a JSON file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Terminal size, overriding the configuration
    #[arg(short, long, value_name = "COLSxROWS", value_parser = parse_size)]
    size: Option<Size>,

    /// Output the snapshot as JSON
    #[arg(short, long, conflicts_with = "render")]
    json: bool,

    /// Output the bytes that repaint the screen
    #[arg(long)]
    render: bool,

    /// Byte stream to replay
    #[arg(value_name = "INPUT_FILE")]
    input: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
    Render,
}

impl CliArgs {
    fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.render {
            OutputFormat::Render
        } else {
            OutputFormat::Text
        }
    }
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            },
        },
        None => Config::default(),
    };
    if let Some(size) = args.size {
        config.cols = size.cols;
        config.rows = size.rows;
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(&config, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}

fn run(config: &Config, args: &CliArgs) -> mirrorterm::Result<()> {
    config.validate()?;

    let input_data = match &args.input {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut data = Vec::new();
            io::stdin().read_to_end(&mut data)?;
            data
        },
    };

    let mut terminal = CompleteTerminal::new(config.cols, config.rows);
    let replies = terminal.act(&input_data);
    if !replies.is_empty() {
        tracing::info!("terminal produced {} reply bytes", replies.len());
    }

    let fb = terminal.framebuffer();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output_format() {
        OutputFormat::Text => {
            let snapshot = Snapshot::from_framebuffer(fb);
            writeln!(out, "Terminal State ({}x{}):", snapshot.cols, snapshot.rows)?;
            writeln!(
                out,
                "Cursor: ({}, {})",
                snapshot.cursor.row, snapshot.cursor.col
            )?;
            if !snapshot.title.is_empty() {
                writeln!(out, "Title: {}", snapshot.title)?;
            }
            writeln!(out, "---")?;
            writeln!(out, "{}", snapshot.to_text())?;
            writeln!(out, "---")?;
        },
        OutputFormat::Json => {
            let json = Snapshot::from_framebuffer(fb).to_json()?;
            writeln!(out, "{}", json)?;
        },
        OutputFormat::Render => {
            let display = Display::new(false);
            out.write_all(&display.new_frame(false, fb, fb))?;
        },
    }
    out.flush().map_err(Error::from)
}

fn parse_size(size: &str) -> Result<Size, String> {
    let invalid = || format!("invalid size '{}', expected <cols>x<rows>", size);
    let (cols, rows) = size.split_once('x').ok_or_else(invalid)?;
    let cols: usize = cols.parse().map_err(|_| invalid())?;
    let rows: usize = rows.parse().map_err(|_| invalid())?;
    if cols == 0 || rows == 0 {
        return Err(format!("invalid size '{}', both dimensions must be positive", size));
    }
    Ok(Size { cols, rows })
}
