//! fuzzy-lookup: match every value of one CSV column against another.
//!
//! Reads a source and a target column, scores every pairing with the
//! token-sort ratio and writes the pairs at or above the threshold, best
//! first, to a CSV file.

use clap::{ArgAction, Parser, ValueEnum};
use fuzzy_lookup_cli::output::Status;
use fuzzy_lookup_core::config::{ColumnSelector, Config};
use fuzzy_lookup_core::error::exit_codes;
use fuzzy_lookup_core::Error;
use fuzzy_lookup_search::CancellationToken;
use fuzzy_lookup_telemetry::TelemetryConfig;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;

mod report;
mod run;

/// Fuzzy lookup of one CSV column against another
#[derive(Parser, Debug)]
#[command(name = "fuzzy-lookup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to .fuzzy-lookup.toml when present)
    #[arg(short, long, env = "FUZZY_LOOKUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// CSV file holding the values to match
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Source column, by header name or 0-based index
    #[arg(long, value_name = "COLUMN")]
    pub source_column: Option<ColumnSelector>,

    /// 1-indexed header row of the source file; 0 for none
    #[arg(long, value_name = "ROW")]
    pub source_header: Option<usize>,

    /// CSV file holding the values to match against
    #[arg(short, long)]
    pub target: Option<PathBuf>,

    /// Target column, by header name or 0-based index
    #[arg(long, value_name = "COLUMN")]
    pub target_column: Option<ColumnSelector>,

    /// 1-indexed header row of the target file; 0 for none
    #[arg(long, value_name = "ROW")]
    pub target_header: Option<usize>,

    /// Field delimiter of both input files
    #[arg(short, long)]
    pub delimiter: Option<char>,

    /// Keep cells that are empty after trimming
    #[arg(long)]
    pub keep_blank: bool,

    /// Minimum score to keep a pair (0-100)
    #[arg(long)]
    pub threshold: Option<u32>,

    /// Maximum matches kept per source value
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Scoring threads; 0 uses one per logical CPU
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Lower-case and strip punctuation before scoring
    #[arg(long)]
    pub full_process: bool,

    /// Result file; "-" writes to stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Omit the leading row index column
    #[arg(long)]
    pub no_index: bool,

    /// Exit non-zero when any pair could not be scored
    #[arg(long)]
    pub strict: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress and status lines
    #[arg(short, long)]
    pub quiet: bool,

    /// Summary format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

/// How the run summary is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Colored status lines on stderr
    Text,
    /// One JSON document on stdout
    Json,
}

impl Cli {
    /// Whether status lines and progress bars are drawn
    pub fn interactive(&self) -> bool {
        !self.quiet && self.format == Format::Text
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return fail(&cli, &e),
    };

    let telemetry = TelemetryConfig {
        json: config.schema.logging.json,
        ..TelemetryConfig::with_level(config.schema.logging.level.clone())
    }
    .verbosity(cli.verbose);
    if let Err(e) = fuzzy_lookup_telemetry::init_with_config(telemetry) {
        eprintln!("{} {}", "Warning:".yellow().bold(), e);
    }

    let cancel = CancellationToken::new();
    install_interrupt_handler(cancel.clone());

    match run::execute(&cli, config, cancel) {
        Ok(report) => {
            report.print(&cli);
            if cli.strict && !report.failures.is_empty() {
                ExitCode::from(exit_codes::PARTIAL_RESULT as u8)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => fail(&cli, &e),
    }
}

/// First Ctrl-C stops the scoring workers, a second one exits immediately
fn install_interrupt_handler(cancel: CancellationToken) {
    let result = ctrlc::set_handler(move || {
        if cancel.is_cancelled() {
            std::process::exit(exit_codes::CANCELLED);
        }
        cancel.cancel();
    });
    if let Err(e) = result {
        tracing::warn!(error = %e, "Could not install the Ctrl-C handler");
    }
}

fn fail(cli: &Cli, error: &Error) -> ExitCode {
    tracing::debug!(code = %error.code, "Run failed");
    match cli.format {
        Format::Json => match serde_json::to_string_pretty(&error.to_report()) {
            Ok(json) => println!("{}", json),
            Err(_) => Status::error(&error.to_string()),
        },
        Format::Text => Status::error(&error.to_string()),
    }
    ExitCode::from(error.exit_code() as u8)
}
