//! CLI argument parsing using clap derive API
//!
//! Purely declarative; no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// ecrscan -- replay saved ECR scan-completion events offline.
///
/// Use `ecrscan <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "ecrscan", version, about, long_about = None)]
pub struct Cli {
    /// Optional ecrscan.toml configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level written to stderr (trace, debug, info, warn, error).
    ///
    /// Defaults to `general.log_level`; `RUST_LOG` overrides both.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (CSV record, finding summary).
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the flattened CSV record for an event.
    Flatten(EventArgs),

    /// Print the security finding derived from an event.
    Finding(EventArgs),

    /// Run the full pipeline against a local output directory.
    Process(ProcessArgs),
}

/// A saved event file.
#[derive(Args, Debug)]
pub struct EventArgs {
    /// Path to the event JSON file.
    pub event: PathBuf,
}

/// Full pipeline against local sinks.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Path to the event JSON file.
    pub event: PathBuf,

    /// Directory receiving `<bucket>/<key>` rows and `findings.jsonl`.
    #[arg(long)]
    pub out_dir: PathBuf,

    /// Bucket sub-directory (overrides config and environment).
    #[arg(long)]
    pub bucket: Option<String>,
}
