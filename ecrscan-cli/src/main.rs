//! ecrscan -- offline replay of ECR scan-completion events
//!
//! Logs go to stderr so stdout carries only command output.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ecrscan_core::config::GeneralConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = commands::load_config(cli.config.as_deref()).await?;
    init_tracing(cli.log_level.as_deref(), &config.general);

    let writer = OutputWriter::new(cli.output);
    match cli.command {
        Commands::Flatten(args) => commands::flatten::execute(args, &writer).await,
        Commands::Finding(args) => commands::finding::execute(args, config, &writer).await,
        Commands::Process(args) => commands::process::execute(args, config, &writer).await,
    }
}

/// `RUST_LOG` wins; otherwise `--log-level`, then `general.log_level`.
fn init_tracing(cli_level: Option<&str>, general: &GeneralConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(cli_level, general)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn log_directive<'a>(cli_level: Option<&'a str>, general: &'a GeneralConfig) -> &'a str {
    cli_level.unwrap_or(&general.log_level)
}
