//! Gatehouse CLI - evaluate role-based permission policies from the command line.
//!
//! Provides commands to check a single decision and to inspect the
//! effective rules of a policy document.

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use gatehouse_core::config::Config;
use gatehouse_core::error::ErrorResponse;
use gatehouse_core::telemetry::init_logging;
use gatehouse_core::GatehouseError;
use std::path::PathBuf;

use commands::{check, show};
use output::OutputFormat;

/// Exit status for usage, configuration and evaluation errors.
const EXIT_ERROR: i32 = 1;

/// Exit status for a check that was evaluated and denied.
const EXIT_DENIED: i32 = 2;

/// Gatehouse - role-based permission policies
#[derive(Parser)]
#[command(
    name = "gatehouse",
    author = "Aezi <aezi.zhu@icloud.com>",
    version = "0.1.0",
    about = "Gatehouse - role-based permission policies",
    long_about = "Evaluate create/read/update/delete permissions declared in a policy document.",
    propagate_version = true
)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    output: OutputFormat,

    /// Configuration file; GATEHOUSE__* environment variables override it
    #[arg(short, long, global = true, env = "GATEHOUSE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level for diagnostics on stderr, overriding the configuration
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether roles may perform a mode on a resource
    Check(check::CheckArgs),

    /// Show the effective rules of a policy document
    Show(show::ShowArgs),
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => EXIT_ERROR,
            };
            std::process::exit(code);
        }
    };

    if cli.no_color {
        colored::control::set_override(false);
    }

    let format = cli.output;
    let code = match run(cli) {
        Ok(true) => 0,
        Ok(false) => EXIT_DENIED,
        Err(e) => {
            report_error(e, format);
            EXIT_ERROR
        }
    };
    std::process::exit(code);
}

/// Load configuration, install logging and run the command.
/// Returns whether the command's outcome was an allow.
fn run(cli: Cli) -> Result<bool> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    let mut logging = config.observability.logging.clone();
    if let Some(level) = cli.log_level {
        logging.level = level;
    }
    init_logging(&logging)?;

    match cli.command {
        Commands::Check(args) => check::execute(args, &config, cli.output),
        Commands::Show(args) => show::execute(args, &config, cli.output).map(|()| true),
    }
}

fn report_error(e: anyhow::Error, format: OutputFormat) {
    let message = format!("{:#}", e);
    let error = GatehouseError::from(e);
    error.log();

    output::print_error(&message);
    if !matches!(format, OutputFormat::Table) {
        if let Err(e) = output::print_item(&ErrorResponse::from(&error), format) {
            output::print_error(&format!("{:#}", e));
        }
    }
}
