//! # gotta CLI entry point
//!
//! Parses command-line arguments, resolves the resource catalog, and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gotta_cli::validate::{run_check, run_validate, ValidateArgs};
use gotta_cli::{Catalog, EXIT_ERROR};

/// Declarative object validation from the command line.
///
/// Loads resources from a catalog file and validates JSON or YAML
/// documents against them using the built-in rules.
#[derive(Parser, Debug)]
#[command(name = "gotta", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the resource catalog (YAML or JSON). Defaults to $GOTTA_CATALOG.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a document against a catalog resource.
    Validate(ValidateArgs),

    /// Load the catalog and report every resource that fails to register.
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let catalog = match Catalog::locate(cli.catalog.as_deref()) {
        Ok(path) => path,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    tracing::debug!(catalog = %catalog.display(), "resolved catalog");

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &catalog).await,
        Commands::Check => run_check(&catalog),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
