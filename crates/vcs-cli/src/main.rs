//! # vcs CLI entry point
//!
//! Parses arguments, loads configuration, initializes tracing and
//! dispatches to the subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vcs_cli::commands::{run, Command, Session};
use vcs_cli::config::CliConfig;

/// Issue, verify, derive and prove verifiable credentials.
#[derive(Parser, Debug)]
#[command(name = "vcs", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file (default: ./vcs.yaml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn filter_for(verbose: u8, debug: bool) -> EnvFilter {
    if std::env::var_os("RUST_LOG").is_some() {
        return EnvFilter::from_default_env();
    }
    match (verbose, debug) {
        (0, false) => EnvFilter::new("warn"),
        (1, false) => EnvFilter::new("info"),
        (0..=2, _) => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref()).and_then(|mut config| {
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter_for(
            cli.verbose,
            config.as_ref().map(|c| c.debug).unwrap_or(false),
        ))
        .with_target(false)
        .init();

    let result = config
        .and_then(Session::open)
        .and_then(|session| run(&cli.command, &session));

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
