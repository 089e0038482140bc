//! `sealtool`: drives the AEAD, MAC and token engines from files, for
//! cross-implementation testing.
//!
//! Startup sequence:
//! 1. Parse the command line.
//! 2. Load and validate [`Config`] from `SEALTOOL_*` environment variables.
//! 3. Initialise structured logging.
//! 4. Run the subcommand and map any failure to an exit status.
//!
//! Exit status is 0 on success, the [`SealError::exit_code`] of the failure
//! when one is available, and 1 otherwise.

mod commands;
mod config;
mod telemetry;

use std::process::ExitCode;

use clap::Parser;
use tokenseal::SealError;
use tracing::{debug, error};

use commands::Command;
use config::Config;

#[derive(Debug, Parser)]
#[command(name = "sealtool", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    // -----------------------------------------------------------------------
    // 1. Command line
    // -----------------------------------------------------------------------
    let cli = Cli::parse();

    // -----------------------------------------------------------------------
    // 2. Configuration
    // -----------------------------------------------------------------------
    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Telemetry is not yet up; write to stderr directly.
            eprintln!("ERROR: configuration invalid: {e:#}");
            return ExitCode::from(78);
        }
    };

    // -----------------------------------------------------------------------
    // 3. Telemetry
    // -----------------------------------------------------------------------
    if let Err(e) = telemetry::init(&cfg.log_level) {
        eprintln!("ERROR: {e:#}");
        return ExitCode::FAILURE;
    }
    debug!(version = env!("CARGO_PKG_VERSION"), command = ?cli.command, "sealtool starting");

    // -----------------------------------------------------------------------
    // 4. Dispatch
    // -----------------------------------------------------------------------
    match commands::run(&cli.command, &cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "command failed");
            eprintln!("ERROR: {e:#}");
            match e.downcast_ref::<SealError>() {
                Some(seal) => ExitCode::from(seal.exit_code()),
                None => ExitCode::FAILURE,
            }
        }
    }
}
