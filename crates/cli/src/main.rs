//! strongbox - command-line companion to the strongbox configuration library.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Produce and invert field tokens exactly as configuration documents store them.
//! - Preview merged configuration documents for a content root and environment.
//!
//! Does NOT handle:
//! - Transform or resolution logic (see `crates/config`).
//! - Writing configuration documents.
//!
//! Invariants:
//! - `load_dotenv()` is called BEFORE CLI parsing to allow `.env` to provide clap defaults.
//! - Logs go to stderr so stdout carries only command output.

mod args;
mod commands;
mod dispatch;
mod error;

use args::Cli;
use clap::Parser;
use dispatch::run_command;
use error::{CliError, ExitCode, ExitCodeExt};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Loads `.env` from the working directory unless `DOTENV_DISABLED` is "1" or "true".
fn load_dotenv() -> Result<(), CliError> {
    let disabled = std::env::var("DOTENV_DISABLED")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if disabled {
        return Ok(());
    }

    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(dotenvy::Error::LineParse(_, idx)) => Err(CliError::DotenvParse { error_index: idx }),
        Err(dotenvy::Error::Io(io_err)) => Err(CliError::DotenvIo {
            kind: io_err.kind(),
        }),
        Err(e) => Err(CliError::InvalidInput(e.to_string())),
    }
}

fn main() {
    // Load .env file BEFORE CLI parsing so clap env defaults can read .env values
    if let Err(e) = load_dotenv() {
        eprintln!("Failed to load environment: {}", e);
        std::process::exit(ExitCode::GeneralError.as_i32());
    }

    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let exit_code = match run_command(cli) {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("{:#}", e);
            e.exit_code()
        }
    };

    std::process::exit(exit_code.as_i32());
}
