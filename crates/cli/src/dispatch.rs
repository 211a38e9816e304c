//! Command dispatch logic for the CLI.
//!
//! Responsibilities:
//! - Route parsed CLI commands to their handlers.
//! - Write command output to stdout.
//!
//! Does NOT handle:
//! - Argument parsing (see `args` module).
//! - Exit code mapping (see `error` module).

use anyhow::Result;

use crate::args::{Cli, Commands};
use crate::commands::transform::KeyArgs;
use crate::commands::{environment, resolve, transform};

/// Runs the parsed command and prints its output.
pub fn run_command(cli: Cli) -> Result<()> {
    let keys = KeyArgs {
        key: cli.key.as_deref(),
        iv: cli.iv.as_deref(),
    };

    let output = match cli.command {
        Commands::Obfuscate { text, salt } => transform::run_obfuscate(&text, salt)?,
        Commands::Deobfuscate { token, salt } => transform::run_deobfuscate(&token, salt)?,
        Commands::Encrypt { text, no_embed_iv } => {
            transform::run_encrypt(&keys, &text, !no_embed_iv)?
        }
        Commands::Decrypt { token, no_embed_iv } => {
            transform::run_decrypt(&keys, &token, !no_embed_iv)?
        }
        Commands::Compress { text } => transform::run_compress(&text)?,
        Commands::Decompress { token } => transform::run_decompress(&token)?,
        Commands::Resolve {
            name,
            root,
            environment,
        } => resolve::run(&name, root, environment)?,
        Commands::Environment { name } => environment::run(name),
    };

    println!("{}", output);
    Ok(())
}
