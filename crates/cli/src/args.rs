//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse command-line arguments and environment variables.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `dispatch` module).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use strongbox_config::constants::{DEFAULT_OBFUSCATION_SALT, IV_VAR, KEY_VAR};

#[derive(Parser)]
#[command(name = "strongbox")]
#[command(about = "Produce and inspect transformed configuration values", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  strongbox obfuscate 8443\n  strongbox --key $STRONGBOX_KEY encrypt 'db-password'\n  strongbox resolve AppSettings --root ./deploy --environment Prod\n  strongbox environment Staging\n"
)]
pub struct Cli {
    /// Hex-encoded 32-byte default encryption key
    #[arg(long, global = true, env = KEY_VAR, hide_env_values = true)]
    pub key: Option<String>,

    /// Hex-encoded 12-byte IV used when the IV is not embedded
    #[arg(long, global = true, env = IV_VAR, hide_env_values = true)]
    pub iv: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Obfuscate text into the token stored in documents
    Obfuscate {
        text: String,

        /// Shift applied to every character (must be positive)
        #[arg(long, default_value_t = DEFAULT_OBFUSCATION_SALT, allow_hyphen_values = true)]
        salt: i32,
    },

    /// Recover text from an obfuscated token
    Deobfuscate {
        token: String,

        /// Shift the token was produced with
        #[arg(long, default_value_t = DEFAULT_OBFUSCATION_SALT, allow_hyphen_values = true)]
        salt: i32,
    },

    /// Encrypt text with the default key
    Encrypt {
        text: String,

        /// Use the fixed --iv instead of embedding a random IV in the token
        #[arg(long)]
        no_embed_iv: bool,
    },

    /// Decrypt a token with the default key
    Decrypt {
        token: String,

        /// The token was produced with the fixed --iv
        #[arg(long)]
        no_embed_iv: bool,
    },

    /// Gzip-compress text into a token
    Compress { text: String },

    /// Recover text from a compressed token
    Decompress { token: String },

    /// Print the merged base and environment override document
    Resolve {
        /// Document name, e.g. `AppSettings` for `Config/AppSettings.json`
        name: String,

        /// Content root containing the `Config` directory
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,

        /// Environment whose override document is merged (defaults to STRONGBOX_ENVIRONMENT)
        #[arg(long)]
        environment: Option<String>,
    },

    /// Print an environment name and its classification
    Environment {
        /// Name to classify (defaults to STRONGBOX_ENVIRONMENT)
        name: Option<String>,
    },
}
