//! CLI errors and exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to tell bad input from other failures.
//! - Map library and CLI errors found in an `anyhow` chain to exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - Exit code 2 always means the input (arguments, tokens, key material) was rejected.

use strongbox_config::TransformError;

/// Errors raised by the CLI itself rather than the library.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to parse .env file (error at index {error_index})")]
    DotenvParse { error_index: usize },

    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: std::io::ErrorKind },
}

/// Structured exit codes for strongbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Command completed successfully.
    Success = 0,

    /// Unhandled or generic failure, including configuration load errors.
    GeneralError = 1,

    /// Invalid input: malformed tokens, bad salt, wrong key length.
    ///
    /// Scripts should fix the input and not retry.
    InvalidInput = 2,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&TransformError> for ExitCode {
    fn from(err: &TransformError) -> Self {
        match err {
            TransformError::InvalidParameter(_)
            | TransformError::Encoding(_)
            | TransformError::Compression(_) => ExitCode::InvalidInput,
            TransformError::CryptoFailure(_) => ExitCode::GeneralError,
        }
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Returns ExitCode::GeneralError unless a known error is found in the chain.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(CliError::InvalidInput(_)) = cause.downcast_ref::<CliError>() {
                return ExitCode::InvalidInput;
            }
            if let Some(transform_err) = cause.downcast_ref::<TransformError>() {
                return ExitCode::from(transform_err);
            }
        }
        ExitCode::GeneralError
    }
}
