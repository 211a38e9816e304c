//! Error types for the transform primitives.

use thiserror::Error;

/// Errors raised by the reversible transforms.
///
/// Messages never include plaintext or key material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// A transform parameter is outside its valid range (e.g. a non-positive salt).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Encryption or decryption failed: bad key/IV length, tampered or truncated payload.
    #[error("Crypto failure: {0}")]
    CryptoFailure(String),

    #[error("Compression failed: {0}")]
    Compression(String),

    /// Bytes could not be interpreted in the expected encoding (base64, hex, UTF-8).
    #[error("Invalid encoding: {0}")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, TransformError>;
