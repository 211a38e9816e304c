//! Reversible value transforms.
//!
//! Responsibilities:
//! - Circular-shift obfuscation over Unicode scalar values.
//! - AES-256-GCM encryption with optional embedded IV.
//! - Gzip compression of text.
//! - Default key material (`CipherKeys`) and its sources (`KeySource`).
//!
//! Does NOT handle:
//! - JSON token encoding (see `convert`).
//! - Choosing which fields are transformed (see `schema`).
//!
//! Invariants:
//! - Every forward transform has an exact inverse for valid parameters.
//! - Functions here are pure apart from nonce generation and env lookups in `KeySource`.

mod cipher;
mod compress;
mod error;
mod keys;
mod obfuscate;

pub use cipher::{decrypt, encrypt, generate_iv};
pub use compress::{compress, decompress};
pub use error::{Result, TransformError};
pub use keys::{CipherKeys, KeySource};
pub use obfuscate::{deobfuscate, deobfuscate_opt, obfuscate, obfuscate_opt};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Encodes bytes as standard base64, the token form used inside documents.
pub fn encode_token(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes a standard base64 token.
pub fn decode_token(token: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(token.trim())
        .map_err(|e| TransformError::Encoding(format!("invalid base64 token: {}", e)))
}
