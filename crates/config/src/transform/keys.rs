//! Default key material for the encryption transform.
//!
//! Responsibilities:
//! - Hold the key/IV pair a codec falls back to when a field declares none.
//! - Resolve key material from static bytes, hex environment variables, or a password.
//!
//! Does NOT handle:
//! - Storing keys anywhere; key material is supplied by the embedding application.
//!
//! Invariants:
//! - `Debug` output never contains key or IV bytes.
//! - Hex values read from the environment are validated for length on resolution.

use std::fmt;

use argon2::Argon2;
use secrecy::{ExposeSecret, SecretString};

use super::cipher;
use super::error::{Result, TransformError};
use super::{decode_token, encode_token};
use crate::constants::{IV_LEN, KEY_LEN};
use crate::environment::env_var_or_none;

/// Key, optional IV, and IV mode used by the encryption transform.
#[derive(Clone)]
pub struct CipherKeys {
    key: Vec<u8>,
    iv: Option<Vec<u8>>,
    embed_iv: bool,
}

impl fmt::Debug for CipherKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherKeys")
            .field("key", &"[REDACTED]")
            .field("iv", &self.iv.as_ref().map(|_| "[REDACTED]"))
            .field("embed_iv", &self.embed_iv)
            .finish()
    }
}

impl CipherKeys {
    /// Creates key material that embeds a fresh IV in every payload.
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            iv: None,
            embed_iv: true,
        }
    }

    /// Sets the caller IV used when the IV is not embedded.
    pub fn with_iv(mut self, iv: impl Into<Vec<u8>>) -> Self {
        self.iv = Some(iv.into());
        self
    }

    /// Chooses between an embedded per-call IV and the fixed caller IV.
    pub fn with_embed_iv(mut self, embed_iv: bool) -> Self {
        self.embed_iv = embed_iv;
        self
    }

    /// Parses a hex key and optional hex IV, checking their lengths.
    pub fn from_hex(key_hex: &str, iv_hex: Option<&str>) -> Result<Self> {
        let key = decode_hex("key", key_hex, KEY_LEN)?;
        let mut keys = Self::new(key);
        if let Some(iv_hex) = iv_hex {
            keys = keys.with_iv(decode_hex("IV", iv_hex, IV_LEN)?);
        }
        Ok(keys)
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn iv(&self) -> Option<&[u8]> {
        self.iv.as_deref()
    }

    pub fn embed_iv(&self) -> bool {
        self.embed_iv
    }

    /// Encrypts bytes with these keys.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        cipher::encrypt(plaintext, &self.key, self.iv(), self.embed_iv)
    }

    /// Decrypts bytes with these keys.
    pub fn decrypt(&self, payload: &[u8]) -> Result<Vec<u8>> {
        cipher::decrypt(payload, &self.key, self.iv(), self.embed_iv)
    }

    /// Encrypts text and returns the base64 token stored in documents.
    pub fn encrypt_text(&self, plaintext: &str) -> Result<String> {
        Ok(encode_token(&self.encrypt(plaintext.as_bytes())?))
    }

    /// Decrypts a base64 token back to text.
    pub fn decrypt_text(&self, token: &str) -> Result<String> {
        let plaintext = self.decrypt(&decode_token(token)?)?;
        String::from_utf8(plaintext).map_err(|e| TransformError::Encoding(e.to_string()))
    }
}

fn decode_hex(label: &str, value: &str, expected: usize) -> Result<Vec<u8>> {
    let bytes = hex::decode(value.trim())
        .map_err(|e| TransformError::Encoding(format!("{} is not valid hex: {}", label, e)))?;
    if bytes.len() != expected {
        return Err(TransformError::InvalidParameter(format!(
            "{} must be {} bytes (got {})",
            label,
            expected,
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Where the default key material comes from.
#[derive(Debug, Clone)]
pub enum KeySource {
    /// Key material supplied directly by the application.
    Static(CipherKeys),
    /// Hex-encoded key (and optional IV) read from environment variables.
    ///
    /// When the IV variable is set the IV is used as a fixed IV rather than
    /// embedding a fresh one in each payload.
    Env { key_var: String, iv_var: String },
    /// Key derived from a password and salt with Argon2id.
    Password { password: SecretString, salt: Vec<u8> },
}

impl KeySource {
    /// Resolves the source into key material.
    ///
    /// # Errors
    ///
    /// Returns `TransformError::InvalidParameter` when the key variable is
    /// unset or a value has the wrong length, `TransformError::Encoding` for
    /// malformed hex, and `TransformError::CryptoFailure` if key derivation fails.
    pub fn resolve(&self) -> Result<CipherKeys> {
        match self {
            Self::Static(keys) => Ok(keys.clone()),
            Self::Env { key_var, iv_var } => {
                let key_hex = env_var_or_none(key_var).ok_or_else(|| {
                    TransformError::InvalidParameter(format!(
                        "environment variable {} not set",
                        key_var
                    ))
                })?;
                match env_var_or_none(iv_var) {
                    Some(iv_hex) => {
                        Ok(CipherKeys::from_hex(&key_hex, Some(&iv_hex))?.with_embed_iv(false))
                    }
                    None => CipherKeys::from_hex(&key_hex, None),
                }
            }
            Self::Password { password, salt } => Ok(CipherKeys::new(derive_key(password, salt)?)),
        }
    }
}

/// Derives a 32-byte key from a password and salt using Argon2id.
pub(crate) fn derive_key(password: &SecretString, salt: &[u8]) -> Result<[u8; KEY_LEN]> {
    let mut key = [0u8; KEY_LEN];
    Argon2::default()
        .hash_password_into(password.expose_secret().as_bytes(), salt, &mut key)
        .map_err(|e| TransformError::CryptoFailure(e.to_string()))?;
    Ok(key)
}
