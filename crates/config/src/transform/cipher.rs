//! AES-256-GCM encryption with an optional embedded IV.
//!
//! With `embed_iv`, a fresh nonce is generated for every call and written in
//! front of the ciphertext; decryption reads it back from the payload and
//! ignores any caller IV. Without it, the caller IV is the nonce and must be
//! identical on both sides.
//!
//! Payload layout with an embedded IV: `nonce (12 bytes) || ciphertext || tag (16 bytes)`.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngExt;

use super::error::{Result, TransformError};
use crate::constants::{IV_LEN, KEY_LEN};

fn cipher_for(key: &[u8]) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key).map_err(|_| {
        TransformError::CryptoFailure(format!(
            "key must be {} bytes (got {})",
            KEY_LEN,
            key.len()
        ))
    })
}

fn caller_iv(iv: Option<&[u8]>) -> Result<[u8; IV_LEN]> {
    let iv = iv.ok_or_else(|| {
        TransformError::CryptoFailure("an IV is required when it is not embedded".to_string())
    })?;
    iv.try_into().map_err(|_| {
        TransformError::CryptoFailure(format!(
            "IV must be {} bytes (got {})",
            IV_LEN,
            iv.len()
        ))
    })
}

/// Generates a random IV suitable for [`encrypt`].
pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    rand::rng().fill(&mut iv);
    iv
}

/// Encrypts `plaintext` with AES-256-GCM.
///
/// When `embed_iv` is true the `iv` argument is ignored; a random IV is
/// generated and prepended to the returned payload.
///
/// # Errors
///
/// Returns `TransformError::CryptoFailure` if the key is not 32 bytes, or if
/// `embed_iv` is false and `iv` is missing or not 12 bytes.
pub fn encrypt(plaintext: &[u8], key: &[u8], iv: Option<&[u8]>, embed_iv: bool) -> Result<Vec<u8>> {
    let cipher = cipher_for(key)?;
    let nonce_bytes = if embed_iv {
        generate_iv()
    } else {
        caller_iv(iv)?
    };

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| TransformError::CryptoFailure(e.to_string()))?;

    if !embed_iv {
        return Ok(ciphertext);
    }

    let mut payload = Vec::with_capacity(IV_LEN + ciphertext.len());
    payload.extend_from_slice(&nonce_bytes);
    payload.extend_from_slice(&ciphertext);
    Ok(payload)
}

/// Decrypts a payload produced by [`encrypt`] with the same `embed_iv` setting.
///
/// # Errors
///
/// Returns `TransformError::CryptoFailure` on key/IV length mismatch, a
/// payload shorter than its embedded IV, or authentication failure.
pub fn decrypt(payload: &[u8], key: &[u8], iv: Option<&[u8]>, embed_iv: bool) -> Result<Vec<u8>> {
    let cipher = cipher_for(key)?;
    let (nonce_bytes, ciphertext) = if embed_iv {
        if payload.len() < IV_LEN {
            return Err(TransformError::CryptoFailure(format!(
                "payload of {} bytes is shorter than the embedded IV",
                payload.len()
            )));
        }
        let (nonce, rest) = payload.split_at(IV_LEN);
        (caller_iv(Some(nonce))?, rest)
    } else {
        (caller_iv(iv)?, payload)
    };

    cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext)
        .map_err(|e| TransformError::CryptoFailure(e.to_string()))
}
