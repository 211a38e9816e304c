//! One converter per transform kind.

use super::ValueConverter;
use crate::schema::TransformKind;
use crate::transform::{
    self, CipherKeys, Result, TransformError, decode_token, encode_token,
};

fn utf8(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| TransformError::Encoding(e.to_string()))
}

/// Character-shift obfuscation stored as base64 of the shifted UTF-8 text.
#[derive(Debug, Clone, Copy)]
pub struct ObfuscateConverter {
    salt: i32,
}

impl ObfuscateConverter {
    pub fn new(salt: i32) -> Self {
        Self { salt }
    }
}

impl ValueConverter for ObfuscateConverter {
    fn kind(&self) -> TransformKind {
        TransformKind::Obfuscate { salt: self.salt }
    }

    fn forward(&self, plaintext: &str, _defaults: Option<&CipherKeys>) -> Result<String> {
        let shifted = transform::obfuscate(plaintext, self.salt)?;
        Ok(encode_token(shifted.as_bytes()))
    }

    fn inverse(&self, token: &str, _defaults: Option<&CipherKeys>) -> Result<String> {
        let shifted = utf8(decode_token(token)?)?;
        transform::deobfuscate(&shifted, self.salt)
    }
}

/// AES-256-GCM stored as base64 of the payload.
///
/// Key and IV declared on the field win over the codec defaults. The IV
/// mode always comes from the declaration.
#[derive(Clone)]
pub struct EncryptConverter {
    key: Option<Vec<u8>>,
    iv: Option<Vec<u8>>,
    embed_iv: bool,
}

impl std::fmt::Debug for EncryptConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptConverter")
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("iv", &self.iv.as_ref().map(|_| "[REDACTED]"))
            .field("embed_iv", &self.embed_iv)
            .finish()
    }
}

impl EncryptConverter {
    pub fn new(key: Option<Vec<u8>>, iv: Option<Vec<u8>>, embed_iv: bool) -> Self {
        Self { key, iv, embed_iv }
    }

    fn material<'a>(&'a self, defaults: Option<&'a CipherKeys>) -> Result<(&'a [u8], Option<&'a [u8]>)> {
        let key = self
            .key
            .as_deref()
            .or_else(|| defaults.map(CipherKeys::key))
            .ok_or_else(|| {
                TransformError::CryptoFailure("no encryption key configured".to_string())
            })?;
        let iv = self.iv.as_deref().or_else(|| defaults.and_then(CipherKeys::iv));
        Ok((key, iv))
    }
}

impl ValueConverter for EncryptConverter {
    fn kind(&self) -> TransformKind {
        TransformKind::Encrypt {
            key: None,
            iv: None,
            embed_iv: self.embed_iv,
        }
    }

    fn forward(&self, plaintext: &str, defaults: Option<&CipherKeys>) -> Result<String> {
        let (key, iv) = self.material(defaults)?;
        let payload = transform::encrypt(plaintext.as_bytes(), key, iv, self.embed_iv)?;
        Ok(encode_token(&payload))
    }

    fn inverse(&self, token: &str, defaults: Option<&CipherKeys>) -> Result<String> {
        let (key, iv) = self.material(defaults)?;
        utf8(transform::decrypt(&decode_token(token)?, key, iv, self.embed_iv)?)
    }
}

/// Gzip stored as base64 of the compressed bytes.
#[derive(Debug, Clone, Copy)]
pub struct CompressConverter;

impl ValueConverter for CompressConverter {
    fn kind(&self) -> TransformKind {
        TransformKind::Compress
    }

    fn forward(&self, plaintext: &str, _defaults: Option<&CipherKeys>) -> Result<String> {
        Ok(encode_token(&transform::compress(plaintext)?))
    }

    fn inverse(&self, token: &str, _defaults: Option<&CipherKeys>) -> Result<String> {
        transform::decompress(&decode_token(token)?)
    }
}
