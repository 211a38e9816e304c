//! Single-value transform commands: obfuscate, encrypt, compress and their inverses.
//!
//! Tokens are produced exactly as the library stores them in documents, so
//! output can be pasted into a configuration file.

use anyhow::{Context, Result};
use strongbox_config::CipherKeys;
use strongbox_config::convert::{CompressConverter, ObfuscateConverter, ValueConverter};

use crate::error::CliError;

/// Key material from the global `--key` / `--iv` options.
pub struct KeyArgs<'a> {
    pub key: Option<&'a str>,
    pub iv: Option<&'a str>,
}

impl KeyArgs<'_> {
    fn cipher_keys(&self, embed_iv: bool) -> Result<CipherKeys> {
        let key = self.key.ok_or_else(|| {
            CliError::InvalidInput(
                "an encryption key is required (--key or STRONGBOX_KEY)".to_string(),
            )
        })?;
        if !embed_iv && self.iv.is_none() {
            return Err(CliError::InvalidInput(
                "--no-embed-iv requires an IV (--iv or STRONGBOX_IV)".to_string(),
            )
            .into());
        }
        let keys = CipherKeys::from_hex(key, self.iv).context("Invalid key material")?;
        Ok(keys.with_embed_iv(embed_iv))
    }
}

pub fn run_obfuscate(text: &str, salt: i32) -> Result<String> {
    ObfuscateConverter::new(salt)
        .forward(text, None)
        .context("Failed to obfuscate value")
}

pub fn run_deobfuscate(token: &str, salt: i32) -> Result<String> {
    ObfuscateConverter::new(salt)
        .inverse(token, None)
        .context("Failed to deobfuscate token")
}

pub fn run_encrypt(keys: &KeyArgs<'_>, text: &str, embed_iv: bool) -> Result<String> {
    keys.cipher_keys(embed_iv)?
        .encrypt_text(text)
        .context("Failed to encrypt value")
}

pub fn run_decrypt(keys: &KeyArgs<'_>, token: &str, embed_iv: bool) -> Result<String> {
    keys.cipher_keys(embed_iv)?
        .decrypt_text(token)
        .context("Failed to decrypt token")
}

pub fn run_compress(text: &str) -> Result<String> {
    CompressConverter
        .forward(text, None)
        .context("Failed to compress value")
}

pub fn run_decompress(token: &str) -> Result<String> {
    CompressConverter
        .inverse(token, None)
        .context("Failed to decompress token")
}
