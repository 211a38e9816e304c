//! Whole-document encoding and decoding for configuration models.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::{canonicalize_keys, decode_document, encode_document};
use crate::schema::{ConfigModel, FieldMetadataSet, MetadataCache, SchemaError};
use crate::transform::{CipherKeys, TransformError};

/// Errors from encoding or decoding a whole document.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Serializes and deserializes models with their field transforms applied.
///
/// The codec carries the default key material used by encrypted fields that
/// do not declare their own, and the metadata cache it resolves models with.
#[derive(Debug, Clone)]
pub struct Codec {
    keys: Option<CipherKeys>,
    metadata: Arc<MetadataCache>,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(Arc::clone(MetadataCache::global()))
    }
}

impl Codec {
    pub fn new(metadata: Arc<MetadataCache>) -> Self {
        Self {
            keys: None,
            metadata,
        }
    }

    pub fn with_keys(mut self, keys: CipherKeys) -> Self {
        self.keys = Some(keys);
        self
    }

    pub fn keys(&self) -> Option<&CipherKeys> {
        self.keys.as_ref()
    }

    pub fn metadata_cache(&self) -> &Arc<MetadataCache> {
        &self.metadata
    }

    /// Serializes `model` and applies its field transforms.
    pub fn to_value<T: ConfigModel + Serialize>(&self, model: &T) -> Result<Value, CodecError> {
        let meta = self.metadata.resolve::<T>()?;
        let mut document = serde_json::to_value(model)?;
        encode_document(&meta, &mut document, self.keys())?;
        Ok(document)
    }

    pub fn to_string<T: ConfigModel + Serialize>(&self, model: &T) -> Result<String, CodecError> {
        Ok(serde_json::to_string(&self.to_value(model)?)?)
    }

    pub fn to_string_pretty<T: ConfigModel + Serialize>(
        &self,
        model: &T,
    ) -> Result<String, CodecError> {
        Ok(serde_json::to_string_pretty(&self.to_value(model)?)?)
    }

    /// Inverts field transforms in `document` and deserializes it into `T`.
    ///
    /// Transform inversion is best-effort; only schema and JSON shape errors fail.
    pub fn from_value<T: ConfigModel + DeserializeOwned>(
        &self,
        mut document: Value,
    ) -> Result<T, CodecError> {
        let meta = self.metadata.resolve::<T>()?;
        self.decode_in_place(&meta, &mut document);
        Ok(serde_json::from_value(document)?)
    }

    pub fn from_str<T: ConfigModel + DeserializeOwned>(&self, json: &str) -> Result<T, CodecError> {
        self.from_value(serde_json::from_str(json)?)
    }

    /// Normalizes key spelling and inverts transforms without deserializing.
    pub fn decode_in_place(&self, meta: &FieldMetadataSet, document: &mut Value) {
        canonicalize_keys(meta, document);
        decode_document(meta, document, self.keys());
    }

    /// Encrypts text with the default key material into a document token.
    pub fn encrypt_text(&self, plaintext: &str) -> Result<String, TransformError> {
        self.default_keys()?.encrypt_text(plaintext)
    }

    /// Decrypts a document token with the default key material.
    pub fn decrypt_text(&self, token: &str) -> Result<String, TransformError> {
        self.default_keys()?.decrypt_text(token)
    }

    fn default_keys(&self) -> Result<&CipherKeys, TransformError> {
        self.keys
            .as_ref()
            .ok_or_else(|| TransformError::CryptoFailure("no default key configured".to_string()))
    }
}
