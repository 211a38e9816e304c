//! Per-field value converters applied during JSON encode/decode.
//!
//! Responsibilities:
//! - One `ValueConverter` per transform kind, chosen when metadata is built.
//! - Coerce decoded tokens back to the field's declared type.
//! - Walk documents (including nested models) and apply converters in place.
//! - Provide `Codec` for encoding/decoding whole documents of any model.
//!
//! Does NOT handle:
//! - Deciding which fields carry transforms (see `schema`).
//! - Reading documents from disk (see `engine`).
//!
//! Invariants:
//! - Decoding is best-effort: it never fails, falling back to the zero value.
//! - Integer fields accept plain numbers and booleans as legacy plaintext.
//! - Encoding failures are returned to the caller.

mod codec;
mod converters;
mod document;

pub use codec::{Codec, CodecError};
pub use converters::{CompressConverter, EncryptConverter, ObfuscateConverter};
pub(crate) use document::{
    canonicalize_keys, decode_document, encode_document, find_key, for_each_nested,
};

use std::sync::Arc;

use serde_json::Value;

use crate::schema::{TransformKind, ValueType};
use crate::transform::{CipherKeys, Result, TransformError};

/// Forward/inverse pair for one transform kind, working on document tokens.
///
/// `forward` turns plaintext into the token stored in the document and
/// `inverse` recovers the plaintext. `defaults` is the codec's key material,
/// used by converters whose declaration leaves keys unset.
pub trait ValueConverter: Send + Sync {
    fn kind(&self) -> TransformKind;

    fn forward(&self, plaintext: &str, defaults: Option<&CipherKeys>) -> Result<String>;

    fn inverse(&self, token: &str, defaults: Option<&CipherKeys>) -> Result<String>;
}

/// Selects the converter for a transform kind; `None` for `TransformKind::None`.
pub fn converter_for(kind: &TransformKind) -> Option<Arc<dyn ValueConverter>> {
    match kind {
        TransformKind::None => None,
        TransformKind::Obfuscate { salt } => Some(Arc::new(ObfuscateConverter::new(*salt))),
        TransformKind::Encrypt { key, iv, embed_iv } => Some(Arc::new(EncryptConverter::new(
            key.as_ref().map(|k| k.as_bytes().to_vec()),
            iv.as_ref().map(|v| v.as_bytes().to_vec()),
            *embed_iv,
        ))),
        TransformKind::Compress => Some(Arc::new(CompressConverter)),
    }
}

/// Encodes a field value into its transformed token.
///
/// `null` stays `null`. Integer fields are rendered as decimal text before
/// the transform; booleans on integer fields become `1`/`0`.
pub fn encode_value(
    converter: &dyn ValueConverter,
    value: &Value,
    value_type: ValueType,
    defaults: Option<&CipherKeys>,
) -> Result<Value> {
    let plaintext = match (value, value_type) {
        (Value::Null, _) => return Ok(Value::Null),
        (Value::String(s), _) => s.clone(),
        (Value::Number(n), ValueType::Integer) => n.to_string(),
        (Value::Bool(b), ValueType::Integer) => String::from(if *b { "1" } else { "0" }),
        (other, _) => {
            return Err(TransformError::InvalidParameter(format!(
                "cannot {} a {} value",
                converter.kind().label(),
                json_type_name(other)
            )));
        }
    };
    Ok(Value::String(converter.forward(&plaintext, defaults)?))
}

/// Decodes a stored token back into a value of the declared type.
///
/// Never fails: tokens that cannot be inverted (and, for integers, cannot be
/// parsed as plain numbers) decode to the zero value.
pub fn decode_value(
    converter: &dyn ValueConverter,
    token: &Value,
    value_type: ValueType,
    nullable: bool,
    defaults: Option<&CipherKeys>,
) -> Value {
    let zero = || value_type.zero_value(nullable);
    match value_type {
        ValueType::Integer => match token {
            Value::Number(_) => token.clone(),
            Value::Bool(b) => Value::from(i64::from(*b)),
            Value::String(raw) => decode_integer(converter, raw, defaults).unwrap_or_else(zero),
            _ => zero(),
        },
        _ => match token {
            Value::String(raw) => match converter.inverse(raw, defaults) {
                Ok(plaintext) => Value::String(plaintext),
                Err(e) => {
                    tracing::debug!(
                        transform = converter.kind().label(),
                        error = %e,
                        "Could not invert transformed value; using zero value"
                    );
                    zero()
                }
            },
            _ => zero(),
        },
    }
}

fn decode_integer(
    converter: &dyn ValueConverter,
    raw: &str,
    defaults: Option<&CipherKeys>,
) -> Option<Value> {
    let inverted = converter
        .inverse(raw, defaults)
        .ok()
        .and_then(|plain| parse_integer(&plain));
    if inverted.is_some() {
        return inverted;
    }

    // Legacy documents may hold the plain number as a string.
    let fallback = parse_integer(raw);
    if fallback.is_none() {
        tracing::debug!(
            transform = converter.kind().label(),
            "Could not decode integer token; using zero value"
        );
    }
    fallback
}

fn parse_integer(text: &str) -> Option<Value> {
    let text = text.trim();
    text.parse::<i64>()
        .map(Value::from)
        .or_else(|_| text.parse::<u64>().map(Value::from))
        .ok()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obfuscator() -> Arc<dyn ValueConverter> {
        converter_for(&TransformKind::obfuscate()).unwrap()
    }

    #[test]
    fn test_integer_roundtrip() {
        let conv = obfuscator();
        let token = encode_value(conv.as_ref(), &json!(12345), ValueType::Integer, None).unwrap();
        assert!(token.is_string());
        assert_ne!(token, json!("12345"));
        let decoded = decode_value(conv.as_ref(), &token, ValueType::Integer, false, None);
        assert_eq!(decoded, json!(12345));
    }

    #[test]
    fn test_integer_accepts_legacy_plain_number() {
        let conv = obfuscator();
        assert_eq!(
            decode_value(conv.as_ref(), &json!(12345), ValueType::Integer, false, None),
            json!(12345)
        );
        assert_eq!(
            decode_value(conv.as_ref(), &json!("12345"), ValueType::Integer, false, None),
            json!(12345)
        );
    }

    #[test]
    fn test_integer_accepts_booleans() {
        let conv = obfuscator();
        assert_eq!(
            decode_value(conv.as_ref(), &json!(true), ValueType::Integer, false, None),
            json!(1)
        );
        assert_eq!(
            decode_value(conv.as_ref(), &json!(false), ValueType::Integer, false, None),
            json!(0)
        );
    }

    #[test]
    fn test_undecodable_integer_is_zero() {
        let conv = obfuscator();
        assert_eq!(
            decode_value(conv.as_ref(), &json!("%%%"), ValueType::Integer, false, None),
            json!(0)
        );
        assert_eq!(
            decode_value(conv.as_ref(), &json!("%%%"), ValueType::Integer, true, None),
            Value::Null
        );
    }

    #[test]
    fn test_undecodable_text_is_zero() {
        let conv = converter_for(&TransformKind::Compress).unwrap();
        assert_eq!(
            decode_value(conv.as_ref(), &json!("bm90IGd6aXA="), ValueType::Text, false, None),
            json!("")
        );
        assert_eq!(
            decode_value(conv.as_ref(), &json!(17), ValueType::Text, true, None),
            Value::Null
        );
    }

    #[test]
    fn test_encode_null_stays_null() {
        let conv = obfuscator();
        assert_eq!(
            encode_value(conv.as_ref(), &Value::Null, ValueType::Text, None).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_encode_rejects_structured_values() {
        let conv = obfuscator();
        let result = encode_value(conv.as_ref(), &json!({"a": 1}), ValueType::Text, None);
        assert!(matches!(result, Err(TransformError::InvalidParameter(_))));
    }

    #[test]
    fn test_none_kind_has_no_converter() {
        assert!(converter_for(&TransformKind::None).is_none());
    }
}
