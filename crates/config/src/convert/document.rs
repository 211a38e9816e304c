//! Applying field metadata to whole JSON documents.

use std::convert::Infallible;

use serde_json::{Map, Value};

use super::{decode_value, encode_value};
use crate::schema::FieldMetadataSet;
use crate::transform::{CipherKeys, Result};

/// Finds the document key matching `name`, ASCII case-insensitively.
///
/// An exact match wins over a case-insensitive one.
pub(crate) fn find_key(map: &Map<String, Value>, name: &str) -> Option<String> {
    if map.contains_key(name) {
        return Some(name.to_string());
    }
    map.keys().find(|k| k.eq_ignore_ascii_case(name)).cloned()
}

/// Applies `f` to every object the nested metadata describes under `map`,
/// stopping at the first error.
///
/// Object fields are visited directly; list fields visit each object element.
fn try_for_each_nested<E, F>(
    meta: &FieldMetadataSet,
    map: &mut Map<String, Value>,
    mut f: F,
) -> std::result::Result<(), E>
where
    F: FnMut(&FieldMetadataSet, &mut Value) -> std::result::Result<(), E>,
{
    for (field, nested) in meta.nested() {
        let Some(key) = find_key(map, field) else {
            continue;
        };
        match map.get_mut(&key) {
            Some(child @ Value::Object(_)) => f(nested, child)?,
            Some(Value::Array(items)) => {
                for item in items.iter_mut().filter(|item| item.is_object()) {
                    f(nested, item)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Infallible form of `try_for_each_nested`.
pub(crate) fn for_each_nested<F>(meta: &FieldMetadataSet, map: &mut Map<String, Value>, mut f: F)
where
    F: FnMut(&FieldMetadataSet, &mut Value),
{
    let Ok(()) = try_for_each_nested::<Infallible, _>(meta, map, |nested, child| {
        f(nested, child);
        Ok(())
    });
}

/// Renames keys that match a declared field case-insensitively to the
/// declared spelling, so serde sees the names the model expects.
pub(crate) fn canonicalize_keys(meta: &FieldMetadataSet, document: &mut Value) {
    let Value::Object(map) = document else {
        return;
    };
    for declared in meta.field_names() {
        if map.contains_key(declared) {
            continue;
        }
        if let Some(found) = find_key(map, declared)
            && let Some(value) = map.remove(&found)
        {
            map.insert(declared.clone(), value);
        }
    }
    for_each_nested(meta, map, canonicalize_keys);
}

/// Inverts every transformed field present in `document`, best-effort.
pub(crate) fn decode_document(
    meta: &FieldMetadataSet,
    document: &mut Value,
    defaults: Option<&CipherKeys>,
) {
    let Value::Object(map) = document else {
        return;
    };
    for transform in meta.transforms() {
        let Some(key) = find_key(map, transform.field()) else {
            continue;
        };
        if let Some(slot) = map.get_mut(&key) {
            *slot = decode_value(
                transform.converter(),
                slot,
                transform.value_type(),
                transform.is_nullable(),
                defaults,
            );
        }
    }
    for_each_nested(meta, map, |nested, child| {
        decode_document(nested, child, defaults)
    });
}

/// Applies every declared transform to the fields present in `document`.
pub(crate) fn encode_document(
    meta: &FieldMetadataSet,
    document: &mut Value,
    defaults: Option<&CipherKeys>,
) -> Result<()> {
    let Value::Object(map) = document else {
        return Ok(());
    };
    for transform in meta.transforms() {
        let Some(key) = find_key(map, transform.field()) else {
            continue;
        };
        if let Some(slot) = map.get_mut(&key) {
            *slot = encode_value(transform.converter(), slot, transform.value_type(), defaults)?;
        }
    }
    try_for_each_nested(meta, map, |nested, child| {
        encode_document(nested, child, defaults)
    })
}
