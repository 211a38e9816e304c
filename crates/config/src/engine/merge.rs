//! Overlaying an environment document onto a base document.

use serde_json::{Map, Value};

use crate::convert::find_key;

/// Merges `overlay` into `base`.
///
/// Overlay values equal to the JSON default (`null`, `false`, `0`) never
/// replace base values, so an override cannot reset a field to its default.
/// Objects merge recursively, arrays and scalars replace wholesale, and keys
/// match ASCII case-insensitively keeping the base spelling.
pub fn merge_documents(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => merge_maps(base_map, overlay_map),
        (base, overlay) => {
            if !is_default(&overlay) {
                *base = overlay;
            }
        }
    }
}

fn merge_maps(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        if is_default(&value) {
            continue;
        }
        match find_key(base, &key) {
            Some(existing) => {
                if let Some(slot) = base.get_mut(&existing) {
                    merge_documents(slot, value);
                }
            }
            None => {
                base.insert(key, value);
            }
        }
    }
}

fn is_default(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}
