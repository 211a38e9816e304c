//! Post-merge decryption of convention- and annotation-bound fields.

use serde_json::Value;

use crate::convert::{find_key, for_each_nested};
use crate::schema::FieldMetadataSet;
use crate::transform::CipherKeys;

/// Writes the decrypted value of every bound source field into its target.
///
/// Sources that are absent or not strings are skipped. An empty source
/// yields an empty target. When decryption fails, or no key material is
/// configured, the ciphertext is copied into the target and a warning is
/// logged. Nested models are processed recursively.
pub(crate) fn apply_decryptions(
    meta: &FieldMetadataSet,
    document: &mut Value,
    keys: Option<&CipherKeys>,
) {
    let Value::Object(map) = document else {
        return;
    };

    for relationship in meta.decrypts() {
        let Some(source_key) = find_key(map, relationship.source()) else {
            continue;
        };
        let Some(Value::String(ciphertext)) = map.get(&source_key) else {
            continue;
        };

        let plaintext = if ciphertext.is_empty() {
            String::new()
        } else {
            match keys.map(|k| k.decrypt_text(ciphertext)) {
                Some(Ok(plaintext)) => plaintext,
                Some(Err(e)) => {
                    tracing::warn!(
                        type_name = meta.key().name(),
                        field = relationship.target(),
                        source_field = relationship.source(),
                        error = %e,
                        "Failed to decrypt field; keeping ciphertext"
                    );
                    ciphertext.clone()
                }
                None => {
                    tracing::warn!(
                        type_name = meta.key().name(),
                        field = relationship.target(),
                        source_field = relationship.source(),
                        "No default key configured; keeping ciphertext"
                    );
                    ciphertext.clone()
                }
            }
        };

        let target_key =
            find_key(map, relationship.target()).unwrap_or_else(|| relationship.target().to_string());
        map.insert(target_key, Value::String(plaintext));
    }

    for_each_nested(meta, map, |nested, child| {
        apply_decryptions(nested, child, keys)
    });
}
