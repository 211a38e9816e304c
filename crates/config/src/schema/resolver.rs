//! Discovery and caching of per-type field metadata.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use super::error::SchemaError;
use super::field::{FieldSpec, TransformKind};
use super::{ConfigModel, TypeKey, ValueType};
use crate::constants::{DECRYPT_SUFFIXES, IV_LEN, KEY_LEN};
use crate::convert::{ValueConverter, converter_for};

/// Binds a plaintext target field to the ciphertext field it is decrypted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptRelationship {
    target: String,
    source: String,
    explicit: bool,
}

impl DecryptRelationship {
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// True when declared with `decrypt_from` rather than found by naming convention.
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }
}

/// Transform declared on one field, with its converter already chosen.
#[derive(Clone)]
pub struct TransformMetadata {
    field: String,
    kind: TransformKind,
    value_type: ValueType,
    nullable: bool,
    converter: Arc<dyn ValueConverter>,
}

impl fmt::Debug for TransformMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformMetadata")
            .field("field", &self.field)
            .field("kind", &self.kind.label())
            .field("value_type", &self.value_type)
            .field("nullable", &self.nullable)
            .finish()
    }
}

impl TransformMetadata {
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn kind(&self) -> &TransformKind {
        &self.kind
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn converter(&self) -> &dyn ValueConverter {
        self.converter.as_ref()
    }
}

/// Everything discovered about one model type.
#[derive(Debug, Clone)]
pub struct FieldMetadataSet {
    key: TypeKey,
    field_names: Vec<String>,
    decrypts: Vec<DecryptRelationship>,
    transforms: Vec<TransformMetadata>,
    nested: Vec<(String, Arc<FieldMetadataSet>)>,
}

impl FieldMetadataSet {
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Declared field names, in declaration order.
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    pub fn decrypts(&self) -> &[DecryptRelationship] {
        &self.decrypts
    }

    pub fn transforms(&self) -> &[TransformMetadata] {
        &self.transforms
    }

    /// Metadata of nested models, keyed by the field that holds them.
    pub fn nested(&self) -> &[(String, Arc<FieldMetadataSet>)] {
        &self.nested
    }

    pub fn decrypt_for(&self, target: &str) -> Option<&DecryptRelationship> {
        self.decrypts
            .iter()
            .find(|d| d.target.eq_ignore_ascii_case(target))
    }

    pub fn transform_for(&self, field: &str) -> Option<&TransformMetadata> {
        self.transforms
            .iter()
            .find(|t| t.field.eq_ignore_ascii_case(field))
    }
}

/// Process-wide memo of field metadata keyed by model type.
///
/// Entries are never evicted. Concurrent first lookups of a type may each
/// compute the metadata; the first one published is returned to everyone.
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: RwLock<HashMap<TypeKey, Arc<FieldMetadataSet>>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared cache used by default codecs and registries.
    pub fn global() -> &'static Arc<MetadataCache> {
        static GLOBAL: OnceLock<Arc<MetadataCache>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(MetadataCache::new()))
    }

    /// Returns the metadata for `T`, discovering it on first use.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` for invalid explicit annotations on `T` or any
    /// nested model. Errors are not cached.
    pub fn resolve<T: ConfigModel>(&self) -> Result<Arc<FieldMetadataSet>, SchemaError> {
        self.resolve_key(TypeKey::of::<T>(), T::fields)
    }

    pub fn contains<T: ConfigModel>(&self) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&TypeKey::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn resolve_key(
        &self,
        key: TypeKey,
        fields: fn() -> Vec<FieldSpec>,
    ) -> Result<Arc<FieldMetadataSet>, SchemaError> {
        if let Some(hit) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(hit));
        }

        let built = Arc::new(self.build(key, &fields())?);
        tracing::debug!(
            type_name = key.name(),
            decrypts = built.decrypts.len(),
            transforms = built.transforms.len(),
            "Discovered field metadata"
        );

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry(key).or_insert(built)))
    }

    fn build(&self, key: TypeKey, fields: &[FieldSpec]) -> Result<FieldMetadataSet, SchemaError> {
        let mut decrypts = Vec::new();
        let mut transforms = Vec::new();
        let mut nested = Vec::new();

        for field in fields {
            if let Some(source) = field.decrypt_source() {
                decrypts.push(explicit_relationship(key, field, source, fields)?);
            } else if let Some(source) = convention_source(field, fields) {
                decrypts.push(DecryptRelationship {
                    target: field.name().to_string(),
                    source: source.name().to_string(),
                    explicit: false,
                });
            }

            if !field.transform().is_none() {
                transforms.push(transform_metadata(key, field)?);
            }

            if let Some(model) = field.nested() {
                let set = self.resolve_key(model.key, model.fields)?;
                nested.push((field.name().to_string(), set));
            }
        }

        Ok(FieldMetadataSet {
            key,
            field_names: fields.iter().map(|f| f.name().to_string()).collect(),
            decrypts,
            transforms,
            nested,
        })
    }
}

fn find_field<'a>(fields: &'a [FieldSpec], name: &str) -> Option<&'a FieldSpec> {
    fields.iter().find(|f| f.is_named(name))
}

fn explicit_relationship(
    key: TypeKey,
    field: &FieldSpec,
    source: &str,
    fields: &[FieldSpec],
) -> Result<DecryptRelationship, SchemaError> {
    let Some(source_spec) = find_field(fields, source) else {
        return Err(SchemaError::MissingSource {
            type_name: key.name().to_string(),
            field: field.name().to_string(),
            source_field: source.to_string(),
        });
    };
    if !source_spec.value_type().is_textual() {
        return Err(SchemaError::IncompatibleSource {
            type_name: key.name().to_string(),
            field: field.name().to_string(),
            source_field: source.to_string(),
        });
    }
    Ok(DecryptRelationship {
        target: field.name().to_string(),
        source: source_spec.name().to_string(),
        explicit: true,
    })
}

/// Finds `<X>` for a field named `<X>Decrypted` or `<X>Decrypt`.
fn convention_source<'a>(field: &FieldSpec, fields: &'a [FieldSpec]) -> Option<&'a FieldSpec> {
    let name = field.name();
    DECRYPT_SUFFIXES.iter().find_map(|suffix| {
        let split = name.len().checked_sub(suffix.len())?;
        if split == 0 || !name.is_char_boundary(split) || !name[split..].eq_ignore_ascii_case(suffix) {
            return None;
        }
        find_field(fields, &name[..split]).filter(|source| source.value_type().is_textual())
    })
}

fn transform_metadata(key: TypeKey, field: &FieldSpec) -> Result<TransformMetadata, SchemaError> {
    let kind = field.transform().clone();
    if !field.value_type().is_transformable() {
        return Err(SchemaError::IncompatibleTransform {
            type_name: key.name().to_string(),
            field: field.name().to_string(),
            transform: kind.label(),
        });
    }

    let invalid = |message: String| SchemaError::InvalidParameter {
        type_name: key.name().to_string(),
        field: field.name().to_string(),
        message,
    };
    match &kind {
        TransformKind::Obfuscate { salt } if *salt <= 0 => {
            return Err(invalid(format!(
                "obfuscation salt must be positive (got {})",
                salt
            )));
        }
        TransformKind::Encrypt { key: Some(k), .. } if k.len() != KEY_LEN => {
            return Err(invalid(format!(
                "encryption key must be {} bytes (got {})",
                KEY_LEN,
                k.len()
            )));
        }
        TransformKind::Encrypt { iv: Some(iv), .. } if iv.len() != IV_LEN => {
            return Err(invalid(format!(
                "encryption IV must be {} bytes (got {})",
                IV_LEN,
                iv.len()
            )));
        }
        _ => {}
    }

    let converter = converter_for(&kind).ok_or_else(|| invalid("no converter for transform".to_string()))?;
    Ok(TransformMetadata {
        field: field.name().to_string(),
        kind,
        value_type: field.value_type(),
        nullable: field.is_nullable(),
        converter,
    })
}
