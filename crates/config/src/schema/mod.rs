//! Schema descriptors and per-type field metadata.
//!
//! Responsibilities:
//! - Define the `ConfigModel` trait through which a type declares its fields.
//! - Discover decrypt relationships (explicit and by naming convention).
//! - Record transform metadata and pick each field's converter once.
//! - Cache the discovered metadata per model type for the life of the cache.
//!
//! Does NOT handle:
//! - Running converters over documents (see `convert`).
//! - Decrypting values (see `engine`).
//!
//! Invariants:
//! - Metadata for a type is computed at most once per published cache entry.
//! - Explicit annotations that reference missing or non-text fields are errors;
//!   convention matches without a source are silently unbound.

mod error;
mod field;
mod resolver;

use std::any::TypeId;
use std::fmt;

pub use error::SchemaError;
pub use field::{FieldSpec, NestedModel, TransformKind, ValueType};
pub use resolver::{DecryptRelationship, FieldMetadataSet, MetadataCache, TransformMetadata};

/// A configuration schema.
///
/// `document_name` addresses `<root>/Config/<document_name>.json`; it defaults
/// to the unqualified type name. `fields` lists every field that takes part
/// in decryption or transforms, plus nested models; fields not listed are
/// still deserialized normally.
///
/// Models must not contain themselves, directly or through nested fields.
pub trait ConfigModel: Sized + 'static {
    fn document_name() -> &'static str {
        short_type_name::<Self>()
    }

    fn fields() -> Vec<FieldSpec> {
        Vec::new()
    }
}

/// Unqualified name of `T` without generic arguments.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Identity of a model type, used as the cache key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ConfigModel>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::document_name(),
        }
    }

    /// Document name of the model.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Database;
    impl ConfigModel for Database {}

    struct Renamed;
    impl ConfigModel for Renamed {
        fn document_name() -> &'static str {
            "AppSettings"
        }
    }

    #[test]
    fn test_document_name_defaults_to_short_type_name() {
        assert_eq!(Database::document_name(), "Database");
        assert_eq!(TypeKey::of::<Database>().name(), "Database");
    }

    #[test]
    fn test_document_name_override() {
        assert_eq!(TypeKey::of::<Renamed>().to_string(), "AppSettings");
    }

    #[test]
    fn test_short_type_name_strips_generics() {
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
        assert_eq!(short_type_name::<u32>(), "u32");
    }

    #[test]
    fn test_type_keys_distinguish_types() {
        assert_ne!(TypeKey::of::<Database>(), TypeKey::of::<Renamed>());
        assert_eq!(TypeKey::of::<Database>(), TypeKey::of::<Database>());
    }
}
