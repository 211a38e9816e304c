//! Field descriptors for configuration models.

use serde_json::Value;

use super::{ConfigModel, TypeKey};
use crate::constants::DEFAULT_OBFUSCATION_SALT;

/// Declared JSON shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Text,
    Integer,
    Float,
    Boolean,
    Object,
    List,
    /// Any JSON value; never transformed.
    Any,
}

impl ValueType {
    pub fn is_textual(self) -> bool {
        matches!(self, Self::Text)
    }

    /// Whether a transform may be declared on fields of this type.
    pub fn is_transformable(self) -> bool {
        matches!(self, Self::Text | Self::Integer)
    }

    /// The value a best-effort decode falls back to.
    pub fn zero_value(self, nullable: bool) -> Value {
        if nullable {
            return Value::Null;
        }
        match self {
            Self::Text => Value::String(String::new()),
            Self::Integer => Value::from(0),
            Self::Float => Value::from(0.0),
            Self::Boolean => Value::Bool(false),
            Self::Object => Value::Object(serde_json::Map::new()),
            Self::List => Value::Array(Vec::new()),
            Self::Any => Value::Null,
        }
    }
}

/// Reversible transform applied to a field during encode/decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TransformKind {
    #[default]
    None,
    /// Circular character shift, base64 wrapped.
    Obfuscate { salt: i32 },
    /// AES-256-GCM; `key`/`iv` are UTF-8 strings of 32/12 bytes, or the codec defaults when absent.
    Encrypt {
        key: Option<String>,
        iv: Option<String>,
        embed_iv: bool,
    },
    /// Gzip, base64 wrapped.
    Compress,
}

impl TransformKind {
    pub fn obfuscate() -> Self {
        Self::Obfuscate {
            salt: DEFAULT_OBFUSCATION_SALT,
        }
    }

    pub fn encrypt() -> Self {
        Self::Encrypt {
            key: None,
            iv: None,
            embed_iv: true,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Obfuscate { .. } => "obfuscate",
            Self::Encrypt { .. } => "encrypt",
            Self::Compress => "compress",
        }
    }
}

/// A nested model referenced by an object or list field.
#[derive(Debug, Clone, Copy)]
pub struct NestedModel {
    pub(crate) key: TypeKey,
    pub(crate) fields: fn() -> Vec<FieldSpec>,
}

impl NestedModel {
    pub fn of<M: ConfigModel>() -> Self {
        Self {
            key: TypeKey::of::<M>(),
            fields: M::fields,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }
}

/// Declaration of one field of a configuration model.
///
/// `name` is the key as it appears in the JSON document. Builders are
/// chained from a typed constructor:
///
/// ```
/// use strongbox_config::FieldSpec;
///
/// let fields = vec![
///     FieldSpec::text("Password"),
///     FieldSpec::text("PasswordDecrypted"),
///     FieldSpec::integer("Port").obfuscated(77),
///     FieldSpec::text("Query").compressed(),
/// ];
/// assert_eq!(fields.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    value_type: ValueType,
    nullable: bool,
    decrypt_from: Option<String>,
    transform: TransformKind,
    nested: Option<NestedModel>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            nullable: false,
            decrypt_from: None,
            transform: TransformKind::None,
            nested: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Text)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Boolean)
    }

    pub fn list(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::List)
    }

    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Any)
    }

    /// An object field whose value is the nested model `M`.
    pub fn object<M: ConfigModel>(name: impl Into<String>) -> Self {
        let mut spec = Self::new(name, ValueType::Object);
        spec.nested = Some(NestedModel::of::<M>());
        spec
    }

    /// A list field whose elements are the nested model `M`.
    pub fn list_of<M: ConfigModel>(name: impl Into<String>) -> Self {
        let mut spec = Self::new(name, ValueType::List);
        spec.nested = Some(NestedModel::of::<M>());
        spec
    }

    /// Marks the field as optional; failed decodes then yield `null`.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Decrypts the named source field into this one at resolution time.
    pub fn decrypt_from(mut self, source: impl Into<String>) -> Self {
        self.decrypt_from = Some(source.into());
        self
    }

    pub fn with_transform(mut self, transform: TransformKind) -> Self {
        self.transform = transform;
        self
    }

    pub fn obfuscated(self, salt: i32) -> Self {
        self.with_transform(TransformKind::Obfuscate { salt })
    }

    /// Encrypts with the codec's default key material.
    pub fn encrypted(self) -> Self {
        self.with_transform(TransformKind::encrypt())
    }

    /// Encrypts with a key and IV fixed by the declaration.
    pub fn encrypted_with(
        self,
        key: impl Into<String>,
        iv: Option<String>,
        embed_iv: bool,
    ) -> Self {
        self.with_transform(TransformKind::Encrypt {
            key: Some(key.into()),
            iv,
            embed_iv,
        })
    }

    pub fn compressed(self) -> Self {
        self.with_transform(TransformKind::Compress)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn decrypt_source(&self) -> Option<&str> {
        self.decrypt_from.as_deref()
    }

    pub fn transform(&self) -> &TransformKind {
        &self.transform
    }

    pub fn nested(&self) -> Option<&NestedModel> {
        self.nested.as_ref()
    }

    /// ASCII case-insensitive name comparison, as used for document keys.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}
