//! Error types for schema resolution.

use thiserror::Error;

/// Invalid explicit annotations on a model, reported at first resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{type_name}.{field}: decrypt source '{source_field}' does not exist")]
    MissingSource {
        type_name: String,
        field: String,
        source_field: String,
    },

    #[error("{type_name}.{field}: decrypt source '{source_field}' is not a text field")]
    IncompatibleSource {
        type_name: String,
        field: String,
        source_field: String,
    },

    #[error("{type_name}.{field}: {transform} transform is not supported on this field type")]
    IncompatibleTransform {
        type_name: String,
        field: String,
        transform: &'static str,
    },

    /// A transform parameter in the declaration is invalid (e.g. non-positive salt).
    #[error("{type_name}.{field}: invalid parameter: {message}")]
    InvalidParameter {
        type_name: String,
        field: String,
        message: String,
    },
}
