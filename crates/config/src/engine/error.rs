//! Errors surfaced by configuration resolution.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::schema::SchemaError;
use crate::transform::TransformError;

/// Errors returned by `ConfigRegistry`.
///
/// `Clone` so a cached failure can be handed to every later caller.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration {type_name} from {}: {message}", path.display())]
    Load {
        type_name: String,
        path: PathBuf,
        message: String,
    },

    #[error("Invalid configuration schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("Content root unavailable: {0}")]
    ContentRootUnavailable(String),

    #[error("Invalid default key material: {0}")]
    KeyMaterial(#[source] TransformError),
}

impl ConfigError {
    pub(crate) fn load(type_name: &str, path: &Path, message: impl fmt::Display) -> Self {
        Self::Load {
            type_name: type_name.to_string(),
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}
