//! Typed, cached configuration loaded from JSON documents.
//!
//! This crate resolves configuration models from `<root>/Config/<Name>.json`,
//! merges an environment-specific override document onto the base, inverts
//! per-field transforms (obfuscation, encryption, compression), and decrypts
//! fields bound to ciphertext siblings before handing out a shared instance.
//!
//! ```no_run
//! use serde::Deserialize;
//! use strongbox_config::schema::{ConfigModel, FieldSpec};
//!
//! #[derive(Deserialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct Database {
//!     host: String,
//!     password: String,
//!     password_decrypted: String,
//! }
//!
//! impl ConfigModel for Database {
//!     fn fields() -> Vec<FieldSpec> {
//!         vec![
//!             FieldSpec::text("Host"),
//!             FieldSpec::text("Password"),
//!             FieldSpec::text("PasswordDecrypted"),
//!         ]
//!     }
//! }
//!
//! let db = strongbox_config::current::<Database>()?;
//! println!("{}", db.host);
//! # Ok::<(), strongbox_config::ConfigError>(())
//! ```

pub mod constants;
pub mod convert;
pub mod engine;
pub mod environment;
pub mod schema;
pub mod transform;

use std::sync::Arc;

use serde::de::DeserializeOwned;

pub use convert::{Codec, CodecError};
pub use engine::{ConfigError, ConfigRegistry, ConfigRegistryBuilder, ResolutionState};
pub use environment::{EnvironmentClass, EnvironmentIdentity, KnownEnvironment};
pub use schema::{ConfigModel, FieldSpec, MetadataCache, SchemaError, TransformKind, ValueType};
pub use transform::{CipherKeys, KeySource, TransformError};

/// Returns the shared instance of `T` from the process-wide registry.
pub fn current<T>() -> Result<Arc<T>, ConfigError>
where
    T: ConfigModel + DeserializeOwned + Send + Sync,
{
    ConfigRegistry::global().current::<T>()
}
