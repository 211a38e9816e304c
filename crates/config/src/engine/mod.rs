//! Configuration resolution: load, merge, decode, decrypt, and cache.
//!
//! Responsibilities:
//! - Locate `<root>/Config/<Name>.json` and the environment override next to it.
//! - Merge the override onto the base document.
//! - Invert field transforms and decrypt bound fields before deserializing.
//! - Publish one `Arc<T>` per model type for the life of a `ConfigRegistry`.
//!
//! Does NOT handle:
//! - Watching files; instances only change through `reload`.
//! - Writing configuration documents back to disk.
//!
//! Invariants:
//! - Resolution for a type runs at most once until it is reloaded.
//! - A failed resolution is cached and returned to every later caller.
//! - A missing or malformed override never fails resolution.

mod decrypt;
mod document;
mod error;
mod merge;
mod registry;
mod root;

pub use document::{DocumentError, base_file_name, override_file_name, read_document};
pub use error::ConfigError;
pub use merge::merge_documents;
pub use registry::{ConfigRegistry, ConfigRegistryBuilder, LoadedDocument, ResolutionState};
pub use root::{discover_content_root, strip_build_output};
