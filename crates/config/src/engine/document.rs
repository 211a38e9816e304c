//! Locating and reading configuration documents under a content root.
//!
//! Responsibilities:
//! - Find the `Config` directory and document files, case-insensitively.
//! - Build base and override document file names.
//! - Read and parse one document into a `serde_json::Value`.
//!
//! Does NOT handle:
//! - Merging documents (see `merge.rs`).
//! - Deciding whether a missing document is fatal (see `registry.rs`).
//!
//! Invariants:
//! - An exact file name match is preferred over a case-insensitive one.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::constants::{CONFIG_DIR_NAME, DOCUMENT_EXTENSION};

/// Errors that can occur when reading a document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Failed to read document at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse document at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// `<name>.json`
pub fn base_file_name(name: &str) -> String {
    format!("{}.{}", name, DOCUMENT_EXTENSION)
}

/// `<name>.<segment>.json`
pub fn override_file_name(name: &str, segment: &str) -> String {
    format!("{}.{}.{}", name, segment, DOCUMENT_EXTENSION)
}

/// Returns the `Config` directory under `root`, matched case-insensitively.
pub fn config_dir(root: &Path) -> Option<PathBuf> {
    let exact = root.join(CONFIG_DIR_NAME);
    if exact.is_dir() {
        return Some(exact);
    }
    find_entry(root, CONFIG_DIR_NAME).filter(|path| path.is_dir())
}

/// Returns the file named `file_name` in `dir`, matched case-insensitively.
pub fn find_document(dir: &Path, file_name: &str) -> Option<PathBuf> {
    let exact = dir.join(file_name);
    if exact.is_file() {
        return Some(exact);
    }
    find_entry(dir, file_name).filter(|path| path.is_file())
}

fn find_entry(dir: &Path, name: &str) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    entries
        .filter_map(Result::ok)
        .find(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
        })
        .map(|entry| entry.path())
}

/// Reads and parses the JSON document at `path`.
pub fn read_document(path: &Path) -> Result<Value, DocumentError> {
    let content = std::fs::read_to_string(path).map_err(|e| DocumentError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&content).map_err(|e| DocumentError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}
