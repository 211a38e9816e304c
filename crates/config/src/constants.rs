//! Centralized constants for the strongbox workspace.
//!
//! This module contains names and default values shared by the library and
//! the CLI so the document and environment conventions live in one place.

// =============================================================================
// Environment Variables
// =============================================================================

/// Variable that supplies the deployment environment identity.
pub const ENVIRONMENT_VAR: &str = "STRONGBOX_ENVIRONMENT";

/// Variable that pins the content root, bypassing executable-based discovery.
pub const CONTENT_ROOT_VAR: &str = "STRONGBOX_CONTENT_ROOT";

/// Variable holding the hex-encoded default encryption key.
pub const KEY_VAR: &str = "STRONGBOX_KEY";

/// Variable holding the hex-encoded default IV.
///
/// When set, payloads use this fixed IV instead of embedding their own.
pub const IV_VAR: &str = "STRONGBOX_IV";

/// Variable holding a password the default key is derived from when no key is set.
pub const PASSWORD_VAR: &str = "STRONGBOX_PASSWORD";

/// Variable holding the salt for password key derivation (at least 8 bytes).
pub const PASSWORD_SALT_VAR: &str = "STRONGBOX_PASSWORD_SALT";

// =============================================================================
// Document Layout
// =============================================================================

/// Directory under the content root that holds configuration documents.
pub const CONFIG_DIR_NAME: &str = "Config";

/// File extension of configuration documents.
pub const DOCUMENT_EXTENSION: &str = "json";

/// Directory names treated as build output when walking up to the content root.
pub const BUILD_OUTPUT_SEGMENTS: &[&str] = &["bin", "target"];

// =============================================================================
// Field Conventions
// =============================================================================

/// Suffixes that bind a field to the ciphertext field named by its prefix.
///
/// `PasswordDecrypted` and `PasswordDecrypt` both bind to `Password`.
pub const DECRYPT_SUFFIXES: &[&str] = &["Decrypted", "Decrypt"];

// =============================================================================
// Transform Defaults
// =============================================================================

/// Default shift applied by the obfuscation transform.
pub const DEFAULT_OBFUSCATION_SALT: i32 = 77;

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// AES-GCM nonce (IV) length in bytes.
pub const IV_LEN: usize = 12;
