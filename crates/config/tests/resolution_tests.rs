//! Integration tests for configuration resolution through `ConfigRegistry`.
//!
//! Each test builds its own content root in a temp directory and its own
//! registry and metadata cache, so tests do not share cached instances.
//!
//! Test coverage:
//! - Base + environment override merge (flat and nested)
//! - Convention and annotation decryption into target fields
//! - Transformed fields decoded during resolution
//! - Instance caching, failure caching, and reload
//! - Malformed or missing override documents

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tempfile::TempDir;

use strongbox_config::{
    CipherKeys, Codec, ConfigError, ConfigModel, ConfigRegistry, EnvironmentIdentity, FieldSpec,
    MetadataCache, ResolutionState,
};

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
struct Palette {
    color: String,
    age: i64,
}

impl ConfigModel for Palette {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Endpoint {
    host: String,
    port: i64,
}

impl ConfigModel for Endpoint {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Service {
    name: String,
    primary: Endpoint,
    fallback: Endpoint,
}

impl ConfigModel for Service {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("Name"),
            FieldSpec::object::<Endpoint>("Primary"),
            FieldSpec::object::<Endpoint>("Fallback"),
        ]
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Database {
    password: String,
    #[serde(default)]
    password_decrypted: String,
}

impl ConfigModel for Database {
    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("Password"),
            FieldSpec::text("PasswordDecrypted"),
        ]
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Vault {
    sealed: String,
    #[serde(default)]
    opened: String,
    port: i64,
    api_key: String,
}

impl ConfigModel for Vault {
    fn document_name() -> &'static str {
        "VaultSettings"
    }

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("Sealed"),
            FieldSpec::text("Opened").decrypt_from("Sealed"),
            FieldSpec::integer("Port").obfuscated(77),
            FieldSpec::text("ApiKey").encrypted(),
        ]
    }
}

#[derive(Debug)]
struct BrokenSchema;

impl ConfigModel for BrokenSchema {
    fn fields() -> Vec<FieldSpec> {
        vec![FieldSpec::text("Plain").decrypt_from("Missing")]
    }
}

impl<'de> Deserialize<'de> for BrokenSchema {
    fn deserialize<D: serde::Deserializer<'de>>(_: D) -> Result<Self, D::Error> {
        Ok(BrokenSchema)
    }
}

fn keys() -> CipherKeys {
    CipherKeys::new([42u8; 32])
}

fn write_doc(root: &Path, file_name: &str, contents: &str) {
    let dir = root.join("Config");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file_name), contents).unwrap();
}

fn registry(root: &Path, environment: &str) -> ConfigRegistry {
    ConfigRegistry::builder()
        .content_root(root)
        .environment(EnvironmentIdentity::new(environment))
        .keys(keys())
        .metadata_cache(Arc::new(MetadataCache::new()))
        .build()
        .expect("registry should build")
}

#[test]
fn test_override_replaces_present_values() {
    let root = TempDir::new().unwrap();
    write_doc(root.path(), "Palette.json", r#"{"Color": "blue", "Age": 1}"#);
    write_doc(root.path(), "Palette.Prod.json", r#"{"Color": "orange"}"#);

    let palette = registry(root.path(), "Prod").current::<Palette>().unwrap();
    assert_eq!(
        *palette,
        Palette {
            color: "orange".to_string(),
            age: 1
        }
    );
}

#[test]
fn test_empty_environment_uses_base_only() {
    let root = TempDir::new().unwrap();
    write_doc(root.path(), "Palette.json", r#"{"Color": "blue", "Age": 1}"#);
    write_doc(root.path(), "Palette.Prod.json", r#"{"Color": "orange"}"#);

    let palette = registry(root.path(), "").current::<Palette>().unwrap();
    assert_eq!(palette.color, "blue");
}

#[test]
fn test_nested_override_keeps_siblings() {
    let root = TempDir::new().unwrap();
    write_doc(
        root.path(),
        "service.json",
        r#"{
            "Name": "billing",
            "Primary": {"Host": "localhost", "Port": 8080},
            "Fallback": {"Host": "backup", "Port": 9090}
        }"#,
    );
    write_doc(
        root.path(),
        "Service.Test.json",
        r#"{"primary": {"host": "test-host"}}"#,
    );

    let service = registry(root.path(), "Test").current::<Service>().unwrap();
    assert_eq!(service.name, "billing");
    assert_eq!(service.primary.host, "test-host");
    assert_eq!(service.primary.port, 8080);
    assert_eq!(service.fallback.host, "backup");
}

#[test]
fn test_convention_decrypts_into_target() {
    let root = TempDir::new().unwrap();
    let token = keys().encrypt_text("hunter2").unwrap();
    write_doc(
        root.path(),
        "Database.json",
        &format!(r#"{{"Password": "{}"}}"#, token),
    );

    let db = registry(root.path(), "").current::<Database>().unwrap();
    assert_eq!(db.password_decrypted, "hunter2");
    assert_eq!(db.password, token);
}

#[test]
fn test_decrypt_failure_keeps_ciphertext() {
    let root = TempDir::new().unwrap();
    write_doc(root.path(), "Database.json", r#"{"Password": "plain-text"}"#);

    let db = registry(root.path(), "").current::<Database>().unwrap();
    assert_eq!(db.password_decrypted, "plain-text");
}

#[test]
fn test_annotations_and_transforms_resolved() {
    let root = TempDir::new().unwrap();
    let codec = Codec::new(Arc::new(MetadataCache::new())).with_keys(keys());
    let sealed = codec.encrypt_text("opened-value").unwrap();
    let api_key = codec.encrypt_text("sk-123").unwrap();
    let port = strongbox_config::transform::obfuscate("8443", 77).unwrap();
    let port = strongbox_config::transform::encode_token(port.as_bytes());
    write_doc(
        root.path(),
        "VaultSettings.json",
        &format!(
            r#"{{"Sealed": "{}", "Port": "{}", "ApiKey": "{}"}}"#,
            sealed, port, api_key
        ),
    );

    let vault = registry(root.path(), "").current::<Vault>().unwrap();
    assert_eq!(vault.opened, "opened-value");
    assert_eq!(vault.sealed, sealed);
    assert_eq!(vault.port, 8443);
    assert_eq!(vault.api_key, "sk-123");
}

#[test]
fn test_instance_is_cached_after_file_changes() {
    let root = TempDir::new().unwrap();
    write_doc(root.path(), "Palette.json", r#"{"Color": "blue", "Age": 1}"#);

    let registry = registry(root.path(), "");
    assert_eq!(registry.state::<Palette>(), ResolutionState::Unresolved);

    let first = registry.current::<Palette>().unwrap();
    assert_eq!(registry.state::<Palette>(), ResolutionState::Resolved);

    write_doc(root.path(), "Palette.json", r#"{"Color": "green", "Age": 2}"#);
    let second = registry.current::<Palette>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.color, "blue");

    let reloaded = registry.reload::<Palette>().unwrap();
    assert!(!Arc::ptr_eq(&first, &reloaded));
    assert_eq!(reloaded.color, "green");
    assert_eq!(first.color, "blue");
}

#[test]
fn test_missing_base_is_load_error_and_cached() {
    let root = TempDir::new().unwrap();
    let registry = registry(root.path(), "");

    let err = registry.current::<Palette>().unwrap_err();
    assert!(matches!(err, ConfigError::Load { .. }));
    assert_eq!(registry.state::<Palette>(), ResolutionState::Resolved);

    // The failure is cached even after the document appears.
    write_doc(root.path(), "Palette.json", r#"{"Color": "blue", "Age": 1}"#);
    assert!(registry.current::<Palette>().is_err());

    let palette = registry.reload::<Palette>().unwrap();
    assert_eq!(palette.color, "blue");
}

#[test]
fn test_malformed_base_is_load_error() {
    let root = TempDir::new().unwrap();
    write_doc(root.path(), "Palette.json", "{ not json");

    let err = registry(root.path(), "").current::<Palette>().unwrap_err();
    match err {
        ConfigError::Load { type_name, path, .. } => {
            assert_eq!(type_name, "Palette");
            assert!(path.ends_with("Palette.json"));
        }
        other => panic!("expected load error, got {other:?}"),
    }
}

#[test]
fn test_document_not_matching_type_is_load_error() {
    let root = TempDir::new().unwrap();
    write_doc(root.path(), "Palette.json", r#"{"Color": 5}"#);

    let err = registry(root.path(), "").current::<Palette>().unwrap_err();
    assert!(matches!(err, ConfigError::Load { .. }));
}

#[test]
fn test_malformed_override_is_ignored() {
    let root = TempDir::new().unwrap();
    write_doc(root.path(), "Palette.json", r#"{"Color": "blue", "Age": 1}"#);
    write_doc(root.path(), "Palette.Stage.json", "{ broken");

    let palette = registry(root.path(), "Stage").current::<Palette>().unwrap();
    assert_eq!(palette.color, "blue");
}

#[test]
fn test_override_with_wrong_shape_is_ignored() {
    for overlay in [r#"["x"]"#, r#""oops""#, r#"{"Color": {"Nested": 1}}"#] {
        let root = TempDir::new().unwrap();
        write_doc(root.path(), "Palette.json", r#"{"Color": "blue", "Age": 1}"#);
        write_doc(root.path(), "Palette.Prod.json", overlay);

        let registry = registry(root.path(), "Prod");
        let palette = registry
            .current::<Palette>()
            .unwrap_or_else(|e| panic!("override {overlay} should be ignored: {e}"));
        assert_eq!(
            *palette,
            Palette {
                color: "blue".to_string(),
                age: 1
            }
        );
    }
}

#[test]
fn test_non_object_override_is_not_merged() {
    let root = TempDir::new().unwrap();
    write_doc(root.path(), "Palette.json", r#"{"Color": "blue", "Age": 1}"#);
    write_doc(root.path(), "Palette.Prod.json", r#"["x"]"#);

    let loaded = registry(root.path(), "Prod").load_merged("Palette").unwrap();
    assert_eq!(loaded.value, serde_json::json!({"Color": "blue", "Age": 1}));
    assert!(loaded.override_path.is_none());
}

#[test]
fn test_type_mismatch_error_names_override() {
    let root = TempDir::new().unwrap();
    write_doc(root.path(), "Palette.json", r#"{"Color": 5, "Age": 1}"#);
    write_doc(root.path(), "Palette.Prod.json", r#"{"Age": "old"}"#);

    let err = registry(root.path(), "Prod").current::<Palette>().unwrap_err();
    match err {
        ConfigError::Load { path, message, .. } => {
            assert!(path.ends_with("Palette.json"));
            assert!(message.contains("Palette.Prod.json"), "message: {message}");
        }
        other => panic!("expected load error, got {other:?}"),
    }
}

#[test]
fn test_schema_error_surfaces_at_resolution() {
    let root = TempDir::new().unwrap();
    write_doc(root.path(), "BrokenSchema.json", "{}");

    let err = registry(root.path(), "").current::<BrokenSchema>().unwrap_err();
    assert!(matches!(err, ConfigError::Schema(_)));
}

#[test]
fn test_load_merged_reports_paths() {
    let root = TempDir::new().unwrap();
    write_doc(root.path(), "Palette.json", r#"{"Color": "blue", "Age": 1}"#);
    write_doc(root.path(), "palette.qa.json", r#"{"Age": 7}"#);

    let loaded = registry(root.path(), "QA").load_merged("Palette").unwrap();
    assert_eq!(loaded.value["Age"], 7);
    assert!(loaded.base_path.ends_with("Palette.json"));
    assert!(
        loaded
            .override_path
            .as_deref()
            .is_some_and(|p| p.ends_with("palette.qa.json"))
    );
}

#[test]
fn test_concurrent_first_callers_share_one_instance() {
    let root = TempDir::new().unwrap();
    write_doc(root.path(), "Palette.json", r#"{"Color": "blue", "Age": 1}"#);
    let registry = Arc::new(registry(root.path(), ""));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || registry.current::<Palette>().unwrap())
        })
        .collect();
    let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for instance in &instances[1..] {
        assert!(Arc::ptr_eq(&instances[0], instance));
    }
}
