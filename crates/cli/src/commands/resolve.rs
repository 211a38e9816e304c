//! Preview of the merged configuration document for one name.

use std::path::PathBuf;

use anyhow::{Context, Result};
use strongbox_config::{ConfigRegistry, EnvironmentIdentity};

pub fn run(name: &str, root: Option<PathBuf>, environment: Option<String>) -> Result<String> {
    let mut builder = ConfigRegistry::builder().environment(
        environment
            .map(EnvironmentIdentity::new)
            .unwrap_or_else(EnvironmentIdentity::from_env),
    );
    if let Some(root) = root {
        builder = builder.content_root(root);
    }
    let registry = builder.build().context("Failed to build configuration registry")?;

    let loaded = registry
        .load_merged(name)
        .with_context(|| format!("Failed to resolve configuration '{}'", name))?;
    tracing::debug!(
        base = %loaded.base_path.display(),
        override_path = ?loaded.override_path,
        "Loaded documents"
    );

    serde_json::to_string_pretty(&loaded.value).context("Failed to render merged document")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_merges_override() {
        let root = TempDir::new().unwrap();
        let config = root.path().join("Config");
        fs::create_dir(&config).unwrap();
        fs::write(config.join("App.json"), r#"{"Color": "blue", "Age": 1}"#).unwrap();
        fs::write(config.join("App.Prod.json"), r#"{"Color": "orange"}"#).unwrap();

        let output = run(
            "App",
            Some(root.path().to_path_buf()),
            Some("Prod".to_string()),
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value, serde_json::json!({"Color": "orange", "Age": 1}));
    }

    #[test]
    fn test_resolve_missing_document_fails() {
        let root = TempDir::new().unwrap();
        let err = run("Missing", Some(root.path().to_path_buf()), None).unwrap_err();
        assert!(format!("{:#}", err).contains("Missing"));
    }
}
