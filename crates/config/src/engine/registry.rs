//! Per-type configuration instances, resolved once and shared.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::decrypt::apply_decryptions;
use super::document::{
    base_file_name, config_dir, find_document, override_file_name, read_document,
};
use super::error::ConfigError;
use super::merge::merge_documents;
use super::root::discover_content_root;
use crate::constants::{CONFIG_DIR_NAME, IV_VAR, KEY_VAR, PASSWORD_SALT_VAR, PASSWORD_VAR};
use crate::convert::Codec;
use crate::environment::{EnvironmentIdentity, env_var_or_none};
use crate::schema::{ConfigModel, FieldMetadataSet, MetadataCache, TypeKey};
use crate::transform::{CipherKeys, KeySource, TransformError};

type Outcome = Result<Arc<dyn Any + Send + Sync>, ConfigError>;

#[derive(Default)]
struct InstanceSlot {
    cell: OnceLock<Outcome>,
    resolving: AtomicBool,
}

/// Observable lifecycle of one model type within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Unresolved,
    Resolving,
    /// Terminal until `reload`; holds either the instance or the cached failure.
    Resolved,
}

/// The merged, not yet decoded, document for one configuration name.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub value: Value,
    pub base_path: PathBuf,
    pub override_path: Option<PathBuf>,
}

/// Holds one resolved instance per model type.
///
/// The first `current::<T>()` call reads, merges, decodes, and decrypts the
/// documents for `T`; concurrent first callers wait for that single
/// resolution. Later calls return the same `Arc` until `reload::<T>()`,
/// even if the files change.
pub struct ConfigRegistry {
    content_root: Option<PathBuf>,
    environment: EnvironmentIdentity,
    codec: Codec,
    instances: RwLock<HashMap<TypeKey, Arc<InstanceSlot>>>,
}

impl fmt::Debug for ConfigRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let instances = self
            .instances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("ConfigRegistry")
            .field("content_root", &self.content_root)
            .field("environment", &self.environment)
            .field("codec", &self.codec)
            .field("instances", &instances)
            .finish()
    }
}

/// Builder for `ConfigRegistry`.
#[derive(Debug, Default)]
pub struct ConfigRegistryBuilder {
    content_root: Option<PathBuf>,
    environment: Option<EnvironmentIdentity>,
    key_source: Option<KeySource>,
    metadata: Option<Arc<MetadataCache>>,
}

impl ConfigRegistryBuilder {
    /// Fixes the content root. Without it the root is discovered on each resolution.
    pub fn content_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.content_root = Some(root.into());
        self
    }

    /// Overrides the process environment identity.
    pub fn environment(mut self, environment: EnvironmentIdentity) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Sets the default key material used for decryption and encrypted fields.
    pub fn keys(self, keys: CipherKeys) -> Self {
        self.key_source(KeySource::Static(keys))
    }

    pub fn key_source(mut self, source: KeySource) -> Self {
        self.key_source = Some(source);
        self
    }

    /// Uses a private metadata cache instead of the process-wide one.
    pub fn metadata_cache(mut self, cache: Arc<MetadataCache>) -> Self {
        self.metadata = Some(cache);
        self
    }

    /// Builds the registry, resolving the key source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::KeyMaterial` if the key source cannot be resolved.
    pub fn build(mut self) -> Result<ConfigRegistry, ConfigError> {
        let keys = match self.key_source.take() {
            Some(source) => Some(source.resolve().map_err(ConfigError::KeyMaterial)?),
            None => None,
        };
        Ok(self.assemble(keys))
    }

    fn assemble(self, keys: Option<CipherKeys>) -> ConfigRegistry {
        let metadata = self
            .metadata
            .unwrap_or_else(|| Arc::clone(MetadataCache::global()));
        let mut codec = Codec::new(metadata);
        if let Some(keys) = keys {
            codec = codec.with_keys(keys);
        }
        ConfigRegistry {
            content_root: self.content_root,
            environment: self
                .environment
                .unwrap_or_else(|| EnvironmentIdentity::current().clone()),
            codec,
            instances: RwLock::new(HashMap::new()),
        }
    }
}

static GLOBAL: OnceLock<ConfigRegistry> = OnceLock::new();

impl ConfigRegistry {
    pub fn builder() -> ConfigRegistryBuilder {
        ConfigRegistryBuilder::default()
    }

    /// Builds a registry from process environment variables.
    ///
    /// Default keys come from `STRONGBOX_KEY` / `STRONGBOX_IV` when the key is
    /// set, otherwise from `STRONGBOX_PASSWORD` / `STRONGBOX_PASSWORD_SALT`
    /// when a password is set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::KeyMaterial` for malformed key variables or a
    /// password without a usable salt.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::builder();
        if env_var_or_none(KEY_VAR).is_some() {
            builder = builder.key_source(KeySource::Env {
                key_var: KEY_VAR.to_string(),
                iv_var: IV_VAR.to_string(),
            });
        } else if let Some(password) = env_var_or_none(PASSWORD_VAR) {
            let salt = env_var_or_none(PASSWORD_SALT_VAR).ok_or_else(|| {
                ConfigError::KeyMaterial(TransformError::InvalidParameter(format!(
                    "{} is set but {} is not",
                    PASSWORD_VAR, PASSWORD_SALT_VAR
                )))
            })?;
            builder = builder.key_source(KeySource::Password {
                password: SecretString::new(password.into()),
                salt: salt.into_bytes(),
            });
        }
        builder.build()
    }

    /// The process-wide registry.
    ///
    /// Built with `from_env` on first use unless `install_global` ran earlier.
    /// Invalid key variables are logged and the registry runs without default keys.
    pub fn global() -> &'static ConfigRegistry {
        GLOBAL.get_or_init(|| {
            Self::from_env().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring invalid default key material");
                Self::builder().assemble(None)
            })
        })
    }

    /// Installs `registry` as the process-wide registry.
    ///
    /// Returns the registry back if one is already installed or in use.
    pub fn install_global(registry: ConfigRegistry) -> Result<(), ConfigRegistry> {
        GLOBAL.set(registry)
    }

    pub fn environment(&self) -> &EnvironmentIdentity {
        &self.environment
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Returns the content root, discovering it when none was configured.
    pub fn content_root(&self) -> Result<PathBuf, ConfigError> {
        match &self.content_root {
            Some(root) => Ok(root.clone()),
            None => discover_content_root()
                .map_err(|e| ConfigError::ContentRootUnavailable(format!("{:#}", e))),
        }
    }

    /// Returns the shared instance of `T`, resolving it on first use.
    ///
    /// # Errors
    ///
    /// Returns the failure of the first resolution, which is cached until
    /// `reload::<T>()`: `ConfigError::Load` for a missing, unreadable, or
    /// malformed base document or a document that does not fit `T`, and
    /// `ConfigError::Schema` for invalid field annotations.
    pub fn current<T>(&self) -> Result<Arc<T>, ConfigError>
    where
        T: ConfigModel + DeserializeOwned + Send + Sync,
    {
        let slot = self.slot(TypeKey::of::<T>());
        let outcome = slot.cell.get_or_init(|| {
            slot.resolving.store(true, Ordering::Release);
            let outcome = self
                .resolve::<T>()
                .map(|instance| instance as Arc<dyn Any + Send + Sync>);
            slot.resolving.store(false, Ordering::Release);
            outcome
        });

        match outcome {
            Ok(instance) => Arc::clone(instance).downcast::<T>().map_err(|_| {
                ConfigError::load(
                    T::document_name(),
                    Path::new(""),
                    "cached instance has an unexpected type",
                )
            }),
            Err(e) => {
                tracing::debug!(
                    type_name = T::document_name(),
                    "Returning cached resolution failure"
                );
                Err(e.clone())
            }
        }
    }

    pub fn state<T: ConfigModel>(&self) -> ResolutionState {
        let instances = self
            .instances
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match instances.get(&TypeKey::of::<T>()) {
            Some(slot) if slot.cell.get().is_some() => ResolutionState::Resolved,
            Some(slot) if slot.resolving.load(Ordering::Acquire) => ResolutionState::Resolving,
            _ => ResolutionState::Unresolved,
        }
    }

    /// Drops the cached instance (or failure) of `T`.
    ///
    /// Callers holding the previous `Arc` keep it; the next `current` resolves again.
    pub fn invalidate<T: ConfigModel>(&self) {
        let removed = self
            .instances
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&TypeKey::of::<T>());
        if removed.is_some() {
            tracing::debug!(type_name = T::document_name(), "Invalidated configuration");
        }
    }

    /// Forces re-resolution of `T` from the current files.
    pub fn reload<T>(&self) -> Result<Arc<T>, ConfigError>
    where
        T: ConfigModel + DeserializeOwned + Send + Sync,
    {
        self.invalidate::<T>();
        self.current::<T>()
    }

    /// Reads the base document for `name` and merges the environment override onto it.
    ///
    /// A missing override is skipped; a malformed one, or one whose top level
    /// is not an object, is logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` when the base document is missing,
    /// unreadable, or malformed.
    pub fn load_merged(&self, name: &str) -> Result<LoadedDocument, ConfigError> {
        self.load_document(name, true)
    }

    fn load_document(
        &self,
        name: &str,
        with_override: bool,
    ) -> Result<LoadedDocument, ConfigError> {
        let root = self.content_root()?;
        let dir = config_dir(&root);
        let base_path = dir
            .as_deref()
            .and_then(|dir| find_document(dir, &base_file_name(name)))
            .unwrap_or_else(|| root.join(CONFIG_DIR_NAME).join(base_file_name(name)));

        let mut value =
            read_document(&base_path).map_err(|e| ConfigError::load(name, &base_path, e))?;
        tracing::debug!(type_name = name, path = %base_path.display(), "Read base document");

        let override_path = match (with_override, self.environment.segment(), dir.as_deref()) {
            (true, Some(segment), Some(dir)) => {
                self.merge_override(name, segment, dir, &mut value)
            }
            _ => None,
        };

        Ok(LoadedDocument {
            value,
            base_path,
            override_path,
        })
    }

    fn merge_override(
        &self,
        name: &str,
        segment: &str,
        dir: &Path,
        value: &mut Value,
    ) -> Option<PathBuf> {
        let path = find_document(dir, &override_file_name(name, segment))?;
        match read_document(&path) {
            Ok(overlay @ Value::Object(_)) => {
                merge_documents(value, overlay);
                tracing::debug!(
                    type_name = name,
                    environment = segment,
                    path = %path.display(),
                    "Merged override document"
                );
                Some(path)
            }
            Ok(_) => {
                tracing::warn!(
                    type_name = name,
                    environment = segment,
                    path = %path.display(),
                    "Ignoring override document whose top level is not an object"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    type_name = name,
                    environment = segment,
                    error = %e,
                    "Ignoring unreadable override document"
                );
                None
            }
        }
    }

    fn resolve<T>(&self) -> Result<Arc<T>, ConfigError>
    where
        T: ConfigModel + DeserializeOwned,
    {
        let name = T::document_name();
        let meta = self.codec.metadata_cache().resolve::<T>()?;
        let loaded = self.load_merged(name)?;

        let (instance, loaded) = match self.materialize::<T>(&meta, loaded.value.clone()) {
            Ok(instance) => (instance, loaded),
            Err(merged_err) => {
                let Some(override_path) = loaded.override_path else {
                    return Err(ConfigError::load(name, &loaded.base_path, merged_err));
                };
                tracing::warn!(
                    type_name = name,
                    path = %override_path.display(),
                    error = %merged_err,
                    "Override document does not fit the model; using base document only"
                );
                let base = self.load_document(name, false)?;
                let instance = self.materialize::<T>(&meta, base.value.clone()).map_err(|e| {
                    ConfigError::load(
                        name,
                        &base.base_path,
                        format_args!(
                            "{} (merged with override {}: {})",
                            e,
                            override_path.display(),
                            merged_err
                        ),
                    )
                })?;
                (instance, base)
            }
        };

        tracing::info!(
            type_name = name,
            path = %loaded.base_path.display(),
            override_path = ?loaded.override_path,
            environment = %self.environment,
            "Resolved configuration"
        );
        Ok(Arc::new(instance))
    }

    /// Decodes transforms, applies decryptions, and deserializes `value` into `T`.
    fn materialize<T: DeserializeOwned>(
        &self,
        meta: &FieldMetadataSet,
        mut value: Value,
    ) -> Result<T, serde_json::Error> {
        self.codec.decode_in_place(meta, &mut value);
        apply_decryptions(meta, &mut value, self.codec.keys());
        serde_json::from_value(value)
    }

    fn slot(&self, key: TypeKey) -> Arc<InstanceSlot> {
        if let Some(slot) = self
            .instances
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Arc::clone(slot);
        }
        let mut instances = self.instances.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(instances.entry(key).or_default())
    }
}
