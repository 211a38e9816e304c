//! Deployment environment identity.
//!
//! Responsibilities:
//! - Read the environment name from `STRONGBOX_ENVIRONMENT` once per process.
//! - Classify names into Local, Test-like, and Prod-like buckets.
//! - Provide the override-document segment for the resolution engine.
//! - Provide `env_var_or_none` for reading optional environment variables.
//!
//! Does NOT handle:
//! - Locating or merging documents (see `engine`).
//!
//! Invariants:
//! - Classification is exact and case-sensitive; anything unrecognised is Local.
//! - `EnvironmentIdentity::current()` never changes after its first call.
//! - Empty or whitespace-only environment variables are treated as unset.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use thiserror::Error;

use crate::constants::ENVIRONMENT_VAR;

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Bucket an environment name falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnvironmentClass {
    #[default]
    Local,
    TestLike,
    ProdLike,
}

impl fmt::Display for EnvironmentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::TestLike => "test",
            Self::ProdLike => "prod",
        })
    }
}

/// The closed set of recognised environment names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownEnvironment {
    Local,
    Test,
    Stage,
    Staging,
    Qa,
    At,
    Prod,
    Production,
}

impl KnownEnvironment {
    pub const ALL: [KnownEnvironment; 8] = [
        Self::Local,
        Self::Test,
        Self::Stage,
        Self::Staging,
        Self::Qa,
        Self::At,
        Self::Prod,
        Self::Production,
    ];

    /// The exact spelling recognised in `STRONGBOX_ENVIRONMENT`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "Local",
            Self::Test => "Test",
            Self::Stage => "Stage",
            Self::Staging => "Staging",
            Self::Qa => "QA",
            Self::At => "AT",
            Self::Prod => "Prod",
            Self::Production => "Production",
        }
    }

    pub fn class(self) -> EnvironmentClass {
        match self {
            Self::Local => EnvironmentClass::Local,
            Self::Test | Self::Stage | Self::Staging | Self::Qa | Self::At => {
                EnvironmentClass::TestLike
            }
            Self::Prod | Self::Production => EnvironmentClass::ProdLike,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown environment name: '{0}'")]
pub struct UnknownEnvironment(pub String);

impl FromStr for KnownEnvironment {
    type Err = UnknownEnvironment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|known| known.as_str() == s)
            .ok_or_else(|| UnknownEnvironment(s.to_string()))
    }
}

/// Classifies an environment name. Unrecognised and empty names are Local.
pub fn classify(name: &str) -> EnvironmentClass {
    name.parse::<KnownEnvironment>()
        .map(KnownEnvironment::class)
        .unwrap_or_default()
}

/// The current deployment environment name; empty when unset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct EnvironmentIdentity(String);

impl EnvironmentIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Process-wide identity, read from the environment on first call only.
    pub fn current() -> &'static EnvironmentIdentity {
        static CURRENT: OnceLock<EnvironmentIdentity> = OnceLock::new();
        CURRENT.get_or_init(Self::from_env)
    }

    /// Reads `STRONGBOX_ENVIRONMENT` without memoizing.
    pub fn from_env() -> Self {
        Self(env_var_or_none(ENVIRONMENT_VAR).unwrap_or_default())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn class(&self) -> EnvironmentClass {
        classify(&self.0)
    }

    pub fn is_local(&self) -> bool {
        self.class() == EnvironmentClass::Local
    }

    pub fn is_test_like(&self) -> bool {
        self.class() == EnvironmentClass::TestLike
    }

    pub fn is_prod_like(&self) -> bool {
        self.class() == EnvironmentClass::ProdLike
    }

    /// Segment inserted into override document names; `None` when no environment is set.
    pub fn segment(&self) -> Option<&str> {
        if self.0.is_empty() {
            None
        } else {
            Some(&self.0)
        }
    }
}

impl fmt::Display for EnvironmentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
