//! Run configuration.
//!
//! A [`RunConfig`] is resolved once in the orchestrator (TOML file, then CLI
//! overrides) and handed to every child process as JSON through the
//! [`CONFIG_ENV`] environment variable.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::HarnessError;

/// Environment variable carrying the serialized config to child processes.
pub const CONFIG_ENV: &str = "ISOTEST_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Only the scope with exactly this name runs.
    pub selected_scope: Option<String>,
    /// Only the test with exactly this name runs.
    pub selected_test: Option<String>,
    pub warnings: bool,
    /// Print every captured frame before a failure summary.
    pub backtrace: bool,
    /// Pause a failing child until it is interrupted.
    pub interactive_rescue: bool,
    pub database: DatabaseConfig,
}

/// Fixture database used by `db-reset` and `db-connect`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `sqlite://<path>` or `sqlite://:memory:`.
    pub url: Option<String>,
    /// Tables left untouched by a reset, in addition to `schema_migrations`.
    pub ignore_tables: Vec<String>,
}

impl RunConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, HarnessError> {
        let text = fs::read_to_string(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text).map_err(|source| HarnessError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), ?config, "loaded configuration file");
        Ok(config)
    }

    pub fn to_handoff(&self) -> Result<String, HarnessError> {
        serde_json::to_string(self).map_err(HarnessError::Handoff)
    }

    pub fn from_handoff(text: &str) -> Result<Self, HarnessError> {
        serde_json::from_str(text).map_err(HarnessError::Handoff)
    }

    /// Reads the hand-off variable; defaults when it is absent.
    pub fn from_env() -> Result<Self, HarnessError> {
        match std::env::var(CONFIG_ENV) {
            Ok(text) => Self::from_handoff(&text),
            Err(_) => Ok(Self::default()),
        }
    }
}
