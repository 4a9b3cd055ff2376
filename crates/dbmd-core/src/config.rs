/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Global settings for dbmd.
 */

//! Global settings.
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`--config <file>`, or `dbmd.toml` beside the document)
//! 3. Environment variables (`DBMD_DEFAULT_DATABASE_TYPE`, `DBMD_DUCKDB`,
//!    `DBMD_SQLITE3`)
//! 4. Command-line flags, applied by the caller
//!
//! Document front matter (`dbType`) overrides `default-database-type` per
//! document; that happens during transformation, not here.
//!
//! ```toml
//! default-database-type = "duckdb"
//! debounce-ms = 250
//! duckdb-binary = "/opt/duckdb/bin/duckdb"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// File name looked up next to a document when no explicit config is given.
pub const CONFIG_FILE_NAME: &str = "dbmd.toml";

/// Default preview debounce window in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

const ENV_DEFAULT_DATABASE_TYPE: &str = "DBMD_DEFAULT_DATABASE_TYPE";
const ENV_DUCKDB: &str = "DBMD_DUCKDB";
const ENV_SQLITE3: &str = "DBMD_SQLITE3";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Settings {
    /// Backend used when a document has no `dbType`.
    ///
    /// Kept as raw text: an invalid value is reported as an unsupported
    /// database type when a document relies on it.
    pub default_database_type: Option<String>,

    /// Quiet window for coalescing preview refreshes.
    pub debounce_ms: u64,

    /// Explicit path to the `duckdb` CLI.
    pub duckdb_binary: Option<PathBuf>,

    /// Explicit path to the `sqlite3` CLI.
    pub sqlite3_binary: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_database_type: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            duckdb_binary: None,
            sqlite3_binary: None,
        }
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Read settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Load settings for a document.
    ///
    /// Uses `explicit` when given, otherwise `dbmd.toml` in the document's
    /// directory if one exists, otherwise the defaults. Environment
    /// overrides are applied last.
    pub fn load(explicit: Option<&Path>, document: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let candidate = document
                    .and_then(Path::parent)
                    .map(|dir| dir.join(CONFIG_FILE_NAME))
                    .filter(|p| p.is_file());
                match candidate {
                    Some(path) => {
                        debug!(path = %path.display(), "Using config file beside document");
                        Self::from_file(&path)?
                    }
                    None => Self::default(),
                }
            }
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Apply environment overrides through a lookup function.
    ///
    /// Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = get(ENV_DEFAULT_DATABASE_TYPE) {
            self.default_database_type = Some(value.trim().to_string());
        }
        if let Some(value) = get(ENV_DUCKDB) {
            self.duckdb_binary = Some(PathBuf::from(value));
        }
        if let Some(value) = get(ENV_SQLITE3) {
            self.sqlite3_binary = Some(PathBuf::from(value));
        }
    }

    /// Override the default database type (command-line flag).
    pub fn with_default_database_type(mut self, value: Option<String>) -> Self {
        if value.is_some() {
            self.default_database_type = value;
        }
        self
    }

    /// Override the debounce window (command-line flag).
    pub fn with_debounce_ms(mut self, value: Option<u64>) -> Result<Self, ConfigError> {
        if let Some(ms) = value {
            if ms == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "debounce-ms".to_string(),
                    value: ms.to_string(),
                });
            }
            self.debounce_ms = ms;
        }
        Ok(self)
    }
}
