/*
 * executor/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Query execution backends.
 */

//! Query execution backends.
//!
//! Each SQL fence is executed against the database declared in the
//! document's front matter. The backend is a closed set of variants
//! ([`Backend`]); each variant has one [`QueryExecutor`] implementation:
//!
//! - [`SqliteExecutor`] - read-only connection through sqlx
//! - [`DuckDbExecutor`] - one `duckdb -json` process per query
//!
//! Executors hand out a [`QueryHandle`] at connect time. A handle lives for
//! exactly one transformation cycle and is closed at the end of it.
//!
//! The inline render hook cannot await, so it bypasses executors and calls
//! the backend CLI synchronously through [`cli::run_blocking`].
//!
//! # Backend resolution
//!
//! | Source | Precedence |
//! |--------|------------|
//! | `dbType` front matter | highest |
//! | `default-database-type` setting | |
//! | `sqlite` | fallback |

pub mod cli;
mod duckdb;
mod registry;
mod row;
mod sqlite;
mod traits;

use std::fmt;

pub use duckdb::DuckDbExecutor;
pub use registry::ExecutorRegistry;
pub use row::{Row, display_value};
pub use sqlite::SqliteExecutor;
pub use traits::{QueryExecutor, QueryHandle, close_handle};

use crate::error::DocumentError;

/// A database engine and its access method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Sqlite,
    DuckDb,
}

impl Backend {
    /// All known backends.
    pub const ALL: [Backend; 2] = [Backend::Sqlite, Backend::DuckDb];

    /// Name used in front matter and settings.
    pub fn name(self) -> &'static str {
        match self {
            Backend::Sqlite => "sqlite",
            Backend::DuckDb => "duckdb",
        }
    }

    /// Look up a backend by its exact name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    /// Program name of the backend's command-line client.
    pub fn cli_program(self) -> &'static str {
        match self {
            Backend::Sqlite => "sqlite3",
            Backend::DuckDb => "duckdb",
        }
    }

    /// Pick the backend for a document.
    ///
    /// `declared` is the `dbType` front matter value, `default` the global
    /// setting. Whichever applies must name a known backend.
    pub fn resolve(declared: Option<&str>, default: Option<&str>) -> Result<Self, DocumentError> {
        let name = declared
            .or(default)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(Backend::Sqlite.name());
        Self::from_name(name).ok_or_else(|| DocumentError::UnsupportedBackend(name.to_string()))
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults_to_sqlite() {
        assert_eq!(Backend::resolve(None, None).unwrap(), Backend::Sqlite);
    }

    #[test]
    fn test_resolve_uses_setting_when_undeclared() {
        assert_eq!(
            Backend::resolve(None, Some("duckdb")).unwrap(),
            Backend::DuckDb
        );
    }

    #[test]
    fn test_resolve_front_matter_wins() {
        assert_eq!(
            Backend::resolve(Some("sqlite"), Some("duckdb")).unwrap(),
            Backend::Sqlite
        );
    }

    #[test]
    fn test_resolve_unknown() {
        let err = Backend::resolve(Some("postgres"), None).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported database type: postgres");
    }

    #[test]
    fn test_resolve_invalid_setting() {
        let err = Backend::resolve(None, Some("oracle")).unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedBackend(ref t) if t == "oracle"));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert_eq!(Backend::from_name("SQLite"), None);
        assert_eq!(Backend::from_name("duckdb"), Some(Backend::DuckDb));
    }

    #[test]
    fn test_display() {
        assert_eq!(Backend::DuckDb.to_string(), "duckdb");
        assert_eq!(Backend::Sqlite.cli_program(), "sqlite3");
    }
}
