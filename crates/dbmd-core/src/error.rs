/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Error types for the dbmd rendering pipeline.
 */

//! Error types for the dbmd rendering pipeline.
//!
//! Errors fall into two scopes:
//!
//! - [`DocumentError`] aborts a whole transformation cycle. The preview shows
//!   an error banner instead of any partially spliced output.
//! - [`QueryError`] belongs to a single SQL block. It is rendered inline at
//!   that block's position and sibling blocks keep executing.
//!
//! Messages coming from a backend (driver error text, CLI standard error)
//! are carried verbatim so the user sees the original diagnostic.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to open a database handle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ConnectionError {
    /// Backend message, verbatim
    pub message: String,
}

impl ConnectionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure of a single query. Scoped to one SQL block.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct QueryError {
    /// Backend message, verbatim
    pub message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that abort a whole transformation cycle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// The front matter has no `database` key (or no front matter at all).
    #[error("No database path specified in frontmatter")]
    NoDatabaseDeclared,

    /// The resolved database path does not exist.
    #[error("Database file not found: {}", .0.display())]
    DatabaseFileNotFound(PathBuf),

    /// `dbType` (or the configured default) names no known backend.
    #[error("Unsupported database type: {0}")]
    UnsupportedBackend(String),

    /// The backend refused to open the database.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Any other failure during the cycle (unreadable document,
    /// malformed front matter, markdown rendering failure).
    #[error("{0}")]
    Render(String),
}

impl DocumentError {
    /// Create a catch-all render error.
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Text shown in the preview's error banner.
    pub fn banner(&self) -> String {
        format!("Error: {}", self)
    }
}

/// Errors loading [`Settings`](crate::config::Settings).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Errors from the preview controller's own operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PreviewError {
    /// The requested preview target is not a markdown document.
    #[error("Please open a markdown file to preview SQL results.")]
    NotMarkdown(PathBuf),

    /// An event source refused the subscription.
    #[error("Failed to subscribe to {source_name}: {message}")]
    Subscribe { source_name: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_error_messages() {
        assert_eq!(
            DocumentError::NoDatabaseDeclared.to_string(),
            "No database path specified in frontmatter"
        );
        assert_eq!(
            DocumentError::DatabaseFileNotFound(PathBuf::from("/data/test.db")).to_string(),
            "Database file not found: /data/test.db"
        );
        assert_eq!(
            DocumentError::UnsupportedBackend("mysql".to_string()).to_string(),
            "Unsupported database type: mysql"
        );
    }

    #[test]
    fn test_connection_error_is_transparent() {
        let err: DocumentError = ConnectionError::new("file is not a database").into();
        assert_eq!(err.to_string(), "file is not a database");
        assert!(matches!(err, DocumentError::Connection(_)));
    }

    #[test]
    fn test_banner_prefix() {
        let err = DocumentError::render("boom");
        assert_eq!(err.banner(), "Error: boom");
    }

    #[test]
    fn test_not_markdown_message() {
        let err = PreviewError::NotMarkdown(PathBuf::from("notes.txt"));
        assert_eq!(
            err.to_string(),
            "Please open a markdown file to preview SQL results."
        );
    }

    #[test]
    fn test_query_error_verbatim() {
        let err = QueryError::new("near \"SELEC\": syntax error");
        assert_eq!(err.to_string(), "near \"SELEC\": syntax error");
    }
}
