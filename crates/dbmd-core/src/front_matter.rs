/*
 * front_matter.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Split a document into YAML front matter and markdown body.
 */

//! Front matter extraction.
//!
//! A document may start with a YAML block delimited by `---` lines:
//!
//! ```markdown
//! ---
//! database: ./sales.db
//! dbType: sqlite
//! showQuery: true
//! ---
//!
//! # Report
//! ```
//!
//! Extraction fails softly: a document without a leading delimiter, or
//! whose opening delimiter is never closed, has empty front matter and a
//! body equal to the whole text. Only YAML that is present but malformed
//! is an error.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// Recognized key: database path, relative to the document.
pub const KEY_DATABASE: &str = "database";
/// Recognized key: backend name (`sqlite` or `duckdb`).
pub const KEY_DB_TYPE: &str = "dbType";
/// Recognized key: whether fragments show the query text.
pub const KEY_SHOW_QUERY: &str = "showQuery";

const DELIMITER: &str = "---";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FrontMatterError {
    #[error("Invalid front matter: {0}")]
    InvalidYaml(String),

    #[error("Invalid front matter: expected a mapping of keys to values")]
    NotAMapping,
}

/// Key/value configuration from a document's front matter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    entries: Mapping,
}

impl FrontMatter {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Declared database path. Empty strings count as absent.
    pub fn database(&self) -> Option<String> {
        self.scalar_text(KEY_DATABASE)
    }

    /// Declared backend name. Empty strings count as absent.
    pub fn db_type(&self) -> Option<String> {
        self.scalar_text(KEY_DB_TYPE)
    }

    /// `showQuery` is on only when it is literally `true`.
    pub fn show_query(&self) -> bool {
        matches!(self.get(KEY_SHOW_QUERY), Some(Value::Bool(true)))
    }

    fn scalar_text(&self, key: &str) -> Option<String> {
        let text = match self.get(key)? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Split raw document text into front matter and body.
///
/// The body is a slice of `raw`, so offsets found in it stay meaningful
/// relative to the body alone.
pub fn extract(raw: &str) -> Result<(FrontMatter, &str), FrontMatterError> {
    let Some((yaml, body)) = split(raw) else {
        return Ok((FrontMatter::default(), raw));
    };

    if yaml.trim().is_empty() {
        return Ok((FrontMatter::default(), body));
    }

    let entries = match serde_yaml::from_str::<Value>(yaml)
        .map_err(|e| FrontMatterError::InvalidYaml(e.to_string()))?
    {
        Value::Mapping(map) => map,
        Value::Null => Mapping::new(),
        _ => return Err(FrontMatterError::NotAMapping),
    };

    Ok((FrontMatter { entries }, body))
}

/// Locate the YAML text and the body, if the document has front matter.
fn split(raw: &str) -> Option<(&str, &str)> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let offset = raw.len() - text.len();

    let (first, rest_start) = next_line(text, 0);
    if first.trim_end() != DELIMITER {
        return None;
    }

    let mut pos = rest_start;
    while pos < text.len() {
        let (line, next) = next_line(text, pos);
        if line.trim_end() == DELIMITER {
            let yaml = &text[rest_start..pos];
            let body = &raw[offset + next..];
            return Some((yaml, body));
        }
        pos = next;
    }

    None
}

/// Return the line starting at `start` (without its terminator) and the
/// offset of the following line.
fn next_line(text: &str, start: usize) -> (&str, usize) {
    match text[start..].find('\n') {
        Some(i) => (&text[start..start + i], start + i + 1),
        None => (&text[start..], text.len()),
    }
}
