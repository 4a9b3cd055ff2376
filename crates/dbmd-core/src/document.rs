/*
 * document.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Immutable document snapshot.
 */

//! Immutable document snapshot.

use std::path::{Component, Path, PathBuf};

/// A markdown document as it was at the start of a transformation.
///
/// Snapshots are read fresh for every transformation request and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    raw_text: String,
    source_path: PathBuf,
}

impl Document {
    pub fn new(raw_text: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            raw_text: raw_text.into(),
            source_path: source_path.into(),
        }
    }

    /// Read a snapshot from disk.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let raw_text = std::fs::read_to_string(path)?;
        Ok(Self::new(raw_text, path))
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Directory that relative database paths are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        let absolute =
            std::path::absolute(&self.source_path).unwrap_or_else(|_| self.source_path.clone());
        absolute
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Resolve a path declared in the document against its directory.
    ///
    /// Absolute paths are kept; relative ones are joined to the document's
    /// directory. `.` and `..` are folded lexically, since the target may
    /// not exist.
    pub fn resolve(&self, declared: &str) -> PathBuf {
        normalize_lexically(&self.base_dir().join(declared))
    }
}

/// Whether a path names a markdown document.
pub fn is_markdown_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `/..` stays at the root
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
