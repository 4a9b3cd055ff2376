/*
 * preview/tracker.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Shared record of which documents the user has been working on.
 */

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::document::is_markdown_path;

#[derive(Debug, Default)]
struct TrackerState {
    last_markdown: Option<PathBuf>,
    focused: Option<PathBuf>,
}

/// Last known markdown document and currently focused document.
///
/// Cloning shares the same state. The controller writes it; the inline
/// render hook reads it to find a document when the host gives none.
#[derive(Debug, Clone, Default)]
pub struct DocumentTracker {
    state: Arc<RwLock<TrackerState>>,
}

impl DocumentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `path` became the active document.
    pub fn record_active(&self, path: &Path) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.focused = Some(path.to_path_buf());
        if is_markdown_path(path) {
            state.last_markdown = Some(path.to_path_buf());
        }
    }

    pub fn last_markdown(&self) -> Option<PathBuf> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.last_markdown.clone()
    }

    pub fn focused(&self) -> Option<PathBuf> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.focused.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_markdown_only_moves_focus() {
        let tracker = DocumentTracker::new();
        tracker.record_active(Path::new("/w/report.md"));
        tracker.record_active(Path::new("/w/data.csv"));

        assert_eq!(tracker.last_markdown(), Some(PathBuf::from("/w/report.md")));
        assert_eq!(tracker.focused(), Some(PathBuf::from("/w/data.csv")));
    }

    #[test]
    fn test_clones_share_state() {
        let tracker = DocumentTracker::new();
        let reader = tracker.clone();
        tracker.record_active(Path::new("/w/notes.markdown"));
        assert_eq!(reader.last_markdown(), Some(PathBuf::from("/w/notes.markdown")));
        assert_eq!(reader.focused(), Some(PathBuf::from("/w/notes.markdown")));
    }
}
