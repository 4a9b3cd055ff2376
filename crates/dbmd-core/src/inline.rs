/*
 * inline.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Per-fence rendering for hosts that render markdown synchronously.
 */

//! Inline render hook.
//!
//! A host's own markdown renderer calls [`InlineRenderHook::render_fence`]
//! once per `sql` fence, synchronously, with no access to the async
//! pipeline. Each call therefore stands alone:
//!
//! 1. Find the document: the host-supplied path, else the last markdown
//!    document the user worked on, else the focused document
//! 2. Re-read its front matter and resolve the backend
//! 3. Run the query through the backend's command-line client, blocking
//!
//! Every problem, including document-level ones, is reported as an error
//! fragment in place of the one fence.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Settings;
use crate::document::Document;
use crate::error::{DocumentError, QueryError};
use crate::executor::cli::{self, find_binary};
use crate::executor::{Backend, Row};
use crate::front_matter::{self, FrontMatter};
use crate::preview::DocumentTracker;
use crate::render::{RenderMode, ResultRenderer};

pub const CANNOT_DETERMINE_DOCUMENT: &str =
    "Cannot determine document path. Please save your markdown file first.";

#[derive(Debug, Clone)]
pub struct InlineRenderHook {
    settings: Settings,
    tracker: DocumentTracker,
    renderer: ResultRenderer,
}

impl InlineRenderHook {
    pub fn new(settings: Settings, tracker: DocumentTracker, mode: RenderMode) -> Self {
        Self {
            settings,
            tracker,
            renderer: ResultRenderer::new(mode),
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.renderer.mode()
    }

    /// Render the fragment replacing one `sql` fence.
    ///
    /// `context` is the document path the host knows about, if any.
    pub fn render_fence(&self, query: &str, context: Option<&Path>) -> String {
        let query = query.trim();

        let Some(path) = self.resolve_document(context) else {
            return self.renderer.render_error(CANNOT_DETERMINE_DOCUMENT);
        };
        debug!(path = %path.display(), "Rendering inline SQL fence");

        let document = match Document::load(&path) {
            Ok(document) => document,
            Err(e) => {
                return self
                    .renderer
                    .render_error(&format!("Failed to read {}: {}", path.display(), e));
            }
        };

        let front = match front_matter::extract(document.raw_text()) {
            Ok((front, _)) => front,
            Err(e) => return self.renderer.render_error(&e.to_string()),
        };

        let outcome = self.execute(&document, &front, query);
        self.renderer.render(query, &outcome, front.show_query())
    }

    fn resolve_document(&self, context: Option<&Path>) -> Option<PathBuf> {
        context
            .map(Path::to_path_buf)
            .or_else(|| self.tracker.last_markdown())
            .or_else(|| self.tracker.focused())
    }

    fn execute(
        &self,
        document: &Document,
        front: &FrontMatter,
        query: &str,
    ) -> Result<Vec<Row>, QueryError> {
        let fenced = |e: DocumentError| QueryError::new(e.to_string());

        let declared = front
            .database()
            .ok_or(DocumentError::NoDatabaseDeclared)
            .map_err(fenced)?;
        let database = document.resolve(&declared);
        if !database.exists() {
            return Err(fenced(DocumentError::DatabaseFileNotFound(database)));
        }

        let backend = Backend::resolve(
            front.db_type().as_deref(),
            self.settings.default_database_type.as_deref(),
        )
        .map_err(fenced)?;

        let program = find_binary(backend, &self.settings);
        cli::run_blocking(backend, &program, &database, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hook(settings: Settings) -> InlineRenderHook {
        InlineRenderHook::new(settings, DocumentTracker::new(), RenderMode::Html)
    }

    #[test]
    fn test_no_document_is_fence_scoped_error() {
        let html = hook(Settings::default()).render_fence("SELECT 1", None);
        assert!(html.contains("sql-preview-error"));
        assert!(html.contains("Cannot determine document path. Please save your markdown file first."));
    }

    #[test]
    fn test_fallback_to_last_markdown_document() {
        let temp = tempfile::tempdir().unwrap();
        let doc = temp.path().join("report.md");
        std::fs::write(&doc, "# no front matter\n").unwrap();

        let tracker = DocumentTracker::new();
        tracker.record_active(&doc);
        tracker.record_active(&temp.path().join("data.csv"));
        let hook = InlineRenderHook::new(Settings::default(), tracker, RenderMode::Html);

        let html = hook.render_fence("SELECT 1", None);
        assert!(html.contains("No database path specified in frontmatter"));
    }

    #[test]
    fn test_fallback_to_focused_document() {
        let temp = tempfile::tempdir().unwrap();
        let doc = temp.path().join("notes.txt");
        std::fs::write(&doc, "---\ndatabase: missing.db\n---\n").unwrap();

        let tracker = DocumentTracker::new();
        tracker.record_active(&doc);
        let hook = InlineRenderHook::new(Settings::default(), tracker, RenderMode::Html);

        let html = hook.render_fence("SELECT 1", None);
        assert!(html.contains("Database file not found:"));
        assert!(html.contains("missing.db"));
    }

    #[test]
    fn test_unsupported_backend_with_show_query() {
        let temp = tempfile::tempdir().unwrap();
        let doc = temp.path().join("a.md");
        std::fs::write(temp.path().join("x.db"), b"").unwrap();
        std::fs::write(
            &doc,
            "---\ndatabase: x.db\ndbType: oracle\nshowQuery: true\n---\n",
        )
        .unwrap();

        let html = hook(Settings::default()).render_fence("  SELECT 1\n", Some(&doc));
        assert!(html.contains("<h4>Query:</h4>"));
        assert!(html.contains(">SELECT 1</code>"));
        assert!(html.contains("Unsupported database type: oracle"));
    }

    #[test]
    fn test_invalid_front_matter() {
        let temp = tempfile::tempdir().unwrap();
        let doc = temp.path().join("a.md");
        std::fs::write(&doc, "---\ndatabase: [\n---\n").unwrap();

        let html = hook(Settings::default()).render_fence("SELECT 1", Some(&doc));
        assert!(html.contains("Invalid front matter:"));
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_through_cli_client() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let program = temp.path().join("fake-duckdb");
        std::fs::write(&program, "#!/bin/sh\necho '[{\"x\":1}]'\n").unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();
        std::fs::write(temp.path().join("w.duckdb"), b"").unwrap();
        let doc = temp.path().join("a.md");
        std::fs::write(&doc, "---\ndatabase: w.duckdb\ndbType: duckdb\n---\n").unwrap();

        let settings = Settings {
            duckdb_binary: Some(program),
            ..Settings::default()
        };
        let hook = InlineRenderHook::new(settings, DocumentTracker::new(), RenderMode::Markdown);
        let md = hook.render_fence("SELECT 1 AS x", Some(&doc));
        assert_eq!(md, "\n| x |\n| --- |\n| 1 |\n");
    }
}
