/*
 * transform.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * The document transformation cycle.
 */

//! The document transformation cycle.
//!
//! One cycle turns a [`Document`] snapshot into preview content:
//!
//! ```text
//! ExtractFrontMatter -> ValidateDatabase -> ResolveBackend -> Connect
//!     -> ScanFences -> ExecuteBlocks -> Splice -> RenderMarkdown -> Done
//! ```
//!
//! Any step before ExecuteBlocks can end the cycle with a
//! [`DocumentError`]; the output then carries the error and, where the body
//! is known, the unmodified body. Query failures are confined to their own
//! fence and never abort the cycle.
//!
//! Fences are executed and spliced last-to-first. Replacing a later span
//! leaves every earlier offset valid, so the result is the same as a
//! forward substitution computed against the original offsets.

use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::document::Document;
use crate::error::DocumentError;
use crate::escape::escape_html;
use crate::executor::{Backend, ExecutorRegistry, QueryHandle};
use crate::fence::{self, SqlBlock};
use crate::front_matter::{self, FrontMatter};
use crate::markdown::{render_markdown, wrap_content};
use crate::render::{RenderMode, ResultRenderer};

/// Result of one transformation cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewOutput {
    /// Document-level failure, if the cycle aborted.
    pub error: Option<DocumentError>,
    /// Rendered HTML content (without the banner).
    pub content: String,
}

impl PreviewOutput {
    fn rendered(content: String) -> Self {
        Self {
            error: None,
            content,
        }
    }

    /// Output for an aborted cycle. The body, when given, is shown verbatim
    /// as preformatted text below the banner.
    fn failed(error: DocumentError, body: Option<&str>) -> Self {
        let content = match body {
            Some(body) if !body.trim().is_empty() => format!(
                "<pre class=\"sql-preview-source\">{}</pre>\n",
                escape_html(body)
            ),
            _ => String::new(),
        };
        Self {
            error: Some(error),
            content,
        }
    }

    /// Output for a cycle that never reached the document body.
    pub fn from_error(error: DocumentError) -> Self {
        Self::failed(error, None)
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The error banner text, e.g. `Error: Database file not found: /x.db`.
    pub fn banner(&self) -> Option<String> {
        self.error.as_ref().map(DocumentError::banner)
    }
}

/// Runs transformation cycles against a fixed configuration.
#[derive(Debug)]
pub struct DocumentTransformer {
    settings: Settings,
    executors: ExecutorRegistry,
    renderer: ResultRenderer,
}

impl DocumentTransformer {
    /// Create a transformer with the default executor for every backend.
    pub fn new(settings: Settings) -> Self {
        let executors = ExecutorRegistry::new(&settings);
        Self::with_executors(settings, executors)
    }

    /// Create a transformer with a custom executor registry.
    pub fn with_executors(settings: Settings, executors: ExecutorRegistry) -> Self {
        Self {
            settings,
            executors,
            renderer: ResultRenderer::new(RenderMode::Html),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run one full cycle. Never fails: problems are part of the output.
    pub async fn transform(&self, document: &Document) -> PreviewOutput {
        info!(path = %document.source_path().display(), "Transforming document");

        let (front, body) = match front_matter::extract(document.raw_text()) {
            Ok(parts) => parts,
            Err(e) => {
                warn!(error = %e, "Front matter could not be parsed");
                return PreviewOutput::failed(DocumentError::render(e.to_string()), None);
            }
        };

        match self.execute(document, &front, body).await {
            Ok(content) => PreviewOutput::rendered(content),
            Err(err) => {
                warn!(error = %err, "Transformation aborted");
                PreviewOutput::failed(err, Some(body))
            }
        }
    }

    async fn execute(
        &self,
        document: &Document,
        front: &FrontMatter,
        body: &str,
    ) -> Result<String, DocumentError> {
        let declared = front.database().ok_or(DocumentError::NoDatabaseDeclared)?;
        let database = document.resolve(&declared);
        if !database.exists() {
            return Err(DocumentError::DatabaseFileNotFound(database));
        }

        let backend = Backend::resolve(
            front.db_type().as_deref(),
            self.settings.default_database_type.as_deref(),
        )?;
        let executor = self
            .executors
            .get(backend)
            .ok_or_else(|| DocumentError::UnsupportedBackend(backend.name().to_string()))?;

        debug!(backend = %backend, database = %database.display(), "Connecting");
        let handle = executor.connect(&database).await?;

        let blocks = fence::scan(body);
        debug!(count = blocks.len(), "Found SQL blocks");

        let spliced = self
            .execute_blocks(handle, body, &blocks, front.show_query())
            .await;
        Ok(wrap_content(&render_markdown(&spliced)))
    }

    /// Execute every block and splice its fragment in place of the fence.
    /// Consumes the handle and always closes it.
    async fn execute_blocks(
        &self,
        mut handle: Box<dyn QueryHandle>,
        body: &str,
        blocks: &[SqlBlock],
        show_query: bool,
    ) -> String {
        let mut text = body.to_string();
        for block in blocks.iter().rev() {
            let outcome = handle.query(&block.query).await;
            if let Err(e) = &outcome {
                debug!(error = %e, offset = block.start, "Query failed");
            }
            let fragment = self.renderer.render(&block.query, &outcome, show_query);
            text.replace_range(block.span(), &fragment);
        }
        handle.close().await;
        text
    }
}
