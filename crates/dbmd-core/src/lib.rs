/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Markdown documents with live SQL results.
 */

//! Markdown documents with live SQL results.
//!
//! A document declares a database in its front matter; every fenced `sql`
//! block is executed against it and replaced by a rendering of its result.
//!
//! # Architecture
//!
//! - [`DocumentTransformer`] - one transformation cycle, from a
//!   [`Document`] snapshot to [`PreviewOutput`]
//! - [`ExecutorRegistry`] - a [`QueryExecutor`] for each [`Backend`]
//! - [`ResultRenderer`] - query outcome to HTML or markdown fragment
//! - [`PreviewController`] - keeps an output surface in sync with the
//!   active document
//! - [`InlineRenderHook`] - synchronous per-fence rendering for hosts with
//!   their own markdown renderer
//!
//! # Example
//!
//! ```ignore
//! use dbmd_core::{Document, DocumentTransformer, Settings};
//!
//! let settings = Settings::load(None, Some(path))?;
//! let transformer = DocumentTransformer::new(settings);
//! let output = transformer.transform(&Document::load(path)?).await;
//! if let Some(banner) = output.banner() {
//!     eprintln!("{banner}");
//! }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod escape;
pub mod executor;
pub mod fence;
pub mod front_matter;
pub mod inline;
pub mod markdown;
pub mod native;
pub mod page;
pub mod preview;
pub mod render;
pub mod transform;

pub use config::Settings;
pub use document::{Document, is_markdown_path};
pub use error::{ConfigError, ConnectionError, DocumentError, PreviewError, QueryError};
pub use executor::{
    Backend, DuckDbExecutor, ExecutorRegistry, QueryExecutor, QueryHandle, Row, SqliteExecutor,
};
pub use fence::SqlBlock;
pub use front_matter::FrontMatter;
pub use inline::InlineRenderHook;
pub use page::{PageMode, render_page};
pub use preview::{
    DocumentTracker, EventSink, EventSource, OutputSurface, PreviewController, PreviewEvent,
    PreviewSession, Subscription, SurfaceMessage, SurfaceProvider,
};
pub use render::{RenderMode, ResultRenderer};
pub use transform::{DocumentTransformer, PreviewOutput};
