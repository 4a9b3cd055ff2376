/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Render command implementation
 */

//! Render command implementation.
//!
//! Runs a single transformation and writes the result. Problems with the
//! document itself (no database, bad SQL, unreadable file) are part of the
//! rendered output; only failing to write the output is a command error.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use dbmd_core::markdown::wrap_content;
use dbmd_core::{
    Document, DocumentError, DocumentTracker, DocumentTransformer, InlineRenderHook, PageMode,
    PreviewOutput, RenderMode, Settings, native, render_page,
};

use super::OutputFormat;

/// Arguments for the render command
#[derive(Debug)]
pub struct RenderArgs {
    pub file: PathBuf,
    pub output: Option<PathBuf>,
    pub db_type: Option<String>,
    pub config: Option<PathBuf>,
    pub inline: bool,
    pub to: OutputFormat,
}

/// Execute the render command
pub async fn execute(args: RenderArgs) -> Result<()> {
    let settings = super::load_settings(args.config.as_deref(), &args.file, args.db_type.clone())?;
    info!(file = %args.file.display(), format = ?args.to, inline = args.inline, "Rendering");

    let rendered = match Document::load(&args.file) {
        Ok(document) => render_document(document, settings, &args).await?,
        Err(e) => {
            let error = DocumentError::render(format!(
                "Failed to read {}: {}",
                args.file.display(),
                e
            ));
            match args.to {
                OutputFormat::Html => {
                    render_page(&PreviewOutput::from_error(error), PageMode::Static)
                }
                OutputFormat::Markdown => format!("{}\n", error.banner()),
            }
        }
    };

    write_output(args.output.as_deref(), &rendered)
}

async fn render_document(
    document: Document,
    settings: Settings,
    args: &RenderArgs,
) -> Result<String> {
    match (args.to, args.inline) {
        (OutputFormat::Html, false) => {
            let output = DocumentTransformer::new(settings).transform(&document).await;
            if let Some(banner) = output.banner() {
                debug!(%banner, "Document rendered with an error");
            }
            Ok(render_page(&output, PageMode::Static))
        }
        (OutputFormat::Html, true) => {
            let output = match render_inline(document, settings, RenderMode::Html).await? {
                Ok(html) => PreviewOutput {
                    error: None,
                    content: wrap_content(&html),
                },
                Err(error) => PreviewOutput::from_error(error),
            };
            Ok(render_page(&output, PageMode::Static))
        }
        (OutputFormat::Markdown, _) => {
            Ok(match render_inline(document, settings, RenderMode::Markdown).await? {
                Ok(markdown) => markdown,
                Err(error) => format!("{}\n", error.banner()),
            })
        }
    }
}

/// Render through the inline hook. The hook blocks on backend clients, so
/// it runs off the async runtime.
async fn render_inline(
    document: Document,
    settings: Settings,
    mode: RenderMode,
) -> Result<Result<String, DocumentError>> {
    tokio::task::spawn_blocking(move || {
        let hook = InlineRenderHook::new(settings, DocumentTracker::new(), mode);
        native::render(document.raw_text(), &hook, Some(document.source_path()))
    })
    .await
    .context("Inline render task failed")
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output file {}", path.display()))?;
            info!(path = %path.display(), "Wrote output");
        }
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write output to stdout")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(file: PathBuf, output: PathBuf, to: OutputFormat, inline: bool) -> RenderArgs {
        RenderArgs {
            file,
            output: Some(output),
            db_type: None,
            config: None,
            inline,
            to,
        }
    }

    #[tokio::test]
    async fn test_render_writes_page_with_banner() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("doc.md");
        std::fs::write(&file, "# Hello\n").unwrap();
        let out = temp.path().join("out.html");

        execute(args(file, out.clone(), OutputFormat::Html, false))
            .await
            .unwrap();

        let page = std::fs::read_to_string(out).unwrap();
        assert!(page.contains("<title>SQL Preview</title>"));
        assert!(page.contains("Error: No database path specified in frontmatter"));
        assert!(page.contains("# Hello"));
    }

    #[tokio::test]
    async fn test_unreadable_document_is_rendered_not_failed() {
        let temp = tempfile::tempdir().unwrap();
        let out = temp.path().join("out.html");

        execute(args(
            temp.path().join("missing.md"),
            out.clone(),
            OutputFormat::Html,
            false,
        ))
        .await
        .unwrap();

        let page = std::fs::read_to_string(out).unwrap();
        assert!(page.contains("Error: Failed to read"));
    }

    #[tokio::test]
    async fn test_markdown_export_of_plain_document() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("doc.md");
        std::fs::write(&file, "Just *text*.\n").unwrap();
        let out = temp.path().join("out.md");

        execute(args(file, out.clone(), OutputFormat::Markdown, false))
            .await
            .unwrap();

        let markdown = std::fs::read_to_string(out).unwrap();
        assert!(markdown.contains("Just *text*."));
    }

    #[tokio::test]
    async fn test_write_failure_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("doc.md");
        std::fs::write(&file, "text\n").unwrap();

        let result = execute(args(
            file,
            temp.path().join("no-such-dir").join("out.html"),
            OutputFormat::Html,
            false,
        ))
        .await;
        assert!(result.is_err());
    }
}
