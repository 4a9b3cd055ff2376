/*
 * native.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Host-style markdown rendering with the inline hook.
 */

//! Host-style rendering.
//!
//! Renders a document the way a host's own markdown renderer would with
//! the inline hook installed: the markdown is parsed once, every fenced
//! `sql` code block is handed to [`InlineRenderHook::render_fence`], and
//! all other blocks render as usual.
//!
//! A code block counts as a SQL fence only when [`fence::scan`] would
//! find it too, so this path substitutes exactly the blocks a
//! [`DocumentTransformer`](crate::DocumentTransformer) does. Tilde fences,
//! longer backtick fences and indented fences render as ordinary code.
//!
//! The hook's [`RenderMode`] picks the output: HTML fragments become raw
//! HTML blocks in an HTML rendering, markdown fragments are parsed and
//! grafted into the tree for a CommonMark export.

use std::collections::HashMap;
use std::path::Path;

use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};
use comrak::{Arena, format_commonmark, format_html, parse_document};
use tracing::debug;

use crate::error::DocumentError;
use crate::fence;
use crate::front_matter;
use crate::inline::InlineRenderHook;
use crate::markdown::{self, Sink};
use crate::render::RenderMode;

/// HTML block kind for generic block-level tags (`<div>` and friends).
const HTML_BLOCK_GENERIC: u8 = 6;

/// Render `text` with every `sql` fence replaced by the hook's fragment.
///
/// Front matter is stripped. `context` is the document path passed to the
/// hook for each fence.
pub fn render(
    text: &str,
    hook: &InlineRenderHook,
    context: Option<&Path>,
) -> Result<String, DocumentError> {
    // A malformed block still renders; each fence reports the problem
    let body = front_matter::extract(text).map_or(text, |(_, body)| body);

    let options = markdown::options();
    let arena = Arena::new();
    let root = parse_document(&arena, body, &options);

    // Scanned fences keyed by the line their opening backticks are on
    let scanned: HashMap<usize, String> = fence::scan(body)
        .into_iter()
        .map(|block| (line_number(body, block.start), block.query))
        .collect();
    let fences: Vec<(&AstNode<'_>, &str)> = root
        .descendants()
        .filter_map(|node| {
            let line = fenced_code_line(node)?;
            scanned.get(&line).map(|query| (node, query.as_str()))
        })
        .collect();
    debug!(count = fences.len(), "Rendering SQL fences through inline hook");

    for (node, query) in fences {
        let fragment = hook.render_fence(query, context);

        match hook.mode() {
            RenderMode::Html => {
                node.data.borrow_mut().value = NodeValue::HtmlBlock(NodeHtmlBlock {
                    block_type: HTML_BLOCK_GENERIC,
                    literal: fragment,
                });
            }
            RenderMode::Markdown => {
                let parsed = parse_document(&arena, &fragment, &options);
                let blocks: Vec<_> = parsed.children().collect();
                for block in blocks {
                    node.insert_before(block);
                }
                node.detach();
            }
        }
    }

    let mut sink = Sink::default();
    let formatted = match hook.mode() {
        RenderMode::Html => format_html(root, &options, &mut sink),
        RenderMode::Markdown => format_commonmark(root, &options, &mut sink),
    };
    formatted.map_err(|e| DocumentError::render(format!("Failed to render markdown: {e}")))?;
    sink.into_string()
        .map_err(|e| DocumentError::render(format!("Rendered output is not UTF-8: {e}")))
}

/// First line (1-based) of a fenced code block.
fn fenced_code_line(node: &AstNode<'_>) -> Option<usize> {
    let ast = node.data.borrow();
    match &ast.value {
        NodeValue::CodeBlock(block) if block.fenced => Some(ast.sourcepos.start.line),
        _ => None,
    }
}

fn line_number(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::preview::DocumentTracker;

    fn hook(mode: RenderMode) -> InlineRenderHook {
        InlineRenderHook::new(Settings::default(), DocumentTracker::new(), mode)
    }

    #[test]
    fn test_html_replaces_only_sql_fences() {
        let text = "# Title\n\n```sql\nSELECT 1\n```\n\n```python\nprint(1)\n```\n";
        let html = render(text, &hook(RenderMode::Html), None).unwrap();

        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("Cannot determine document path"));
        assert!(!html.contains("SELECT 1"));
        assert!(html.contains("print(1)"));
    }

    #[test]
    fn test_front_matter_is_stripped() {
        let text = "---\ndatabase: x.db\n---\nHello\n";
        let html = render(text, &hook(RenderMode::Html), None).unwrap();
        assert!(!html.contains("database"));
        assert!(html.contains("<p>Hello</p>"));
    }

    #[test]
    fn test_markdown_export_grafts_fragment() {
        let text = "Intro\n\n```sql\nSELECT 1\n```\n\nOutro\n";
        let md = render(text, &hook(RenderMode::Markdown), None).unwrap();

        assert!(md.contains("Intro"));
        assert!(md.contains("Outro"));
        assert!(md.contains("Cannot determine document path"));
        assert!(!md.contains("```"));
        assert!(md.find("Intro").unwrap() < md.find("Cannot").unwrap());
        assert!(md.find("Cannot").unwrap() < md.find("Outro").unwrap());
    }

    #[test]
    fn test_only_scanned_fences_are_replaced() {
        let text = "~~~sql\nSELECT 'tilde'\n~~~\n\n````sql\nSELECT 'four'\n````\n\n  ```sql\nSELECT 'indented'\n  ```\n\n```sql\nSELECT 'plain'\n```\n";
        assert_eq!(fence::scan(text).len(), 1);

        let html = render(text, &hook(RenderMode::Html), None).unwrap();
        assert_eq!(html.matches("Cannot determine document path").count(), 1);
        assert!(html.contains("tilde"));
        assert!(!html.contains("plain"));
        assert!(html.contains("four"));
        assert!(html.contains("indented"));
    }

    #[test]
    fn test_fence_lines_follow_front_matter() {
        let text = "---\ntitle: x\n---\nIntro\n\n```sql\n```\n\nMiddle\n\n```sql\nSELECT 2\n```\n";
        let md = render(text, &hook(RenderMode::Markdown), None).unwrap();
        assert_eq!(md.matches("Cannot determine document path").count(), 2);
        assert!(md.contains("Middle"));
        assert!(!md.contains("SELECT 2"));
    }

    #[test]
    fn test_line_number() {
        let text = "a\nb\n```sql";
        assert_eq!(line_number(text, 0), 1);
        assert_eq!(line_number(text, 4), 3);
    }

    #[test]
    fn test_no_fences_matches_plain_render() {
        let text = "Some *text*\n\n- a\n- b\n";
        let html = render(text, &hook(RenderMode::Html), None).unwrap();
        assert_eq!(html, markdown::render_markdown(text));
    }
}
