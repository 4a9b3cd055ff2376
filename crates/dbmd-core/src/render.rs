/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Rendering of query outcomes as embeddable fragments.
 */

//! Rendering of query outcomes.
//!
//! A fragment replaces one SQL fence. It is self-contained: splicing it
//! into the surrounding markdown never changes how the surrounding text
//! renders.
//!
//! Layout, in order:
//!
//! 1. The query text, when `showQuery` is on
//! 2. One of: an error block, a result table, or a "No results" note
//!
//! Two destination syntaxes are supported ([`RenderMode`]). HTML fragments
//! are a single raw HTML block followed by a blank line; markdown fragments
//! are GFM blocks surrounded by blank lines.

use crate::error::QueryError;
use crate::escape::{code_fence_for, escape_html, escape_markdown};
use crate::executor::{Row, display_value};

/// Destination syntax for fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Raw HTML, for the preview page and the host's HTML renderer.
    #[default]
    Html,
    /// GFM markdown, for markdown export.
    Markdown,
}

/// Formats query outcomes for one destination syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultRenderer {
    mode: RenderMode,
}

impl ResultRenderer {
    pub fn new(mode: RenderMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Render one block's outcome.
    ///
    /// On error the rows are not rendered; an empty row set renders the
    /// "No results" placeholder rather than an empty table.
    pub fn render(
        &self,
        query: &str,
        outcome: &Result<Vec<Row>, QueryError>,
        show_query: bool,
    ) -> String {
        match self.mode {
            RenderMode::Html => html::render(query, outcome, show_query),
            RenderMode::Markdown => markdown::render(query, outcome, show_query),
        }
    }

    /// Render an error that has no query outcome behind it, such as an
    /// unresolvable document in the inline hook.
    pub fn render_error(&self, message: &str) -> String {
        match self.mode {
            RenderMode::Html => format!("{}\n", html::error_block(message)),
            RenderMode::Markdown => format!("\n{}\n", markdown::error_block(message)),
        }
    }
}

mod html {
    use super::*;

    pub(super) fn render(
        query: &str,
        outcome: &Result<Vec<Row>, QueryError>,
        show_query: bool,
    ) -> String {
        let mut out = String::from("<div class=\"sql-preview\">");

        if show_query {
            out.push_str("<div class=\"sql-preview-query\"><h4>Query:</h4><pre><code class=\"language-sql\">");
            out.push_str(&escape_html(query));
            out.push_str("</code></pre></div>");
        }

        match outcome {
            Err(err) => out.push_str(&error_block(&err.message)),
            Ok(rows) if !rows.is_empty() => table(rows, &mut out),
            Ok(_) => out.push_str("<p class=\"sql-preview-empty\">No results</p>"),
        }

        out.push_str("</div>\n");
        out
    }

    pub(super) fn error_block(message: &str) -> String {
        format!(
            "<div class=\"sql-preview-error\"><strong>Error:</strong> {}</div>",
            escape_html(message)
        )
    }

    fn table(rows: &[Row], out: &mut String) {
        out.push_str("<table class=\"sql-preview-table\"><thead><tr>");
        for column in rows[0].columns() {
            out.push_str("<th>");
            out.push_str(&escape_html(column));
            out.push_str("</th>");
        }
        out.push_str("</tr></thead><tbody>");
        for row in rows {
            out.push_str("<tr>");
            for value in row.values() {
                out.push_str("<td>");
                out.push_str(&escape_html(&display_value(value)));
                out.push_str("</td>");
            }
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table>");
    }
}

mod markdown {
    use super::*;

    pub(super) fn render(
        query: &str,
        outcome: &Result<Vec<Row>, QueryError>,
        show_query: bool,
    ) -> String {
        let mut blocks: Vec<String> = Vec::new();

        if show_query {
            let fence = code_fence_for(query);
            blocks.push("**Query:**".to_string());
            blocks.push(format!("{fence}sql\n{query}\n{fence}"));
        }

        blocks.push(match outcome {
            Err(err) => error_block(&err.message),
            Ok(rows) if !rows.is_empty() => table(rows),
            Ok(_) => "*No results*".to_string(),
        });

        format!("\n{}\n", blocks.join("\n\n"))
    }

    pub(super) fn error_block(message: &str) -> String {
        let lines: Vec<String> = message.lines().map(escape_markdown).collect();
        format!("> **Error:** {}", lines.join("\n> "))
    }

    fn table(rows: &[Row]) -> String {
        let header: Vec<String> = rows[0].columns().map(escape_markdown).collect();
        let mut lines = vec![
            format!("| {} |", header.join(" | ")),
            format!("|{}|", vec![" --- "; header.len()].join("|")),
        ];
        for row in rows {
            let cells: Vec<String> = row
                .values()
                .map(|v| escape_markdown(&display_value(v)))
                .collect();
            lines.push(format!("| {} |", cells.join(" | ")));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn rows() -> Vec<Row> {
        vec![
            Row::new().with("id", 1).with("name", "<b>Ann</b>"),
            Row::new().with("id", 2).with("name", Value::Null),
        ]
    }

    #[test]
    fn test_html_table() {
        let html = ResultRenderer::new(RenderMode::Html).render("SELECT * FROM p", &Ok(rows()), false);
        assert!(html.starts_with("<div class=\"sql-preview\">"));
        assert!(html.contains("<th>id</th><th>name</th>"));
        assert!(html.contains("<td>1</td><td>&lt;b&gt;Ann&lt;/b&gt;</td>"));
        assert!(html.contains("<td>2</td><td>NULL</td>"));
        assert!(!html.contains("Query:"));
        assert!(html.ends_with("</div>\n"));
        assert_eq!(html.matches('\n').count(), 1);
    }

    #[test]
    fn test_html_show_query_is_escaped() {
        let html = ResultRenderer::new(RenderMode::Html).render(
            "SELECT '<x>'\n\nFROM t",
            &Ok(vec![]),
            true,
        );
        assert!(html.contains("<h4>Query:</h4>"));
        assert!(html.contains("SELECT &#039;&lt;x&gt;&#039;&#10;&#10;FROM t"));
        assert_eq!(html.matches('\n').count(), 1);
    }

    #[test]
    fn test_html_error_suppresses_rows() {
        let html = ResultRenderer::new(RenderMode::Html).render(
            "SELEC 1",
            &Err(QueryError::new("near \"SELEC\": syntax error")),
            false,
        );
        assert!(html.contains("<strong>Error:</strong> near &quot;SELEC&quot;: syntax error"));
        assert!(!html.contains("<table"));
        assert!(!html.contains("No results"));
    }

    #[test]
    fn test_html_no_results() {
        let html = ResultRenderer::new(RenderMode::Html).render("SELECT 1 WHERE 0", &Ok(vec![]), false);
        assert!(html.contains("No results"));
        assert!(!html.contains("<table"));
        assert!(!html.contains("Error"));
    }

    #[test]
    fn test_html_render_error() {
        let html = ResultRenderer::new(RenderMode::Html).render_error("Cannot determine <document>");
        assert_eq!(
            html,
            "<div class=\"sql-preview-error\"><strong>Error:</strong> Cannot determine &lt;document&gt;</div>\n"
        );
    }

    #[test]
    fn test_markdown_table() {
        let md = ResultRenderer::new(RenderMode::Markdown).render("SELECT 1", &Ok(rows()), false);
        assert_eq!(
            md,
            "\n| id | name |\n| --- | --- |\n| 1 | \\<b\\>Ann\\<\\/b\\> |\n| 2 | NULL |\n"
        );
    }

    #[test]
    fn test_markdown_show_query_uses_safe_fence() {
        let md = ResultRenderer::new(RenderMode::Markdown).render("SELECT '```'", &Ok(vec![]), true);
        assert!(md.contains("**Query:**\n\n````sql\nSELECT '```'\n````"));
        assert!(md.contains("*No results*"));
    }

    #[test]
    fn test_markdown_error_block() {
        let md = ResultRenderer::new(RenderMode::Markdown).render(
            "x",
            &Err(QueryError::new("line 1\nline *2*")),
            false,
        );
        assert_eq!(md, "\n> **Error:** line 1\n> line \\*2\\*\n");
    }

    #[test]
    fn test_markdown_pipe_in_cell_is_escaped() {
        let md = ResultRenderer::new(RenderMode::Markdown).render(
            "x",
            &Ok(vec![Row::new().with("a|b", "c|d")]),
            false,
        );
        assert!(md.contains("| a\\|b |"));
        assert!(md.contains("| c\\|d |"));
    }
}
