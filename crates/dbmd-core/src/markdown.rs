/*
 * markdown.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Markdown to HTML conversion.
 */

use std::io;

use comrak::Options;

/// Class of the element wrapping rendered document content.
pub const CONTENT_CLASS: &str = "markdown-content";

/// Parser and renderer options shared by every render path.
///
/// Raw HTML must pass through untouched, since HTML-mode fragments are
/// spliced into the markdown as raw HTML blocks.
pub fn options() -> Options<'static> {
    let mut options = Options::default();
    options.render.r#unsafe = true;
    options.render.hardbreaks = true;
    options.extension.autolink = true;
    options.extension.table = true;
    options
}

/// Render markdown text to an HTML fragment.
pub fn render_markdown(text: &str) -> String {
    comrak::markdown_to_html(text, &options())
}

/// Wrap rendered HTML in the content container.
pub fn wrap_content(html: &str) -> String {
    format!("<div class=\"{CONTENT_CLASS}\">\n{html}</div>\n")
}

/// Byte sink for comrak's formatters.
///
/// Output is collected as bytes and validated once at the end, so writes
/// that split a multibyte character are harmless.
#[derive(Debug, Default)]
pub(crate) struct Sink(Vec<u8>);

impl Sink {
    pub(crate) fn into_string(self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.0)
    }
}

impl io::Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl std::fmt::Write for Sink {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.0.extend_from_slice(s.as_bytes());
        Ok(())
    }
}
