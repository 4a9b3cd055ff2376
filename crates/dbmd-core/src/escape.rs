/*
 * escape.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Escaping for HTML and markdown destinations.
 */

//! Escaping of interpolated text.
//!
//! Fragments are spliced into markdown before it is rendered, so escaped
//! text must not only be inert in its destination syntax but also keep the
//! fragment on a single block: HTML escaping encodes line breaks as
//! character references, because a blank line would end the raw HTML block
//! early.

/// Escape text for HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            '\n' => out.push_str("&#10;"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

/// Escape text for inline markdown (table cells, paragraphs).
///
/// Every ASCII punctuation character is backslash-escaped, which CommonMark
/// guarantees renders literally. Line breaks become spaces.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for ch in text.chars() {
        match ch {
            '\n' => out.push(' '),
            '\r' => {}
            c if c.is_ascii_punctuation() => {
                out.push('\\');
                out.push(c);
            }
            other => out.push(other),
        }
    }
    out
}

/// A backtick fence long enough to wrap `code` verbatim.
pub fn code_fence_for(code: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for ch in code.chars() {
        if ch == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_specials() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & Jerry's</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#039;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_html_keeps_single_line() {
        let escaped = escape_html("SELECT 1\r\n\r\nFROM t");
        assert!(!escaped.contains('\n'));
        assert_eq!(escaped, "SELECT 1&#10;&#10;FROM t");
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("a|b"), "a\\|b");
        assert_eq!(escape_markdown("*bold* _x_"), "\\*bold\\* \\_x\\_");
        assert_eq!(escape_markdown("line\nnext"), "line next");
        assert_eq!(escape_markdown("café 42"), "café 42");
    }

    #[test]
    fn test_code_fence_for() {
        assert_eq!(code_fence_for("SELECT 1"), "```");
        assert_eq!(code_fence_for("a ``` b"), "````");
        assert_eq!(code_fence_for("`````"), "``````");
    }
}
