/*
 * fence.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Discovery of SQL code fences in a markdown body.
 */

//! Discovery of SQL code fences.
//!
//! A SQL fence is a line of three backticks immediately followed by `sql`,
//! the query lines, and a closing line of three backticks. The smallest
//! enclosed span wins, so consecutive fences never merge. A fence with no
//! query lines at all is still a fence, with an empty query. Fences tagged
//! with any other info string (`sqlite`, `SQL`, `sql {.x}`) are ignored.
//!
//! Only this exact form is recognized: `~~~sql`, fences of four or more
//! backticks, and indented fences are left alone.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

static SQL_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)^```sql[ \t]*\r?\n(?:(.*?)\r?\n)??```[ \t]*\r?$").expect("valid fence pattern")
});

/// One SQL fence found in a markdown body.
///
/// Offsets are byte positions into the body the block was scanned from
/// (front matter already stripped). `end` is exclusive and stops at the
/// closing backticks; the line terminator after them is not part of the
/// span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlBlock {
    /// Query text, trimmed of surrounding whitespace
    pub query: String,
    pub start: usize,
    pub end: usize,
}

impl SqlBlock {
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Find all SQL fences in `body`, in source order.
///
/// Spans are non-overlapping and strictly increasing.
pub fn scan(body: &str) -> Vec<SqlBlock> {
    SQL_FENCE
        .captures_iter(body)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            // No capture: the closing line follows the opening line directly
            let query = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
            Some(SqlBlock {
                query,
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_fences() {
        assert!(scan("# Title\n\nplain text\n").is_empty());
        assert!(scan("").is_empty());
    }

    #[test]
    fn test_single_fence_span() {
        let body = "Intro\n\n```sql\nSELECT 1 AS x\n```\n\nOutro\n";
        let blocks = scan(body);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].query, "SELECT 1 AS x");
        assert_eq!(&body[blocks[0].span()], "```sql\nSELECT 1 AS x\n```");
    }

    #[test]
    fn test_multiple_fences_are_ordered_and_disjoint() {
        let body = "```sql\nSELECT 1\n```\ntext\n```sql\nSELECT 2\n```\n";
        let blocks = scan(body);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].query, "SELECT 1");
        assert_eq!(blocks[1].query, "SELECT 2");
        assert!(blocks[0].end <= blocks[1].start);
    }

    #[test]
    fn test_other_languages_are_ignored() {
        let body = "```python\nprint(1)\n```\n```sqlite\nSELECT 1\n```\n```SQL\nSELECT 2\n```\n";
        assert!(scan(body).is_empty());
    }

    #[test]
    fn test_other_fence_before_sql_fence() {
        let body = "```python\nx = 1\n```\n\n```sql\nSELECT 3\n```\n";
        let blocks = scan(body);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].query, "SELECT 3");
        assert!(body[blocks[0].start..].starts_with("```sql"));
    }

    #[test]
    fn test_multiline_query_is_trimmed() {
        let body = "```sql\n\n  SELECT a,\n         b\n  FROM t\n\n```\n";
        let blocks = scan(body);
        assert_eq!(blocks[0].query, "SELECT a,\n         b\n  FROM t");
    }

    #[test]
    fn test_crlf_fence() {
        let body = "```sql\r\nSELECT 1\r\n```\r\nafter";
        let blocks = scan(body);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].query, "SELECT 1");
        assert_eq!(&body[blocks[0].end..], "\nafter");
    }

    #[test]
    fn test_unclosed_fence_is_ignored() {
        assert!(scan("```sql\nSELECT 1\n").is_empty());
    }

    #[test]
    fn test_empty_fence_does_not_swallow_following_text() {
        let body = "```sql\n```\n\nText between\n\n```sql\nSELECT 1\n```\n";
        let blocks = scan(body);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].query, "");
        assert_eq!(&body[blocks[0].span()], "```sql\n```");
        assert_eq!(blocks[1].query, "SELECT 1");
        assert_eq!(&body[blocks[1].span()], "```sql\nSELECT 1\n```");
        assert!(body[blocks[0].end..blocks[1].start].contains("Text between"));
    }

    #[test]
    fn test_whitespace_only_fence() {
        let body = "```sql\n   \n```\nafter\n```sql\nSELECT 2\n```\n";
        let blocks = scan(body);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].query, "");
        assert_eq!(&body[blocks[0].span()], "```sql\n   \n```");
        assert_eq!(blocks[1].query, "SELECT 2");
    }

    #[test]
    fn test_empty_crlf_fence() {
        let body = "```sql\r\n```\r\nafter";
        let blocks = scan(body);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].query, "");
        assert_eq!(&body[blocks[0].end..], "\nafter");
    }

    #[test]
    fn test_fence_must_start_a_line() {
        assert!(scan("text ```sql\nSELECT 1\n```\n").is_empty());
    }

    #[test]
    fn test_offsets_with_multibyte_text() {
        let body = "Café ☕\n```sql\nSELECT 'é'\n```\n";
        let blocks = scan(body);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].query, "SELECT 'é'");
        assert!(body.is_char_boundary(blocks[0].start));
        assert_eq!(&body[blocks[0].span()], "```sql\nSELECT 'é'\n```");
    }
}
