//! Code span detection.
//!
//! Image syntax inside fenced/indented code blocks or inline code is
//! literal text, not a link, and must never be rewritten.

use pulldown_cmark::{Event, Parser, Tag};
use std::ops::Range;

/// Byte ranges of every code block and inline code span, in source order.
pub fn code_ranges(markdown: &str) -> Vec<Range<usize>> {
    Parser::new(markdown)
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::CodeBlock(_)) | Event::Code(_) => Some(range),
            _ => None,
        })
        .collect()
}

/// Whether `offset` falls inside any of `ranges`.
pub fn is_inside(ranges: &[Range<usize>], offset: usize) -> bool {
    ranges.iter().any(|r| r.contains(&offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_fenced_block_and_inline_code() {
        let md = "text `inline` more\n\n```\ncode here\n```\n";
        let ranges = code_ranges(md);
        assert_eq!(ranges.len(), 2);
        assert!(md[ranges[0].clone()].contains("inline"));
        assert!(md[ranges[1].clone()].contains("code here"));
    }

    #[test]
    fn plain_text_has_no_code() {
        assert!(code_ranges("# Title\n\nJust a paragraph.").is_empty());
    }

    #[test]
    fn inside_checks_half_open_ranges() {
        let ranges = vec![2..5];
        assert!(is_inside(&ranges, 2));
        assert!(is_inside(&ranges, 4));
        assert!(!is_inside(&ranges, 5));
    }
}
