//! Remote image link scanning and position-based rewriting.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

use crate::code_block::{code_ranges, is_inside};

/// `![alt](http(s)://...)`, with an optional `"title"`. The URL stops at the
/// first whitespace or `)`.
static REMOTE_IMAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"!\[([^\]]*)\]\(((?i:https?)://[^)\s]*)(\s+"[^"]*")?\)"#).unwrap()
});

/// One remote image link found in a markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteImageReference {
    pub alt_text: String,
    pub source_url: String,
    /// Optional link title including its leading whitespace, kept on rewrite.
    pub title: Option<String>,
    /// Byte range of the whole `![..](..)` in the source text.
    pub span: Range<usize>,
}

impl RemoteImageReference {
    /// Markdown for the same image pointing at `target`.
    pub fn with_target(&self, target: &str) -> String {
        format!(
            "![{}]({}{})",
            self.alt_text,
            target,
            self.title.as_deref().unwrap_or("")
        )
    }
}

/// All remote image links in `markdown`, left to right. Links inside code
/// blocks or inline code are skipped.
pub fn find_remote_images(markdown: &str) -> Vec<RemoteImageReference> {
    if !markdown.contains("![") {
        return Vec::new();
    }
    let code = code_ranges(markdown);
    REMOTE_IMAGE_RE
        .captures_iter(markdown)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if is_inside(&code, whole.start()) {
                return None;
            }
            Some(RemoteImageReference {
                alt_text: caps[1].to_string(),
                source_url: caps[2].to_string(),
                title: caps.get(3).map(|m| m.as_str().to_string()),
                span: whole.range(),
            })
        })
        .collect()
}

/// Build a new string from `source`, replacing each span with its text.
///
/// Edits must be sorted by start and must not overlap; each is applied at
/// its own offsets, so identical substrings elsewhere are never touched.
pub fn splice(source: &str, edits: &[(Range<usize>, String)]) -> String {
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for (range, replacement) in edits {
        debug_assert!(range.start >= cursor, "edits must be sorted and disjoint");
        out.push_str(&source[cursor..range.start]);
        out.push_str(replacement);
        cursor = range.end;
    }
    out.push_str(&source[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_links_left_to_right() {
        let md = "a ![one](https://x.test/1.png) b ![](http://x.test/2.jpg) c";
        let refs = find_remote_images(md);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].alt_text, "one");
        assert_eq!(refs[0].source_url, "https://x.test/1.png");
        assert_eq!(&md[refs[0].span.clone()], "![one](https://x.test/1.png)");
        assert_eq!(refs[1].alt_text, "");
        assert!(refs[0].span.end <= refs[1].span.start);
    }

    #[test]
    fn ignores_relative_and_non_image_links() {
        let md = "![local](attachments/a.png) [link](https://x.test) ![[wiki.png]]";
        assert!(find_remote_images(md).is_empty());
    }

    #[test]
    fn ignores_links_in_code() {
        let md = "`![a](https://x.test/a.png)`\n\n```\n![b](https://x.test/b.png)\n```\n\n![c](https://x.test/c.png)\n";
        let refs = find_remote_images(md);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].alt_text, "c");
    }

    #[test]
    fn keeps_title_on_rewrite() {
        let md = r#"![chart](https://x.test/c.png "Q3")"#;
        let refs = find_remote_images(md);
        assert_eq!(refs[0].source_url, "https://x.test/c.png");
        assert_eq!(refs[0].with_target("attachments/1.png"), r#"![chart](attachments/1.png "Q3")"#);
    }

    #[test]
    fn url_stops_at_first_paren() {
        let md = "![a](https://x.test/img(1).png)";
        let refs = find_remote_images(md);
        assert_eq!(refs[0].source_url, "https://x.test/img(1");
    }

    #[test]
    fn url_with_bare_space_is_not_a_link() {
        // Whitespace after the URL starts a title, so a bare space inside
        // the URL leaves the whole reference untouched.
        assert!(find_remote_images("![a](https://x.test/a b.png)").is_empty());
        assert_eq!(find_remote_images("![a](https://x.test/a%20b.png)").len(), 1);
    }

    #[test]
    fn splice_rewrites_duplicates_independently() {
        let md = "![a](https://x/1.png) and ![a](https://x/1.png)";
        let refs = find_remote_images(md);
        let edits = vec![
            (refs[0].span.clone(), "FIRST".to_string()),
            (refs[1].span.clone(), "SECOND".to_string()),
        ];
        assert_eq!(splice(md, &edits), "FIRST and SECOND");
    }

    #[test]
    fn splice_without_edits_is_identity() {
        assert_eq!(splice("unchanged", &[]), "unchanged");
    }
}
