//! LaTeX delimiter normalisation for model answers.
//!
//! Chat models often emit `\[ .. \]` and `\( .. \)`; Obsidian only renders
//! `$$ .. $$` and `$ .. $`.

use once_cell::sync::Lazy;
use regex::Regex;

static DISPLAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\\\[\s*(.*?)\s*\\\]").unwrap());
static INLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\\((.*?)\\\)").unwrap());

/// Rewrite `\[..\]` to a `$$` block on its own lines and `\(..\)` to `$..$`.
pub fn normalize_math_delimiters(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }
    let display = DISPLAY_RE.replace_all(text, "\n$$$$\n$1\n$$$$\n");
    INLINE_RE.replace_all(&display, "$$$1$$").into_owned()
}
