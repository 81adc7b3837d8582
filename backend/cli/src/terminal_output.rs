//! Terminal output utilities: colored notes and key/value tables.

// ---------------------------------------------------------------------------
// ANSI Color/Style helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

// ---------------------------------------------------------------------------
// Formatted notes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteLevel {
    Info,
    Warn,
    Error,
    Success,
}

/// One note line, without the trailing newline.
pub fn format_note(level: NoteLevel, msg: &str, color: bool) -> String {
    let (color_code, symbol, tag) = match level {
        NoteLevel::Info => (CYAN, "ℹ", "INFO"),
        NoteLevel::Warn => (YELLOW, "⚠", "WARN"),
        NoteLevel::Error => (RED, "✗", "ERROR"),
        NoteLevel::Success => (GREEN, "✓", "OK"),
    };
    if color {
        format!("{color_code}{BOLD}{symbol}{RESET} {msg}")
    } else {
        format!("{tag}: {msg}")
    }
}

pub fn note_info(msg: &str) {
    println!("{}", format_note(NoteLevel::Info, msg, supports_color()));
}

pub fn note_warn(msg: &str) {
    println!("{}", format_note(NoteLevel::Warn, msg, supports_color()));
}

pub fn note_error(msg: &str) {
    eprintln!("{}", format_note(NoteLevel::Error, msg, supports_color()));
}

pub fn note_success(msg: &str) {
    println!("{}", format_note(NoteLevel::Success, msg, supports_color()));
}

// ---------------------------------------------------------------------------
// Table rendering
// ---------------------------------------------------------------------------

/// Render a two-column key/value table.
pub fn render_pairs(rows: &[(&str, String)]) -> String {
    let width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for (key, value) in rows {
        let pad = width - key.chars().count();
        out.push_str(&format!("  {key}{}  {value}\n", " ".repeat(pad)));
    }
    out
}
