//! `vaultbot rewrite <file>`: localize the remote images of a markdown file
//! into the vault's attachment directory.

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use vaultbot_config::BotConfig;
use vaultbot_media::{AttachmentStore, HttpImageFetcher, RemoteImageRewriter, RewriteOutcome};

use crate::terminal_output::{format_note, supports_color, NoteLevel};

pub async fn run(config: &BotConfig, file: &Path, in_place: bool) -> Result<()> {
    let source = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let fetcher = HttpImageFetcher::new(Duration::from_secs(config.pipeline.download_timeout_secs))?;
    let store = AttachmentStore::new(&config.vault.path, &config.vault.attachment_dir);
    let rewriter = RemoteImageRewriter::new(Arc::new(fetcher), store, config.pipeline.retry.clone());

    let outcome = rewriter.rewrite_with_outcome(&source).await;

    if in_place && outcome.localized > 0 {
        tokio::fs::write(file, &outcome.text)
            .await
            .with_context(|| format!("Failed to write {}", file.display()))?;
    }

    let summary = summary_line(&outcome, &config.vault.attachment_path(), supports_color());
    emit(&outcome.text, &summary, in_place, &mut io::stdout(), &mut io::stderr())?;
    Ok(())
}

fn summary_line(outcome: &RewriteOutcome, attachment_dir: &Path, color: bool) -> String {
    let level = if outcome.kept > 0 {
        NoteLevel::Warn
    } else {
        NoteLevel::Success
    };
    let msg = format!(
        "{} image(s) localized into {}, {} kept remote",
        outcome.localized,
        attachment_dir.display(),
        outcome.kept
    );
    format_note(level, &msg, color)
}

/// When the markdown goes to stdout the summary goes to stderr, so the
/// output can be piped.
fn emit(
    text: &str,
    summary: &str,
    in_place: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<()> {
    if in_place {
        writeln!(out, "{summary}")?;
    } else {
        write!(out, "{text}")?;
        out.flush()?;
        writeln!(err, "{summary}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(localized: usize, kept: usize) -> RewriteOutcome {
        RewriteOutcome {
            text: "# doc\n![a](attachments/1.png)\n".into(),
            localized,
            kept,
        }
    }

    #[test]
    fn printed_markdown_is_not_mixed_with_the_summary() {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let o = outcome(1, 0);
        emit(&o.text, "OK: 1 image(s)", false, &mut out, &mut err).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), o.text);
        assert_eq!(String::from_utf8(err).unwrap(), "OK: 1 image(s)\n");
    }

    #[test]
    fn in_place_prints_only_the_summary() {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        emit("ignored", "OK: done", true, &mut out, &mut err).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "OK: done\n");
        assert!(err.is_empty());
    }

    #[test]
    fn kept_links_make_the_summary_a_warning() {
        let line = summary_line(&outcome(1, 2), Path::new("/vault/attachments"), false);
        assert_eq!(line, "WARN: 1 image(s) localized into /vault/attachments, 2 kept remote");
        assert!(summary_line(&outcome(1, 0), Path::new("a"), false).starts_with("OK: "));
    }
}
