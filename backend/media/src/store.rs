//! Attachment storage.
//!
//! Files are named after the current second (`YYYYMMDDHHMMSS.<ext>`). When
//! that name is taken a `-1`, `-2`, ... suffix is tried. Every file is opened
//! with create-new, so two writers racing for the same name never clobber
//! each other: the loser just moves on to the next suffix.

use chrono::{Local, NaiveDateTime};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use vaultbot_markdown::timestamp_slug;

/// Suffixes tried before giving up on a stem.
const MAX_SUFFIX: u32 = 10_000;

/// A file written into the attachment directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAttachment {
    pub filename: String,
    /// `<attachment_dir>/<filename>`, relative to the vault root.
    pub relative_path: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AttachmentStore {
    vault_root: PathBuf,
    dir: String,
}

impl AttachmentStore {
    pub fn new(vault_root: impl Into<PathBuf>, dir: impl Into<String>) -> Self {
        Self {
            vault_root: vault_root.into(),
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub fn dir_path(&self) -> PathBuf {
        self.vault_root.join(&self.dir)
    }

    pub async fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(self.dir_path()).await
    }

    /// Store `bytes` under a fresh `<timestamp>.<ext>` name.
    pub async fn save(&self, bytes: &[u8], ext: &str) -> io::Result<LocalAttachment> {
        self.save_at(bytes, ext, Local::now().naive_local()).await
    }

    pub async fn save_at(
        &self,
        bytes: &[u8],
        ext: &str,
        now: NaiveDateTime,
    ) -> io::Result<LocalAttachment> {
        let dir = self.dir_path();
        fs::create_dir_all(&dir).await?;
        let path = create_unique(&dir, &timestamp_slug(now), ext, bytes).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(LocalAttachment {
            relative_path: format!("{}/{}", self.dir.trim_end_matches('/'), filename),
            filename,
            path,
        })
    }
}

/// Write `contents` to `<dir>/<stem>.<ext>`, or the first free
/// `<dir>/<stem>-N.<ext>`. Never overwrites an existing file.
pub async fn create_unique(dir: &Path, stem: &str, ext: &str, contents: &[u8]) -> io::Result<PathBuf> {
    for n in 0..=MAX_SUFFIX {
        let name = if n == 0 {
            format!("{stem}.{ext}")
        } else {
            format!("{stem}-{n}.{ext}")
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(mut file) => {
                let written = async {
                    file.write_all(contents).await?;
                    file.flush().await
                }
                .await;
                drop(file);
                if let Err(e) = written {
                    return Err(discard_partial(&path, e).await);
                }
                debug!(path = %path.display(), bytes = contents.len(), "Created file");
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free file name for {stem}.{ext} in {}", dir.display()),
    ))
}

/// Remove a file whose write failed so its name is free again, and hand
/// back the write error.
async fn discard_partial(path: &Path, err: io::Error) -> io::Error {
    warn!(path = %path.display(), error = %err, "Write failed; removing partial file");
    if let Err(e) = fs::remove_file(path).await {
        warn!(path = %path.display(), error = %e, "Failed to remove partial file");
    }
    err
}
