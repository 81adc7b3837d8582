//! Obsidian vault writer: image attachments and per-message notes.

use chrono::{Local, NaiveDateTime};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::{error, info, warn};

use vaultbot_config::VaultConfig;
use vaultbot_core::{BotError, ImageFetcher, RetryPolicy};
use vaultbot_markdown::{assemble, NoteDraft};

use crate::rewriter::RemoteImageRewriter;
use crate::store::{create_unique, AttachmentStore};

/// Extension for images received from the chat platform.
const CHAT_IMAGE_EXTENSION: &str = "png";

pub struct VaultService {
    enabled: bool,
    sync_dir: PathBuf,
    rewriter: RemoteImageRewriter,
    rewrite_ai_results: bool,
}

impl VaultService {
    /// Create the attachment and note directories. If either cannot be
    /// created the vault is disabled for the lifetime of the process.
    pub async fn open(
        config: &VaultConfig,
        fetcher: Arc<dyn ImageFetcher>,
        policy: RetryPolicy,
    ) -> Self {
        let store = AttachmentStore::new(&config.path, &config.attachment_dir);
        let sync_dir = config.sync_path();

        let mut enabled = config.enabled;
        if enabled {
            for dir in [store.dir_path(), sync_dir.clone()] {
                if let Err(e) = fs::create_dir_all(&dir).await {
                    error!(dir = %dir.display(), error = %e, "Failed to create vault directory; vault disabled");
                    enabled = false;
                    break;
                }
            }
        }
        if enabled {
            info!(vault = %config.path.display(), "Vault ready");
        } else {
            warn!("Vault disabled; images and notes will not be saved");
        }

        Self {
            enabled,
            sync_dir,
            rewriter: RemoteImageRewriter::new(fetcher, store, policy),
            rewrite_ai_results: config.rewrite_ai_results,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn rewriter(&self) -> &RemoteImageRewriter {
        &self.rewriter
    }

    /// Save a chat image and return its Obsidian embed
    /// (`![[<attachment_dir>/<file>]]`). `None` when the vault is disabled or
    /// the write fails.
    pub async fn save_image(&self, bytes: &[u8]) -> Option<String> {
        if !self.enabled {
            return None;
        }
        match self.rewriter.store().save(bytes, CHAT_IMAGE_EXTENSION).await {
            Ok(attachment) => {
                info!(path = %attachment.relative_path, "Saved chat image");
                Some(format!("![[{}]]", attachment.relative_path))
            }
            Err(e) => {
                error!(error = %e, "Failed to save image");
                None
            }
        }
    }

    /// Render `draft` to `<sync_dir>/<timestamp>.md`. OCR results have their
    /// remote images localized first. Returns the written path, or `None`
    /// when the vault is disabled.
    pub async fn create_note(&self, draft: NoteDraft) -> Result<Option<PathBuf>, BotError> {
        self.create_note_at(draft, Local::now().naive_local()).await
    }

    pub async fn create_note_at(
        &self,
        mut draft: NoteDraft,
        now: NaiveDateTime,
    ) -> Result<Option<PathBuf>, BotError> {
        if !self.enabled {
            return Ok(None);
        }

        for body in draft.ocr_results.iter_mut() {
            *body = self.rewriter.rewrite(body).await;
        }
        if self.rewrite_ai_results {
            for body in draft.ai_results.iter_mut() {
                *body = self.rewriter.rewrite(body).await;
            }
        }

        let note = assemble(&draft, now);
        let path = create_unique(&self.sync_dir, &note.timestamp, "md", note.to_markdown().as_bytes()).await?;
        info!(path = %path.display(), sections = note.sections.len(), "Wrote note");
        Ok(Some(path))
    }
}
