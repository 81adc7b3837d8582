//! Remote image localization.
//!
//! Every `![alt](http(s)://...)` link is downloaded into the attachment
//! store and pointed at the local copy. A link whose download ultimately
//! fails is left byte-for-byte as it was.

use std::sync::Arc;
use tracing::{info, warn};

use vaultbot_core::{retry, ImageFetcher, RetryPolicy};
use vaultbot_markdown::{find_remote_images, splice};

use crate::mime_detect::{extension_for_content_type, is_image};
use crate::store::AttachmentStore;

/// Result of one rewrite pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub text: String,
    /// Links now pointing at a local attachment.
    pub localized: usize,
    /// Links kept as remote because the download or save failed.
    pub kept: usize,
}

pub struct RemoteImageRewriter {
    fetcher: Arc<dyn ImageFetcher>,
    store: AttachmentStore,
    policy: RetryPolicy,
}

impl RemoteImageRewriter {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, store: AttachmentStore, policy: RetryPolicy) -> Self {
        Self {
            fetcher,
            store,
            policy,
        }
    }

    pub fn store(&self) -> &AttachmentStore {
        &self.store
    }

    pub async fn rewrite(&self, markdown: &str) -> String {
        self.rewrite_with_outcome(markdown).await.text
    }

    /// Localize links left to right. Replacements are spliced at the
    /// original offsets, so repeated identical links are handled one by one.
    pub async fn rewrite_with_outcome(&self, markdown: &str) -> RewriteOutcome {
        let refs = find_remote_images(markdown);
        if refs.is_empty() {
            return RewriteOutcome {
                text: markdown.to_string(),
                localized: 0,
                kept: 0,
            };
        }

        let mut edits = Vec::with_capacity(refs.len());
        for image in &refs {
            let url = image.source_url.as_str();
            let fetched = retry(&self.policy, "image download", || self.fetcher.fetch(url)).await;
            let fetched = match fetched {
                Ok(fetched) => fetched,
                Err(e) => {
                    warn!(url, error = %e, "Keeping remote image link");
                    continue;
                }
            };

            let content_type = fetched.content_type.as_deref();
            if let Some(ct) = content_type.filter(|ct| !is_image(ct)) {
                warn!(url, content_type = ct, "Downloaded resource is not labelled as an image");
            }
            let ext = extension_for_content_type(content_type);
            match self.store.save(&fetched.bytes, ext).await {
                Ok(attachment) => {
                    info!(url, path = %attachment.relative_path, "Localized remote image");
                    edits.push((image.span.clone(), image.with_target(&attachment.relative_path)));
                }
                Err(e) => warn!(url, error = %e, "Failed to save image; keeping remote link"),
            }
        }

        RewriteOutcome {
            localized: edits.len(),
            kept: refs.len() - edits.len(),
            text: splice(markdown, &edits),
        }
    }
}
