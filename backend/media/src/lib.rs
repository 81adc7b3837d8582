//! `vaultbot-media`: everything that puts bytes into the vault.
//!
//! - [`store`]: collision-free attachment files
//! - [`fetch`]: HTTP image download
//! - [`rewriter`]: remote image links to local attachments
//! - [`vault`]: chat image saving and note writing

pub mod fetch;
pub mod mime_detect;
pub mod rewriter;
pub mod store;
pub mod vault;

pub use fetch::HttpImageFetcher;
pub use mime_detect::extension_for_content_type;
pub use rewriter::{RemoteImageRewriter, RewriteOutcome};
pub use store::{create_unique, AttachmentStore, LocalAttachment};
pub use vault::VaultService;
