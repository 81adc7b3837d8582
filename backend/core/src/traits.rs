use async_trait::async_trait;
use bytes::Bytes;

use crate::error::BotError;
use crate::settings::RuntimeSettings;

/// Outbound side of the chat platform.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Platform name for logging.
    fn name(&self) -> &str;

    /// Send a plain-text message to a chat.
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), BotError>;

    /// Download the binary image attached to `message_id`.
    async fn fetch_image(&self, message_id: &str, image_key: &str) -> Result<Bytes, BotError>;
}

/// Image in, markdown out.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<String, BotError>;
}

/// Free-text analysis by a chat-completion model.
#[async_trait]
pub trait TextAnalyzer: Send + Sync {
    /// Analyze `text` using the endpoint, key, model and prompt in `settings`.
    async fn analyze(&self, settings: &RuntimeSettings, text: &str) -> Result<String, BotError>;
}

/// A downloaded remote resource.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// Single-shot remote image download. Retrying is the caller's job.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, BotError>;
}
