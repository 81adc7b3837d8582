pub mod error;
pub mod event;
pub mod retry;
pub mod settings;
pub mod traits;

pub use error::{BotError, ErrorKind};
pub use event::{
    is_stale, ChatMessage, EventEnvelope, EventHeader, MessageBody, MessageReceiveEvent,
    MESSAGE_RECEIVE_V1, URL_VERIFICATION,
};
pub use retry::{retry, retry_with, RetryPolicy};
pub use settings::RuntimeSettings;
pub use traits::{ChatPlatform, FetchedImage, ImageFetcher, OcrEngine, TextAnalyzer};
