//! Content understanding for vaultbot: OCR for images, chat-completion
//! analysis for text.

pub mod ai;
pub mod ocr;

pub use ai::{build_prompt, ChatCompletionAnalyzer};
pub use ocr::TextinOcr;
