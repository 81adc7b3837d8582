//! Wire types for inbound chat-platform webhook events (Feishu event schema 2.0).

use serde::{Deserialize, Serialize};

use crate::error::BotError;

pub const URL_VERIFICATION: &str = "url_verification";
pub const MESSAGE_RECEIVE_V1: &str = "im.message.receive_v1";

/// Top-level webhook body. Covers both the URL-verification handshake and
/// regular event callbacks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(default)]
    pub schema: Option<String>,
    /// Present on `url_verification` handshakes.
    #[serde(rename = "type", default)]
    pub envelope_type: Option<String>,
    #[serde(default)]
    pub challenge: Option<String>,
    /// Verification token on handshakes (schema 1.0 puts it here too).
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub header: Option<EventHeader>,
    #[serde(default)]
    pub event: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventHeader {
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageReceiveEvent {
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub chat_id: String,
    #[serde(default)]
    pub message_type: String,
    /// JSON-encoded content object, shape depends on `message_type`.
    #[serde(default)]
    pub content: String,
    /// Creation time in milliseconds since the epoch, as a decimal string.
    #[serde(default)]
    pub create_time: String,
}

/// Decoded message content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    Image { image_key: String },
    Unsupported(String),
}

#[derive(Deserialize)]
struct TextContent {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ImageContent {
    #[serde(default)]
    image_key: Option<String>,
}

impl EventEnvelope {
    pub fn is_url_verification(&self) -> bool {
        self.envelope_type.as_deref() == Some(URL_VERIFICATION)
    }

    pub fn event_type(&self) -> Option<&str> {
        self.header.as_ref().map(|h| h.event_type.as_str())
    }

    pub fn event_id(&self) -> Option<&str> {
        self.header
            .as_ref()
            .map(|h| h.event_id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// Verification token, wherever this schema version carries it.
    pub fn verification_token(&self) -> Option<&str> {
        self.header
            .as_ref()
            .and_then(|h| h.token.as_deref())
            .or(self.token.as_deref())
    }

    /// Decode `event` as a message-receive payload.
    ///
    /// Returns `Ok(None)` for other event types or a missing `event` object.
    pub fn message_event(&self) -> Result<Option<MessageReceiveEvent>, BotError> {
        if self.event_type() != Some(MESSAGE_RECEIVE_V1) {
            return Ok(None);
        }
        let Some(event) = &self.event else {
            return Ok(None);
        };
        serde_json::from_value(event.clone())
            .map(Some)
            .map_err(|e| BotError::Parse(format!("message event: {e}")))
    }
}

impl ChatMessage {
    /// Creation time in ms; unparseable values count as 0 (and are therefore stale).
    pub fn create_time_ms(&self) -> i64 {
        self.create_time.trim().parse().unwrap_or(0)
    }

    pub fn body(&self) -> Result<MessageBody, BotError> {
        match self.message_type.as_str() {
            "text" => {
                let content: TextContent = parse_content(&self.content)?;
                Ok(MessageBody::Text(content.text.trim().to_string()))
            }
            "image" => {
                let content: ImageContent = parse_content(&self.content)?;
                match content.image_key.filter(|k| !k.is_empty()) {
                    Some(image_key) => Ok(MessageBody::Image { image_key }),
                    None => Err(BotError::Parse("image message without image_key".into())),
                }
            }
            other => Ok(MessageBody::Unsupported(other.to_string())),
        }
    }
}

fn parse_content<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<T, BotError> {
    let raw = if raw.trim().is_empty() { "{}" } else { raw };
    serde_json::from_str(raw).map_err(|e| BotError::Parse(format!("message content: {e}")))
}

/// Whether an event created at `created_ms` is outside the staleness window
/// at `now_ms`. Clock skew in either direction counts.
pub fn is_stale(created_ms: i64, now_ms: i64, window_ms: i64) -> bool {
    now_ms.abs_diff(created_ms) > window_ms.max(0) as u64
}
