/// Feishu (Lark) open-platform client.
///
/// Sends chat replies and downloads image resources through the REST API,
/// authenticating with a tenant access token that is cached until shortly
/// before it expires.
///
/// Endpoints (relative to `feishu.apiBase`):
///   POST auth/v3/tenant_access_token/internal
///   POST im/v1/messages?receive_id_type=chat_id
///   GET  im/v1/messages/{message_id}
///   GET  im/v1/messages/{message_id}/resources/{image_key}?type=image
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use vaultbot_config::FeishuConfig;
use vaultbot_core::{BotError, ChatPlatform};

const SERVICE: &str = "Feishu";

/// Tokens are refreshed this long before the server-side expiry.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Application codes meaning the tenant token is no longer accepted.
const TOKEN_INVALID_CODES: &[i64] = &[99991663, 99991661, 99991668];

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct TokenRequest<'a> {
    app_id: &'a str,
    app_secret: &'a str,
}

#[derive(Deserialize, Debug)]
struct TokenResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    tenant_access_token: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    expire: u64,
}

/// Common `{code, msg, data}` envelope of every open-platform response.
#[derive(Deserialize, Debug)]
struct ApiResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    receive_id: &'a str,
    msg_type: &'a str,
    /// JSON-encoded `{"text": ...}`.
    content: String,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct FeishuClient {
    config: FeishuConfig,
    http_client: Client,
    token: Mutex<Option<CachedToken>>,
}

impl FeishuClient {
    pub fn new(config: FeishuConfig, timeout: Duration) -> Result<Self, BotError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Config(format!("failed to build Feishu HTTP client: {e}")))?;
        Ok(Self {
            config,
            http_client,
            token: Mutex::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    /// A valid tenant access token, from cache when possible.
    pub async fn tenant_access_token(&self) -> Result<String, BotError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| Instant::now() < t.refresh_at) {
            return Ok(token.value.clone());
        }

        let resp = self
            .http_client
            .post(self.url("auth/v3/tenant_access_token/internal"))
            .json(&TokenRequest {
                app_id: &self.config.app_id,
                app_secret: &self.config.app_secret,
            })
            .send()
            .await
            .map_err(|e| BotError::from_reqwest(SERVICE, e))?;
        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| BotError::from_reqwest(SERVICE, e))?;

        let token = match body.tenant_access_token {
            Some(token) if body.code == 0 => token,
            _ => {
                return Err(BotError::terminal(
                    SERVICE,
                    format!("failed to get tenant_access_token: code {} {}", body.code, body.msg),
                ))
            }
        };

        let lifetime = Duration::from_secs(body.expire).saturating_sub(TOKEN_REFRESH_MARGIN);
        debug!(expire_secs = body.expire, "[Feishu] Refreshed tenant access token");
        *cached = Some(CachedToken {
            value: token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(token)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    /// Turn a non-zero application code into an error, dropping the cached
    /// token when the server rejected it.
    async fn check(&self, what: &str, body: ApiResponse) -> Result<Option<Value>, BotError> {
        if body.code == 0 {
            return Ok(body.data);
        }
        if TOKEN_INVALID_CODES.contains(&body.code) {
            warn!(code = body.code, "[Feishu] Tenant token rejected; clearing cache");
            self.invalidate_token().await;
        }
        Err(BotError::terminal(
            SERVICE,
            format!("{what} failed: code {} {}", body.code, body.msg),
        ))
    }

    /// Look up the `image_key` of an image message.
    pub async fn image_key_for(&self, message_id: &str) -> Result<String, BotError> {
        let token = self.tenant_access_token().await?;
        let resp = self
            .http_client
            .get(self.url(&format!("im/v1/messages/{message_id}")))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| BotError::from_reqwest(SERVICE, e))?;
        let body: ApiResponse = resp
            .json()
            .await
            .map_err(|e| BotError::from_reqwest(SERVICE, e))?;
        let data = self.check("get message", body).await?.unwrap_or_default();

        let content = data["items"][0]["body"]["content"]
            .as_str()
            .ok_or_else(|| BotError::Parse("message has no body content".into()))?;
        let content: Value = serde_json::from_str(content)
            .map_err(|e| BotError::Parse(format!("message content is not JSON: {e}")))?;
        content["image_key"]
            .as_str()
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .ok_or_else(|| BotError::Parse("image_key not found in message".into()))
    }
}

#[async_trait]
impl ChatPlatform for FeishuClient {
    fn name(&self) -> &str {
        "feishu"
    }

    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), BotError> {
        let token = self.tenant_access_token().await?;
        let payload = SendMessage {
            receive_id: chat_id,
            msg_type: "text",
            content: serde_json::json!({ "text": text }).to_string(),
        };
        let resp = self
            .http_client
            .post(self.url("im/v1/messages"))
            .query(&[("receive_id_type", "chat_id")])
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| BotError::from_reqwest(SERVICE, e))?;
        let body: ApiResponse = resp
            .json()
            .await
            .map_err(|e| BotError::from_reqwest(SERVICE, e))?;
        self.check("send message", body).await?;
        info!(chat_id, chars = text.chars().count(), "[Feishu] Sent message");
        Ok(())
    }

    async fn fetch_image(&self, message_id: &str, image_key: &str) -> Result<Bytes, BotError> {
        let image_key = if image_key.is_empty() {
            self.image_key_for(message_id).await?
        } else {
            image_key.to_string()
        };

        let token = self.tenant_access_token().await?;
        let resp = self
            .http_client
            .get(self.url(&format!("im/v1/messages/{message_id}/resources/{image_key}")))
            .query(&[("type", "image")])
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| BotError::from_reqwest(SERVICE, e))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(BotError::terminal(
                SERVICE,
                format!("failed to get image resource: HTTP {status} {detail}"),
            ));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| BotError::from_reqwest(SERVICE, e))?;
        info!(message_id, bytes = bytes.len(), "[Feishu] Downloaded image");
        Ok(bytes)
    }
}
