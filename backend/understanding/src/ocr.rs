//! Optical character recognition via the Textin document API.
//!
//! The image is posted as a raw octet-stream; the recognized page comes back
//! as markdown under `result.markdown`.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

use vaultbot_config::OcrConfig;
use vaultbot_core::{BotError, OcrEngine};

const SERVICE: &str = "OCR";

/// Application-level success code in the response body.
const OK_CODE: i64 = 200;

#[derive(Debug, Deserialize)]
struct OcrResponse {
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Option<OcrResult>,
}

#[derive(Debug, Deserialize)]
struct OcrResult {
    markdown: Option<String>,
}

pub struct TextinOcr {
    client: reqwest::Client,
    api_url: String,
    app_id: String,
    secret_code: String,
}

impl TextinOcr {
    pub fn new(config: &OcrConfig, timeout: Duration) -> Result<Self, BotError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Config(format!("failed to build OCR HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            app_id: config.app_id.clone(),
            secret_code: config.secret_code.clone(),
        })
    }
}

#[async_trait]
impl OcrEngine for TextinOcr {
    async fn recognize(&self, image: &[u8]) -> Result<String, BotError> {
        if self.app_id.is_empty() || self.secret_code.is_empty() {
            return Err(BotError::Config("OCR credentials are not configured".into()));
        }
        info!(bytes = image.len(), "Running OCR");

        let resp = self
            .client
            .post(&self.api_url)
            .header("content-type", "application/octet-stream")
            .header("x-ti-app-id", &self.app_id)
            .header("x-ti-secret-code", &self.secret_code)
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| BotError::from_reqwest(SERVICE, e))?;

        let status = resp.status();
        if status.as_u16() != 200 {
            return Err(BotError::terminal(SERVICE, format!("request failed with HTTP {status}")));
        }

        let body: OcrResponse = resp
            .json()
            .await
            .map_err(|e| BotError::from_reqwest(SERVICE, e))?;

        if body.code != Some(OK_CODE) {
            let message = body.message.unwrap_or_else(|| "unknown error".to_string());
            return Err(BotError::terminal(SERVICE, message));
        }

        body.result
            .and_then(|r| r.markdown)
            .ok_or_else(|| BotError::Parse("OCR response has no result.markdown".into()))
    }
}
