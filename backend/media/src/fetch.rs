//! HTTP image download.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

use vaultbot_core::{BotError, FetchedImage, ImageFetcher};

const SERVICE: &str = "image download";

/// Single-request image download with a per-request timeout.
///
/// Connection failures and timeouts surface as transient errors; any
/// non-2xx status is terminal.
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, BotError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, BotError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BotError::from_reqwest(SERVICE, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BotError::terminal(SERVICE, format!("HTTP {status} for {url}")));
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| BotError::from_reqwest(SERVICE, e))?;

        debug!(url, bytes = bytes.len(), content_type = ?content_type, "Downloaded image");
        Ok(FetchedImage { bytes, content_type })
    }
}
