//! In-memory collaborators for router and server tests.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicU32, Ordering};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vaultbot_config::{SettingsStore, VaultConfig};
use vaultbot_core::{
    BotError, ChatPlatform, FetchedImage, ImageFetcher, OcrEngine, RetryPolicy, RuntimeSettings,
    TextAnalyzer,
};
use vaultbot_media::VaultService;

use crate::router::{Clock, MessageRouter, RouterDeps};

#[derive(Default)]
pub struct FakePlatform {
    pub sent: Mutex<Vec<String>>,
    pub fetches: AtomicU32,
    pub fail_fetch: bool,
}

impl FakePlatform {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    fn name(&self) -> &str {
        "fake"
    }

    async fn send_text(&self, _chat_id: &str, text: &str) -> Result<(), BotError> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn fetch_image(&self, _message_id: &str, _image_key: &str) -> Result<Bytes, BotError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch {
            return Err(BotError::terminal("Feishu", "resource not found"));
        }
        Ok(Bytes::from_static(b"\x89PNG"))
    }
}

pub struct FakeOcr {
    pub result: Result<String, String>,
    pub calls: AtomicU32,
}

#[async_trait]
impl OcrEngine for FakeOcr {
    async fn recognize(&self, _image: &[u8]) -> Result<String, BotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(|m| BotError::terminal("OCR", m))
    }
}

#[derive(Default)]
pub struct FakeAnalyzer {
    pub calls: AtomicU32,
}

#[async_trait]
impl TextAnalyzer for FakeAnalyzer {
    async fn analyze(&self, settings: &RuntimeSettings, text: &str) -> Result<String, BotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("[{}] analysis of {text}", settings.ai_model))
    }
}

pub struct OfflineFetcher;

#[async_trait]
impl ImageFetcher for OfflineFetcher {
    async fn fetch(&self, _url: &str) -> Result<FetchedImage, BotError> {
        Err(BotError::TransientNetwork("offline".into()))
    }
}

/// A router over fakes, writing into `vault_root`.
pub async fn fake_router(platform: Arc<FakePlatform>, vault_root: &Path, clock: Clock) -> MessageRouter {
    let vault_config = VaultConfig {
        path: vault_root.to_path_buf(),
        ..Default::default()
    };
    let vault = VaultService::open(&vault_config, Arc::new(OfflineFetcher), RetryPolicy::single_attempt()).await;
    MessageRouter::new(RouterDeps {
        platform,
        ocr: Arc::new(FakeOcr {
            result: Ok("A".into()),
            calls: AtomicU32::new(0),
        }),
        analyzer: Arc::new(FakeAnalyzer::default()),
        vault: Arc::new(vault),
        settings: Arc::new(SettingsStore::in_memory(RuntimeSettings::default())),
        staleness_window_ms: 10_000,
        dedup_ttl: Duration::from_secs(600),
        clock,
    })
}
