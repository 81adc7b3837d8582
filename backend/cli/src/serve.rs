//! `vaultbot serve`: wire every collaborator and run the webhook server.

use anyhow::{bail, Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use vaultbot_channels::FeishuClient;
use vaultbot_config::{validate_for_serve, BotConfig, SettingsStore};
use vaultbot_gateway::{start_server, system_clock, GatewayState, MessageRouter, RouterDeps, WebhookAuth};
use vaultbot_media::{HttpImageFetcher, VaultService};
use vaultbot_understanding::{ChatCompletionAnalyzer, TextinOcr};

use crate::config::print_report;

pub async fn run(config: BotConfig) -> Result<()> {
    let report = validate_for_serve(&config);
    print_report(&report);
    if !report.is_valid() {
        bail!("Refusing to start with {} config error(s)", report.errors.len());
    }

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.server.bind, config.server.port))?;
    info!(
        %addr,
        vault = %config.vault.path.display(),
        model = %config.ai.model,
        "Starting vaultbot"
    );

    let router = build_message_router(&config).await?;
    let state = GatewayState {
        router: Arc::new(router),
        auth: WebhookAuth {
            encrypt_key: config.feishu.encrypt_key.clone(),
            verification_token: config.feishu.verification_token.clone(),
        },
    };
    start_server(addr, &config.server.webhook_path, state).await
}

async fn build_message_router(config: &BotConfig) -> Result<MessageRouter> {
    let pipeline = &config.pipeline;
    let api_timeout = Duration::from_secs(pipeline.api_timeout_secs);

    let fetcher = HttpImageFetcher::new(Duration::from_secs(pipeline.download_timeout_secs))?;
    let vault = VaultService::open(&config.vault, Arc::new(fetcher), pipeline.retry.clone()).await;

    let settings = SettingsStore::load(&config.runtime.settings_path, config.ai.to_runtime_settings()).await;
    let platform = FeishuClient::new(config.feishu.clone(), api_timeout)?;
    let ocr = TextinOcr::new(&config.ocr, api_timeout)?;
    let analyzer = ChatCompletionAnalyzer::new(api_timeout, config.ai.normalize_math)?;

    Ok(MessageRouter::new(RouterDeps {
        platform: Arc::new(platform),
        ocr: Arc::new(ocr),
        analyzer: Arc::new(analyzer),
        vault: Arc::new(vault),
        settings: Arc::new(settings),
        staleness_window_ms: pipeline.staleness_window_ms,
        dedup_ttl: Duration::from_secs(pipeline.dedup_ttl_secs),
        clock: system_clock(),
    }))
}
