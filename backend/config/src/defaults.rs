//! Config defaults: fallback values and the pass that fills blank fields.

use crate::schema::BotConfig;

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 7000;
pub const DEFAULT_WEBHOOK_PATH: &str = "/webhook/feishu";

pub const DEFAULT_FEISHU_API_BASE: &str = "https://open.feishu.cn/open-apis";

pub const DEFAULT_VAULT_PATH: &str = "vault";
pub const DEFAULT_ATTACHMENT_DIR: &str = "attachments";
pub const DEFAULT_SYNC_DIR: &str = "sync";

pub const DEFAULT_OCR_API_URL: &str = "https://api.textin.com/ai/service/v1/pdf_to_markdown";

pub const DEFAULT_SETTINGS_PATH: &str = "config/runtime_config.json";

/// Events older (or newer) than this relative to receipt are dropped.
pub const DEFAULT_STALENESS_WINDOW_MS: i64 = 10_000;

/// How long a delivered event id is remembered for de-duplication.
pub const DEFAULT_DEDUP_TTL_SECS: u64 = 600;

/// Per-request timeout for remote image downloads.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;

/// Per-request timeout for platform, OCR and AI calls.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Fill blank string fields with their defaults.
///
/// Serde already supplies defaults for missing keys; this covers keys that
/// are present but empty (typically `${VAR}` placeholders left blank).
pub fn apply_all_defaults(config: BotConfig) -> BotConfig {
    let config = apply_server_defaults(config);
    let config = apply_vault_defaults(config);
    let config = apply_endpoint_defaults(config);
    apply_logging_defaults(config)
}

fn fill(value: &mut String, default: &str) {
    if value.trim().is_empty() {
        *value = default.to_string();
    }
}

fn apply_server_defaults(mut config: BotConfig) -> BotConfig {
    fill(&mut config.server.bind, DEFAULT_BIND);
    fill(&mut config.server.webhook_path, DEFAULT_WEBHOOK_PATH);
    if !config.server.webhook_path.starts_with('/') {
        config.server.webhook_path = format!("/{}", config.server.webhook_path);
    }
    config
}

fn apply_vault_defaults(mut config: BotConfig) -> BotConfig {
    fill(&mut config.vault.attachment_dir, DEFAULT_ATTACHMENT_DIR);
    fill(&mut config.vault.sync_dir, DEFAULT_SYNC_DIR);
    fill(&mut config.runtime.settings_path, DEFAULT_SETTINGS_PATH);
    config
}

fn apply_endpoint_defaults(mut config: BotConfig) -> BotConfig {
    fill(&mut config.feishu.api_base, DEFAULT_FEISHU_API_BASE);
    fill(&mut config.ocr.api_url, DEFAULT_OCR_API_URL);
    fill(
        &mut config.ai.base_url,
        vaultbot_core::settings::DEFAULT_AI_BASE_URL,
    );
    fill(&mut config.ai.model, vaultbot_core::settings::DEFAULT_AI_MODEL);
    fill(
        &mut config.ai.system_prompt,
        vaultbot_core::settings::DEFAULT_AI_SYSTEM_PROMPT,
    );
    config
}

fn apply_logging_defaults(mut config: BotConfig) -> BotConfig {
    fill(&mut config.logging.level, DEFAULT_LOG_LEVEL);
    config
}
