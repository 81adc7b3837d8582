//! vaultbot configuration schema, typed for serde YAML/JSON deserialization.
//!
//! Every section and field has a default, so a partial (or empty) file loads.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use vaultbot_core::{RetryPolicy, RuntimeSettings};

use crate::defaults::*;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BotConfig {
    pub server: ServerConfig,
    pub feishu: FeishuConfig,
    pub vault: VaultConfig,
    pub ocr: OcrConfig,
    pub ai: AiConfig,
    pub runtime: RuntimeConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Path the chat platform posts events to.
    pub webhook_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            webhook_path: DEFAULT_WEBHOOK_PATH.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Chat platform
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeishuConfig {
    pub api_base: String,
    pub app_id: String,
    pub app_secret: String,
    /// When set, inbound events must carry this token.
    pub verification_token: Option<String>,
    /// When set, inbound events must carry a valid `X-Lark-Signature`.
    pub encrypt_key: Option<String>,
}

impl Default for FeishuConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_FEISHU_API_BASE.to_string(),
            app_id: String::new(),
            app_secret: String::new(),
            verification_token: None,
            encrypt_key: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VaultConfig {
    /// Vault root directory.
    pub path: PathBuf,
    /// Attachment directory, relative to the vault root.
    pub attachment_dir: String,
    /// Note directory, relative to the vault root.
    pub sync_dir: String,
    pub enabled: bool,
    /// Also localize remote images found in AI answers (OCR output always is).
    pub rewrite_ai_results: bool,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_VAULT_PATH),
            attachment_dir: DEFAULT_ATTACHMENT_DIR.to_string(),
            sync_dir: DEFAULT_SYNC_DIR.to_string(),
            enabled: true,
            rewrite_ai_results: false,
        }
    }
}

impl VaultConfig {
    pub fn attachment_path(&self) -> PathBuf {
        self.path.join(&self.attachment_dir)
    }

    pub fn sync_path(&self) -> PathBuf {
        self.path.join(&self.sync_dir)
    }
}

// ---------------------------------------------------------------------------
// OCR
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OcrConfig {
    pub api_url: String,
    pub app_id: String,
    pub secret_code: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_OCR_API_URL.to_string(),
            app_id: String::new(),
            secret_code: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// AI
// ---------------------------------------------------------------------------

/// Initial AI settings. Chat commands override these at runtime; the
/// overrides live in the runtime settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub system_prompt: String,
    pub auto_analysis: bool,
    /// Rewrite `\[..\]` / `\(..\)` math delimiters in answers to `$$` / `$`.
    pub normalize_math: bool,
}

impl Default for AiConfig {
    fn default() -> Self {
        let settings = RuntimeSettings::default();
        Self {
            base_url: settings.ai_base_url,
            api_key: settings.ai_api_key,
            model: settings.ai_model,
            system_prompt: settings.ai_system_prompt,
            auto_analysis: settings.auto_ai_analysis,
            normalize_math: true,
        }
    }
}

impl AiConfig {
    /// Runtime settings seeded from this section.
    pub fn to_runtime_settings(&self) -> RuntimeSettings {
        RuntimeSettings {
            ai_base_url: self.base_url.clone(),
            ai_api_key: self.api_key.clone(),
            ai_model: self.model.clone(),
            ai_system_prompt: self.system_prompt.clone(),
            auto_ai_analysis: self.auto_analysis,
        }
    }
}

// ---------------------------------------------------------------------------
// Runtime settings file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeConfig {
    pub settings_path: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            settings_path: DEFAULT_SETTINGS_PATH.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    pub staleness_window_ms: i64,
    pub dedup_ttl_secs: u64,
    pub download_timeout_secs: u64,
    pub api_timeout_secs: u64,
    /// Retry policy for remote image downloads.
    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            staleness_window_ms: DEFAULT_STALENESS_WINDOW_MS,
            dedup_ttl_secs: DEFAULT_DEDUP_TTL_SECS,
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            api_timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for rolling JSON log files; console only when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            dir: None,
        }
    }
}
