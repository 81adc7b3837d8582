//! Config validation: collects every problem in one pass.

use crate::schema::BotConfig;
use std::path::Path;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Structural checks that apply to every command.
pub fn validate(config: &BotConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_vault(config, &mut report);
    validate_pipeline(config, &mut report);
    report
}

/// [`validate`] plus the credentials needed to actually serve webhooks.
pub fn validate_for_serve(config: &BotConfig) -> ValidationReport {
    let mut report = validate(config);
    if config.feishu.app_id.trim().is_empty() {
        report.error("feishu.appId", "App ID is required to call the platform API");
    }
    if config.feishu.app_secret.trim().is_empty() {
        report.error("feishu.appSecret", "App secret is required to call the platform API");
    }
    if config.ocr.app_id.trim().is_empty() || config.ocr.secret_code.trim().is_empty() {
        report.warn("ocr", "OCR credentials missing; image messages will fail OCR");
    }
    if config.feishu.verification_token.is_none() && config.feishu.encrypt_key.is_none() {
        report.warn(
            "feishu",
            "Neither verificationToken nor encryptKey set; webhook requests are not authenticated",
        );
    }
    report
}

fn validate_server(config: &BotConfig, report: &mut ValidationReport) {
    if config.server.port == 0 {
        report.error("server.port", "Port must be non-zero");
    }
    if !config.server.webhook_path.starts_with('/') {
        report.error("server.webhookPath", "Webhook path must start with '/'");
    }
}

fn validate_vault(config: &BotConfig, report: &mut ValidationReport) {
    if !config.vault.enabled {
        report.warn("vault.enabled", "Vault disabled; notes and images will not be saved");
        return;
    }
    if config.vault.path.as_os_str().is_empty() {
        report.error("vault.path", "Vault path cannot be empty");
    }
    check_relative_dir("vault.attachmentDir", &config.vault.attachment_dir, report);
    check_relative_dir("vault.syncDir", &config.vault.sync_dir, report);
}

fn check_relative_dir(path: &str, dir: &str, report: &mut ValidationReport) {
    if dir.trim().is_empty() {
        report.error(path, "Directory cannot be empty");
    } else if Path::new(dir).is_absolute() {
        report.error(path, "Directory must be relative to the vault root");
    } else if dir.split(['/', '\\']).any(|part| part == "..") {
        report.error(path, "Directory must stay inside the vault");
    }
}

fn validate_pipeline(config: &BotConfig, report: &mut ValidationReport) {
    let pipeline = &config.pipeline;
    if pipeline.staleness_window_ms <= 0 {
        report.error("pipeline.stalenessWindowMs", "Staleness window must be positive");
    }
    if pipeline.download_timeout_secs == 0 {
        report.error("pipeline.downloadTimeoutSecs", "Download timeout must be positive");
    }
    if pipeline.api_timeout_secs == 0 {
        report.error("pipeline.apiTimeoutSecs", "API timeout must be positive");
    }

    let retry = &pipeline.retry;
    if retry.max_attempts < 1 {
        report.error("pipeline.retry.maxAttempts", "At least one attempt is required");
    }
    if retry.backoff_factor.is_nan() || retry.backoff_factor <= 1.0 {
        report.error("pipeline.retry.backoffFactor", "Backoff factor must be greater than 1");
    }
    if retry.max_delay_ms < retry.initial_delay_ms {
        report.warn(
            "pipeline.retry.maxDelayMs",
            "Max delay is below the initial delay; every retry waits maxDelayMs",
        );
    }
    if retry.retry_on.is_empty() && retry.max_attempts > 1 {
        report.warn("pipeline.retry.retryOn", "No retryable error kinds; maxAttempts has no effect");
    }
}
