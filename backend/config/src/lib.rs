//! `vaultbot-config`: vaultbot configuration management.
//!
//! Provides:
//! - Typed config schema (server, platform, vault, OCR, AI, pipeline, logging)
//! - YAML read/write with `${ENV_VAR}` substitution
//! - Default value application and schema validation
//! - Config redaction for safe logging/display
//! - The persisted runtime-settings store mutated by chat commands

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod runtime;
pub mod schema;
pub mod validation;

pub use io::{config_file_path, load_config, parse_config, write_config};
pub use redact::{redact, redacted_yaml};
pub use runtime::SettingsStore;
pub use schema::{
    AiConfig, BotConfig, FeishuConfig, LoggingConfig, OcrConfig, PipelineConfig, RuntimeConfig,
    ServerConfig, VaultConfig,
};
pub use validation::{validate, validate_for_serve, ConfigValidationError, ValidationReport};
