//! Config file read/write.

use crate::defaults::apply_all_defaults;
use crate::env::resolve_env_vars;
use crate::schema::BotConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the config file path.
/// Priority: explicit path > `VAULTBOT_CONFIG` env > `~/.vaultbot/config.yaml`.
pub fn config_file_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("VAULTBOT_CONFIG") {
        return PathBuf::from(path);
    }
    config_dir().join(CONFIG_FILE_NAME)
}

/// The vaultbot state directory (`~/.vaultbot`, or `.vaultbot` without a home).
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".vaultbot"))
        .unwrap_or_else(|| PathBuf::from(".vaultbot"))
}

/// Load, env-substitute and default a config file.
///
/// Returns defaults if the file doesn't exist (first run).
pub async fn load_config(path: &Path) -> Result<BotConfig> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(apply_all_defaults(BotConfig::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&raw)
        .with_context(|| format!("Failed to load config at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Parse config YAML, resolving `${VAR}` references from the environment.
pub fn parse_config(raw: &str) -> Result<BotConfig> {
    let tree: serde_json::Value = if raw.trim().is_empty() {
        serde_json::Value::Object(Default::default())
    } else {
        serde_yaml::from_str(raw).context("Invalid config YAML")?
    };
    let tree = resolve_env_vars(&tree)?;
    let config: BotConfig = serde_json::from_value(tree).context("Config does not match schema")?;
    Ok(apply_all_defaults(config))
}

/// Write config to disk as YAML.
pub async fn write_config(config: &BotConfig, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;
    write_atomic(path, yaml.as_bytes()).await?;
    info!(path = %path.display(), "Wrote config");
    Ok(())
}

/// Write `contents` to a temp file next to `path`, then rename over it.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, contents)
        .await
        .with_context(|| format!("Failed to write temp file: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("nope.yaml")).await.unwrap();
        assert_eq!(config.server.port, crate::defaults::DEFAULT_PORT);
    }

    #[tokio::test]
    async fn write_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = BotConfig::default();
        config.server.port = 9123;
        config.feishu.app_id = "cli_123".into();
        write_config(&config, &path).await.unwrap();

        let loaded = load_config(&path).await.unwrap();
        assert_eq!(loaded.server.port, 9123);
        assert_eq!(loaded.feishu.app_id, "cli_123");
        assert!(!path.with_file_name("config.yaml.tmp").exists());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(parse_config("server: [unclosed").is_err());
    }

    #[test]
    fn empty_document_is_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, apply_all_defaults(BotConfig::default()));
    }
}
