//! Persisted runtime settings.
//!
//! Chat commands mutate these while the bot runs. Every mutation is written
//! to a JSON file before it becomes visible, and writes are serialized by the
//! store's lock, so concurrent commands cannot interleave a half-applied
//! change.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{info, warn};

use vaultbot_core::RuntimeSettings;

use crate::io::write_atomic;

pub struct SettingsStore {
    path: Option<PathBuf>,
    current: RwLock<RuntimeSettings>,
}

impl SettingsStore {
    /// Load settings from `path`, falling back to `seed` when the file is
    /// missing or unreadable. Keys absent from the file keep their `seed` value.
    pub async fn load(path: impl Into<PathBuf>, seed: RuntimeSettings) -> Self {
        let path = path.into();
        let settings = match read_settings(&path, &seed).await {
            Ok(Some(settings)) => {
                info!(path = %path.display(), "Loaded runtime settings");
                settings
            }
            Ok(None) => {
                warn!(path = %path.display(), "Runtime settings file not found; using configured defaults");
                seed
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load runtime settings; using configured defaults");
                seed
            }
        };
        Self {
            path: Some(path),
            current: RwLock::new(settings),
        }
    }

    /// A store that never touches the filesystem.
    pub fn in_memory(settings: RuntimeSettings) -> Self {
        Self {
            path: None,
            current: RwLock::new(settings),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn snapshot(&self) -> RuntimeSettings {
        self.current.read().await.clone()
    }

    /// Apply `mutate` and persist the result. On a failed write the
    /// in-memory settings are left untouched.
    pub async fn update<F>(&self, mutate: F) -> Result<RuntimeSettings>
    where
        F: FnOnce(&mut RuntimeSettings),
    {
        let mut guard = self.current.write().await;
        let mut next = guard.clone();
        mutate(&mut next);

        if let Some(path) = &self.path {
            let json = serde_json::to_vec_pretty(&next).context("Failed to serialize runtime settings")?;
            write_atomic(path, &json).await?;
        }

        *guard = next.clone();
        Ok(next)
    }
}

async fn read_settings(path: &Path, seed: &RuntimeSettings) -> Result<Option<RuntimeSettings>> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let stored: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid runtime settings JSON in {}", path.display()))?;
    let settings = overlay(seed, stored)
        .with_context(|| format!("Invalid runtime settings in {}", path.display()))?;
    Ok(Some(settings))
}

/// `seed` with every key present in `stored` replaced.
fn overlay(seed: &RuntimeSettings, stored: Value) -> Result<RuntimeSettings> {
    let Value::Object(stored) = stored else {
        bail!("expected a JSON object");
    };
    let mut merged = serde_json::to_value(seed)?;
    if let Value::Object(base) = &mut merged {
        base.extend(stored);
    }
    Ok(serde_json::from_value(merged)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> RuntimeSettings {
        RuntimeSettings {
            ai_model: "seed-model".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn missing_file_uses_seed_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtime_config.json");

        let store = SettingsStore::load(&path, seed()).await;
        assert_eq!(store.snapshot().await.ai_model, "seed-model");
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn update_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("runtime_config.json");

        let store = SettingsStore::load(&path, seed()).await;
        let updated = store
            .update(|s| {
                s.ai_model = "deepseek-reasoner".into();
                s.auto_ai_analysis = false;
            })
            .await
            .unwrap();
        assert_eq!(updated.ai_model, "deepseek-reasoner");

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"ai_model\": \"deepseek-reasoner\""));

        let reloaded = SettingsStore::load(&path, RuntimeSettings::default()).await;
        let snapshot = reloaded.snapshot().await;
        assert_eq!(snapshot.ai_model, "deepseek-reasoner");
        assert!(!snapshot.auto_ai_analysis);
    }

    #[tokio::test]
    async fn partial_file_keeps_seed_for_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtime_config.json");
        std::fs::write(&path, r#"{"auto_ai_analysis": false}"#).unwrap();

        let seed = RuntimeSettings {
            ai_api_key: "sk-from-config".into(),
            ..seed()
        };
        let snapshot = SettingsStore::load(&path, seed).await.snapshot().await;
        assert!(!snapshot.auto_ai_analysis);
        assert_eq!(snapshot.ai_api_key, "sk-from-config");
        assert_eq!(snapshot.ai_model, "seed-model");
    }

    #[tokio::test]
    async fn non_object_file_falls_back_to_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtime_config.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let store = SettingsStore::load(&path, seed()).await;
        assert_eq!(store.snapshot().await.ai_model, "seed-model");
    }

    #[tokio::test]
    async fn corrupt_file_falls_back_to_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtime_config.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = SettingsStore::load(&path, seed()).await;
        assert_eq!(store.snapshot().await.ai_model, "seed-model");
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_settings() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = dir.path().join("runtime_config.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupied"), "x").unwrap();

        let store = SettingsStore::load(&path, seed()).await;
        let result = store.update(|s| s.ai_model = "never".into()).await;
        assert!(result.is_err());
        assert_eq!(store.snapshot().await.ai_model, "seed-model");
    }

    #[tokio::test]
    async fn in_memory_store_updates() {
        let store = SettingsStore::in_memory(seed());
        store.update(|s| s.ai_api_key = "sk-test".into()).await.unwrap();
        assert!(store.snapshot().await.has_api_key());
        assert!(store.path().is_none());
    }
}
