//! `vaultbot status`: server liveness, vault contents and runtime settings.

use anyhow::Result;
use std::path::Path;
use std::time::Duration;

use vaultbot_config::{BotConfig, SettingsStore};

use crate::terminal_output::{note_success, note_warn, render_pairs};

pub async fn run(config: &BotConfig, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.server.port);
    let url = format!("http://127.0.0.1:{port}/api/health");
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()?;
    match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => {
            let body: serde_json::Value = resp.json().await.unwrap_or_default();
            let version = body["version"].as_str().unwrap_or("unknown");
            note_success(&format!("vaultbot {version} is running on port {port}"));
        }
        Ok(resp) => note_warn(&format!("Health check on port {port} returned {}", resp.status())),
        Err(_) => note_warn(&format!("vaultbot is not running on port {port}")),
    }

    let vault = &config.vault;
    println!("\nVault:");
    print!(
        "{}",
        render_pairs(&[
            ("path", vault.path.display().to_string()),
            ("enabled", vault.enabled.to_string()),
            ("notes", count_files(&vault.sync_path(), "md").to_string()),
            ("attachments", count_files(&vault.attachment_path(), "").to_string()),
        ])
    );

    let settings = SettingsStore::load(&config.runtime.settings_path, config.ai.to_runtime_settings())
        .await
        .snapshot()
        .await;
    println!("\nRuntime settings ({}):", config.runtime.settings_path);
    print!(
        "{}",
        render_pairs(&[
            ("model", settings.ai_model.clone()),
            ("base url", settings.ai_base_url.clone()),
            ("api key", if settings.has_api_key() { "set" } else { "not set" }.to_string()),
            ("auto analysis", settings.auto_ai_analysis.to_string()),
        ])
    );
    Ok(())
}

/// Regular files in `dir`, optionally filtered by extension. Missing dirs count as empty.
fn count_files(dir: &Path, ext: &str) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| ext.is_empty() || p.extension().is_some_and(|x| x == ext))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "").unwrap();
        std::fs::write(dir.path().join("b.md"), "").unwrap();
        std::fs::write(dir.path().join("c.png"), "").unwrap();
        std::fs::create_dir(dir.path().join("sub.md")).unwrap();

        assert_eq!(count_files(dir.path(), "md"), 2);
        assert_eq!(count_files(dir.path(), ""), 3);
        assert_eq!(count_files(&dir.path().join("nope"), "md"), 0);
    }
}
