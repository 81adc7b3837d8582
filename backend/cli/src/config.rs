//! Config loading for every subcommand, plus `vaultbot config ...`.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};

use vaultbot_config::{
    config_file_path, load_config, redacted_yaml, validate, validate_for_serve, write_config,
    BotConfig, ValidationReport,
};

use crate::terminal_output::{note_error, note_info, note_success, note_warn};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective config with secrets masked
    Show,
    /// Validate the config, including credentials needed by `serve`
    Check,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// The resolved config path and its contents (defaults when the file is missing).
pub async fn load(explicit: Option<&Path>) -> Result<(PathBuf, BotConfig)> {
    let path = config_file_path(explicit);
    let config = load_config(&path)
        .await
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    Ok((path, config))
}

pub async fn run(command: ConfigCommand, explicit: Option<&Path>) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let (path, config) = load(explicit).await?;
            note_info(&format!("Config file: {}", path.display()));
            print!("{}", redacted_yaml(&config)?);
        }
        ConfigCommand::Check => {
            let (path, config) = load(explicit).await?;
            note_info(&format!("Checking {}", path.display()));
            let report = validate_for_serve(&config);
            print_report(&report);
            if !report.is_valid() {
                bail!("{} config error(s)", report.errors.len());
            }
            note_success("Config is valid");
        }
        ConfigCommand::Init { force } => {
            let path = config_file_path(explicit);
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            write_config(&BotConfig::default(), &path).await?;
            note_success(&format!("Wrote default config to {}", path.display()));
        }
    }
    Ok(())
}

/// Print warnings and errors; returns nothing so callers decide how to fail.
pub fn print_report(report: &ValidationReport) {
    for warning in &report.warnings {
        note_warn(&warning.to_string());
    }
    for error in &report.errors {
        note_error(&error.to_string());
    }
}

/// Structural validation shared by commands that only touch the vault.
pub fn ensure_valid(config: &BotConfig) -> Result<()> {
    let report = validate(config);
    print_report(&report);
    if !report.is_valid() {
        bail!("{} config error(s)", report.errors.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn init_then_check_round_trips_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        run(ConfigCommand::Init { force: false }, Some(&path)).await.unwrap();
        let (_, config) = load(Some(&path)).await.unwrap();
        assert_eq!(config.server.port, BotConfig::default().server.port);

        let again = run(ConfigCommand::Init { force: false }, Some(&path)).await;
        assert!(again.is_err(), "init must not clobber an existing file");
    }

    #[tokio::test]
    async fn check_fails_without_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");
        assert!(run(ConfigCommand::Check, Some(&path)).await.is_err());
    }
}
