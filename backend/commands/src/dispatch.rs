/// Command dispatch: apply a parsed command to the runtime settings store.
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use vaultbot_config::SettingsStore;

use crate::registry::help_text;
use crate::types::Command;

/// Text reply to send back to the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub text: String,
}

impl CommandResponse {
    pub fn ok(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

pub struct CommandDispatcher {
    store: Arc<SettingsStore>,
}

impl CommandDispatcher {
    pub fn new(store: Arc<SettingsStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<SettingsStore> {
        &self.store
    }

    /// Apply `command`. Setting changes are persisted before the reply is
    /// built; a failed write leaves the settings unchanged and is returned.
    pub async fn dispatch(&self, command: Command) -> Result<CommandResponse> {
        info!(
            flag = command.flag(),
            mutates = command.mutates_settings(),
            "[Commands] Dispatching"
        );
        let text = match command {
            Command::Help => help_text(),
            Command::SetModel(model) => {
                let s = self.store.update(|s| s.ai_model = model).await?;
                format!("AI model switched to: {}", s.ai_model)
            }
            Command::SetBaseUrl(url) => {
                let s = self.store.update(|s| s.ai_base_url = url).await?;
                format!("AI base URL set to: {}", s.ai_base_url)
            }
            Command::SetApiKey(key) => {
                self.store.update(|s| s.ai_api_key = key).await?;
                "AI API key updated".to_string()
            }
            Command::SetSystemPrompt(prompt) => {
                let s = self.store.update(|s| s.ai_system_prompt = prompt).await?;
                format!("System prompt set to: {}", s.ai_system_prompt)
            }
            Command::EnableAutoAnalysis => {
                self.store.update(|s| s.auto_ai_analysis = true).await?;
                "Automatic AI analysis enabled".to_string()
            }
            Command::DisableAutoAnalysis => {
                self.store.update(|s| s.auto_ai_analysis = false).await?;
                "Automatic AI analysis disabled".to_string()
            }
        };
        Ok(CommandResponse::ok(text))
    }
}
