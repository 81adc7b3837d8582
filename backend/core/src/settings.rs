use serde::{Deserialize, Serialize};

pub const DEFAULT_AI_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_AI_MODEL: &str = "deepseek-chat";
pub const DEFAULT_AI_SYSTEM_PROMPT: &str =
    "Analyze and interpret the following content. Summarize the key information and give your insights:";

/// Settings that chat commands can change while the bot is running.
///
/// Serialized with snake_case keys so an existing `runtime_config.json`
/// keeps loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub ai_base_url: String,
    pub ai_api_key: String,
    pub ai_model: String,
    pub ai_system_prompt: String,
    pub auto_ai_analysis: bool,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            ai_base_url: DEFAULT_AI_BASE_URL.to_string(),
            ai_api_key: String::new(),
            ai_model: DEFAULT_AI_MODEL.to_string(),
            ai_system_prompt: DEFAULT_AI_SYSTEM_PROMPT.to_string(),
            auto_ai_analysis: true,
        }
    }
}

impl RuntimeSettings {
    pub fn has_api_key(&self) -> bool {
        !self.ai_api_key.trim().is_empty()
    }

    /// Completions endpoint for the configured base URL.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.ai_base_url.trim_end_matches('/'))
    }
}
