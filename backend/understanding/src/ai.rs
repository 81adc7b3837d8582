//! Free-text analysis through an OpenAI-compatible chat-completions endpoint.
//!
//! Endpoint, key, model and prompt come from the runtime settings on every
//! call, so chat commands take effect on the next message.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use vaultbot_core::{BotError, RuntimeSettings, TextAnalyzer};
use vaultbot_markdown::normalize_math_delimiters;

const SERVICE: &str = "AI";

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatTurn>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatTurn {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatTurn,
}

pub struct ChatCompletionAnalyzer {
    client: reqwest::Client,
    normalize_math: bool,
}

impl ChatCompletionAnalyzer {
    pub fn new(timeout: Duration, normalize_math: bool) -> Result<Self, BotError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Config(format!("failed to build AI HTTP client: {e}")))?;
        Ok(Self {
            client,
            normalize_math,
        })
    }
}

/// The single user turn sent to the model: prompt, blank line, text.
pub fn build_prompt(settings: &RuntimeSettings, text: &str) -> String {
    format!("{}\n\n{}", settings.ai_system_prompt, text)
}

#[async_trait]
impl TextAnalyzer for ChatCompletionAnalyzer {
    async fn analyze(&self, settings: &RuntimeSettings, text: &str) -> Result<String, BotError> {
        if !settings.has_api_key() {
            return Err(BotError::Config("AI API key is not set (use -k <key>)".into()));
        }
        info!(model = %settings.ai_model, chars = text.chars().count(), "Requesting AI analysis");

        let request = CompletionRequest {
            model: &settings.ai_model,
            messages: vec![ChatTurn {
                role: "user".into(),
                content: build_prompt(settings, text),
            }],
        };

        let resp = self
            .client
            .post(settings.completions_url())
            .bearer_auth(&settings.ai_api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::from_reqwest(SERVICE, e))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(BotError::terminal(SERVICE, format!("HTTP {status}: {detail}")));
        }

        let body: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| BotError::from_reqwest(SERVICE, e))?;

        let answer = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| BotError::terminal(SERVICE, "response contained no choices"))?;

        Ok(if self.normalize_math {
            normalize_math_delimiters(&answer)
        } else {
            answer
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultbot_core::ErrorKind;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(server: &MockServer) -> RuntimeSettings {
        RuntimeSettings {
            ai_base_url: format!("{}/v1", server.uri()),
            ai_api_key: "sk-test".into(),
            ai_model: "deepseek-chat".into(),
            ai_system_prompt: "Summarize:".into(),
            auto_ai_analysis: true,
        }
    }

    fn answer(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        }))
    }

    #[tokio::test]
    async fn sends_prompt_and_returns_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_json(serde_json::json!({
                "model": "deepseek-chat",
                "messages": [{ "role": "user", "content": "Summarize:\n\nhello world" }]
            })))
            .respond_with(answer("a greeting"))
            .expect(1)
            .mount(&server)
            .await;

        let analyzer = ChatCompletionAnalyzer::new(Duration::from_secs(5), true).unwrap();
        let out = analyzer.analyze(&settings(&server), "hello world").await.unwrap();
        assert_eq!(out, "a greeting");
    }

    #[tokio::test]
    async fn normalizes_math_when_enabled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(answer("area \\(\\pi r^2\\)"))
            .mount(&server)
            .await;

        let on = ChatCompletionAnalyzer::new(Duration::from_secs(5), true).unwrap();
        let off = ChatCompletionAnalyzer::new(Duration::from_secs(5), false).unwrap();
        assert_eq!(on.analyze(&settings(&server), "x").await.unwrap(), "area $\\pi r^2$");
        assert_eq!(off.analyze(&settings(&server), "x").await.unwrap(), "area \\(\\pi r^2\\)");
    }

    #[tokio::test]
    async fn missing_key_is_config_error_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(answer("unused"))
            .expect(0)
            .mount(&server)
            .await;

        let mut s = settings(&server);
        s.ai_api_key = String::new();
        let analyzer = ChatCompletionAnalyzer::new(Duration::from_secs(5), true).unwrap();
        let err = analyzer.analyze(&s, "x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": { "message": "model not found" }
            })))
            .mount(&server)
            .await;

        let analyzer = ChatCompletionAnalyzer::new(Duration::from_secs(5), true).unwrap();
        let err = analyzer.analyze(&settings(&server), "x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TerminalApi);
    }

    #[tokio::test]
    async fn http_error_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let analyzer = ChatCompletionAnalyzer::new(Duration::from_secs(5), true).unwrap();
        let err = analyzer.analyze(&settings(&server), "x").await.unwrap_err();
        assert!(err.to_string().contains("bad key"));
    }
}
