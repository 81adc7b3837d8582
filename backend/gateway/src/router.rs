//! Message router: one inbound chat message through the whole pipeline.
//!
//! Stale and duplicate deliveries are dropped before any collaborator is
//! touched. Text is either a command or input for AI analysis; an image is
//! saved, OCR'd and optionally analysed. Whatever was collected ends up in
//! one vault note.

use moka::sync::Cache;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use vaultbot_commands::{parse_command, Command, CommandDispatcher};
use vaultbot_config::SettingsStore;
use vaultbot_core::{
    is_stale, BotError, ChatMessage, ChatPlatform, EventEnvelope, MessageBody, OcrEngine,
    TextAnalyzer,
};
use vaultbot_logging::{EventLogger, PipelineEvent};
use vaultbot_markdown::NoteDraft;
use vaultbot_media::VaultService;

/// Milliseconds since the epoch.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| chrono::Utc::now().timestamp_millis())
}

/// What happened to one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not a message event (or a handshake); nothing to do.
    Ignored,
    Stale,
    Duplicate,
    Unsupported(String),
    Command,
    /// The pipeline ran. `note` is `None` when nothing was written.
    Processed { note: Option<PathBuf> },
    /// The pipeline aborted and the failure was reported in chat.
    Failed,
}

/// Collaborators and limits for a [`MessageRouter`].
pub struct RouterDeps {
    pub platform: Arc<dyn ChatPlatform>,
    pub ocr: Arc<dyn OcrEngine>,
    pub analyzer: Arc<dyn TextAnalyzer>,
    pub vault: Arc<VaultService>,
    pub settings: Arc<SettingsStore>,
    pub staleness_window_ms: i64,
    pub dedup_ttl: Duration,
    pub clock: Clock,
}

pub struct MessageRouter {
    platform: Arc<dyn ChatPlatform>,
    ocr: Arc<dyn OcrEngine>,
    analyzer: Arc<dyn TextAnalyzer>,
    vault: Arc<VaultService>,
    settings: Arc<SettingsStore>,
    commands: CommandDispatcher,
    staleness_window_ms: i64,
    seen: Cache<String, ()>,
    clock: Clock,
}

impl MessageRouter {
    pub fn new(deps: RouterDeps) -> Self {
        Self {
            commands: CommandDispatcher::new(deps.settings.clone()),
            platform: deps.platform,
            ocr: deps.ocr,
            analyzer: deps.analyzer,
            vault: deps.vault,
            settings: deps.settings,
            staleness_window_ms: deps.staleness_window_ms,
            seen: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(deps.dedup_ttl)
                .build(),
            clock: deps.clock,
        }
    }

    /// Route a decoded webhook body. Only a malformed message event is an
    /// error; pipeline failures are reported in chat instead.
    pub async fn handle_event(&self, envelope: &EventEnvelope) -> Result<Outcome, BotError> {
        let Some(event) = envelope.message_event()? else {
            info!(event_type = ?envelope.event_type(), "Ignoring non-message event");
            return Ok(Outcome::Ignored);
        };
        let message = event.message;

        let now_ms = (self.clock)();
        let created_ms = message.create_time_ms();
        if is_stale(created_ms, now_ms, self.staleness_window_ms) {
            warn!(
                message_id = %message.message_id,
                created_ms,
                now_ms,
                "Dropping stale event"
            );
            EventLogger::log_event(
                &message.message_id,
                PipelineEvent::Dropped {
                    reason: format!("stale by {} ms", now_ms.abs_diff(created_ms)),
                },
            );
            return Ok(Outcome::Stale);
        }

        let key = envelope
            .event_id()
            .unwrap_or(message.message_id.as_str())
            .to_string();
        if !key.is_empty() && !self.seen.entry(key).or_insert(()).is_fresh() {
            info!(message_id = %message.message_id, "Dropping duplicate delivery");
            EventLogger::log_event(
                &message.message_id,
                PipelineEvent::Dropped {
                    reason: "duplicate".into(),
                },
            );
            return Ok(Outcome::Duplicate);
        }

        Ok(self.handle_message(&message).await)
    }

    pub async fn handle_message(&self, message: &ChatMessage) -> Outcome {
        let chat_id = message.chat_id.as_str();
        let message_id = message.message_id.as_str();

        let body = match message.body() {
            Ok(body) => body,
            Err(e) => {
                self.fail(chat_id, message_id, "decode", &e).await;
                return Outcome::Failed;
            }
        };

        let mut draft = NoteDraft::default();
        match body {
            MessageBody::Unsupported(kind) => {
                info!(message_id, message_type = %kind, "Ignoring unsupported message type");
                return Outcome::Unsupported(kind);
            }
            MessageBody::Text(text) => {
                EventLogger::log_event(
                    message_id,
                    PipelineEvent::Received {
                        message_type: "text".into(),
                    },
                );
                if text.starts_with('-') {
                    if let Some(command) = parse_command(&text) {
                        self.run_command(chat_id, message_id, &text, command).await;
                        return Outcome::Command;
                    }
                }
                let settings = self.settings.snapshot().await;
                if settings.auto_ai_analysis && !text.starts_with('-') {
                    if let Some(answer) = self.analyze(chat_id, message_id, &text).await {
                        draft.ai_results.push(answer);
                    }
                }
                draft.text = Some(text);
            }
            MessageBody::Image { image_key } => {
                EventLogger::log_event(
                    message_id,
                    PipelineEvent::Received {
                        message_type: "image".into(),
                    },
                );
                let image = match self.platform.fetch_image(message_id, &image_key).await {
                    Ok(image) => image,
                    Err(e) => {
                        self.fail(chat_id, message_id, "fetch_image", &e).await;
                        return Outcome::Failed;
                    }
                };
                if let Some(link) = self.vault.save_image(&image).await {
                    draft.image_links.push(link);
                }

                self.reply(chat_id, "Processing image, please wait...").await;
                match self.ocr.recognize(&image).await {
                    Ok(text) => {
                        self.reply(chat_id, &format!("OCR result:\n\n{text}")).await;
                        let settings = self.settings.snapshot().await;
                        if settings.auto_ai_analysis {
                            if let Some(answer) = self.analyze(chat_id, message_id, &text).await {
                                draft.ai_results.push(answer);
                            }
                        }
                        draft.ocr_results.push(text);
                    }
                    Err(e) => {
                        self.stage_failed(message_id, "ocr", &e);
                        self.reply(chat_id, &format!("OCR failed: {e}")).await;
                    }
                }
            }
        }

        let note = self.write_note(chat_id, message_id, draft).await;
        Outcome::Processed { note }
    }

    async fn run_command(&self, chat_id: &str, message_id: &str, text: &str, command: Command) {
        EventLogger::log_event(message_id, PipelineEvent::Command { text: text.into() });
        match self.commands.dispatch(command).await {
            Ok(resp) => self.reply(chat_id, &resp.text).await,
            Err(e) => {
                warn!(message_id, error = %e, "Command failed");
                self.reply(chat_id, &format!("Command failed: {e}")).await;
            }
        }
    }

    /// AI analysis with chat progress messages. `None` on failure.
    async fn analyze(&self, chat_id: &str, message_id: &str, text: &str) -> Option<String> {
        self.reply(chat_id, "Running AI analysis...").await;
        let settings = self.settings.snapshot().await;
        match self.analyzer.analyze(&settings, text).await {
            Ok(answer) => {
                self.reply(chat_id, &format!("AI analysis result:\n\n{answer}")).await;
                Some(answer)
            }
            Err(e) => {
                self.stage_failed(message_id, "ai", &e);
                self.reply(chat_id, &format!("AI analysis failed: {e}")).await;
                None
            }
        }
    }

    async fn write_note(&self, chat_id: &str, message_id: &str, draft: NoteDraft) -> Option<PathBuf> {
        if draft.is_empty() {
            info!(message_id, "Nothing to record; skipping note");
            return None;
        }
        match self.vault.create_note(draft).await {
            Ok(Some(path)) => {
                EventLogger::log_event(
                    message_id,
                    PipelineEvent::NoteWritten {
                        path: path.display().to_string(),
                    },
                );
                self.reply(chat_id, &format!("Saved to Obsidian: {}", path.display()))
                    .await;
                Some(path)
            }
            Ok(None) => None,
            Err(e) => {
                self.fail(chat_id, message_id, "note", &e).await;
                None
            }
        }
    }

    fn stage_failed(&self, message_id: &str, stage: &str, err: &BotError) {
        warn!(message_id, stage, error = %err, kind = %err.kind(), "Pipeline stage failed");
        EventLogger::log_event(
            message_id,
            PipelineEvent::StageFailed {
                stage: stage.into(),
                error: err.to_string(),
            },
        );
    }

    async fn fail(&self, chat_id: &str, message_id: &str, stage: &str, err: &BotError) {
        self.stage_failed(message_id, stage, err);
        self.reply(chat_id, &format!("Processing failed: {err}")).await;
    }

    /// Send a chat message; delivery failures are logged, never propagated.
    async fn reply(&self, chat_id: &str, text: &str) {
        if chat_id.is_empty() {
            return;
        }
        if let Err(e) = self.platform.send_text(chat_id, text).await {
            warn!(chat_id, platform = self.platform.name(), error = %e, "Failed to send reply");
        }
    }
}
