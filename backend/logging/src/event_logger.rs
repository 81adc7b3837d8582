//! Pipeline Event Logger
//!
//! One structured record per notable pipeline step, emitted on the
//! `pipeline_events` target so it can be filtered or routed separately.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    Received { message_type: String },
    Dropped { reason: String },
    Command { text: String },
    StageFailed { stage: String, error: String },
    NoteWritten { path: String },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: PipelineEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redact free text in `event`, then emit it.
    pub fn log_event(message_id: &str, event: PipelineEvent) -> EventLogEntry {
        let event = match event {
            PipelineEvent::Command { text } => PipelineEvent::Command {
                text: redact_sensitive_data(&text),
            },
            PipelineEvent::StageFailed { stage, error } => PipelineEvent::StageFailed {
                stage,
                error: redact_sensitive_data(&error),
            },
            other => other,
        };

        let entry = EventLogEntry {
            message_id: message_id.into(),
            timestamp: Utc::now(),
            event,
        };

        let json = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: "pipeline_events", message_id, entry = %json, "Pipeline event");
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_text_is_redacted() {
        let entry = EventLogger::log_event(
            "om_1",
            PipelineEvent::Command { text: "-k sk-abcdefghijklmnopqrstuv".into() },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"]["type"], "command");
        assert_eq!(json["event"]["text"], "-k [REDACTED_KEY]");
    }

    #[test]
    fn stage_failures_keep_stage_name() {
        let entry = EventLogger::log_event(
            "om_2",
            PipelineEvent::StageFailed { stage: "ocr".into(), error: "HTTP 500".into() },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"]["stage"], "ocr");
        assert_eq!(json["message_id"], "om_2");
    }
}
