//! Telemetry and structured logging components for vaultbot.
//!
//! Handles log redaction, console/JSON output with file rotation, and
//! structured pipeline event records.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, PipelineEvent};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
