use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for the vaultbot runtime.
#[derive(Debug, Error)]
pub enum BotError {
    /// Connection failure or timeout talking to a remote service. Retryable.
    #[error("transient network failure: {0}")]
    TransientNetwork(String),

    /// The remote service answered, but with a failure status or error code.
    #[error("{service} API error: {message}")]
    TerminalApi { service: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed payload: {0}")]
    Parse(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification of a [`BotError`], used by retry policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    TransientNetwork,
    TerminalApi,
    Config,
    Io,
    Parse,
    Other,
}

impl BotError {
    pub fn terminal(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TerminalApi {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TransientNetwork(_) => ErrorKind::TransientNetwork,
            Self::TerminalApi { .. } => ErrorKind::TerminalApi,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
            Self::Parse(_) => ErrorKind::Parse,
            Self::Other(_) => ErrorKind::Other,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::TransientNetwork
    }

    /// Classify a `reqwest` failure for `service`.
    ///
    /// Timeouts, connection failures and interrupted bodies are transient;
    /// everything else (decode errors, status errors, bad URLs) is terminal.
    pub fn from_reqwest(service: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
            Self::TransientNetwork(format!("{service}: {err}"))
        } else if err.is_decode() {
            Self::Parse(format!("{service}: {err}"))
        } else {
            Self::terminal(service, err.to_string())
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::TransientNetwork => "transient_network",
            Self::TerminalApi => "terminal_api",
            Self::Config => "config",
            Self::Io => "io",
            Self::Parse => "parse",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}
