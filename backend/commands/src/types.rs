/// Chat command types.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Arg
// ---------------------------------------------------------------------------

/// What a flag expects after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgKind {
    None,
    /// Exactly the next whitespace-separated token.
    Token,
    /// Every remaining token, joined by single spaces.
    Remaining,
}

// ---------------------------------------------------------------------------
// Command definition
// ---------------------------------------------------------------------------

/// A registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommandDef {
    /// Literal flag, e.g. `-m`.
    pub flag: &'static str,
    /// Argument placeholder shown in help, e.g. `<model>`.
    pub usage: &'static str,
    pub description: &'static str,
    pub arg: ArgKind,
}

// ---------------------------------------------------------------------------
// Parsed command
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    SetModel(String),
    SetBaseUrl(String),
    SetApiKey(String),
    SetSystemPrompt(String),
    EnableAutoAnalysis,
    DisableAutoAnalysis,
}

impl Command {
    pub fn flag(&self) -> &'static str {
        match self {
            Self::Help => "-h",
            Self::SetModel(_) => "-m",
            Self::SetBaseUrl(_) => "-u",
            Self::SetApiKey(_) => "-k",
            Self::SetSystemPrompt(_) => "-s",
            Self::EnableAutoAnalysis => "-ta",
            Self::DisableAutoAnalysis => "-t",
        }
    }

    /// Whether applying this command changes persisted settings.
    pub fn mutates_settings(&self) -> bool {
        !matches!(self, Self::Help)
    }
}
