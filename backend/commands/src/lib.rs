//! Dash-prefixed chat commands (`-m gpt-4o`, `-ta`, ...) that change the
//! runtime settings.

pub mod detection;
pub mod dispatch;
pub mod registry;
pub mod types;

pub use detection::parse_command;
pub use dispatch::{CommandDispatcher, CommandResponse};
pub use registry::{builtin_commands, help_text};
pub use types::{ArgKind, Command, CommandDef};
