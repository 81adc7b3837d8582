/// Command detection: turn a dash-prefixed chat message into a [`Command`].
///
/// Anything that does not parse (unknown flag, missing argument) is not a
/// command and is handled as ordinary text.
use crate::registry;
use crate::types::{ArgKind, Command};

pub fn parse_command(text: &str) -> Option<Command> {
    let mut parts = text.split_whitespace();
    let flag = parts.next()?;
    if !flag.starts_with('-') {
        return None;
    }
    let def = registry::find(flag)?;

    let arg = match def.arg {
        ArgKind::None => String::new(),
        ArgKind::Token => parts.next()?.to_string(),
        ArgKind::Remaining => {
            let rest: Vec<&str> = parts.collect();
            if rest.is_empty() {
                return None;
            }
            rest.join(" ")
        }
    };

    Some(match flag {
        "-h" => Command::Help,
        "-m" => Command::SetModel(arg),
        "-u" => Command::SetBaseUrl(arg),
        "-k" => Command::SetApiKey(arg),
        "-s" => Command::SetSystemPrompt(arg),
        "-ta" => Command::EnableAutoAnalysis,
        "-t" => Command::DisableAutoAnalysis,
        _ => return None,
    })
}
