/// Built-in command table and help text.
use crate::types::{ArgKind, CommandDef};

static BUILTIN_COMMANDS: &[CommandDef] = &[
    CommandDef {
        flag: "-h",
        usage: "",
        description: "Show this help",
        arg: ArgKind::None,
    },
    CommandDef {
        flag: "-m",
        usage: "<model>",
        description: "Switch the AI model",
        arg: ArgKind::Token,
    },
    CommandDef {
        flag: "-u",
        usage: "<url>",
        description: "Set the AI base URL",
        arg: ArgKind::Token,
    },
    CommandDef {
        flag: "-k",
        usage: "<apikey>",
        description: "Set the AI API key",
        arg: ArgKind::Token,
    },
    CommandDef {
        flag: "-s",
        usage: "<prompt>",
        description: "Set the system prompt",
        arg: ArgKind::Remaining,
    },
    CommandDef {
        flag: "-ta",
        usage: "",
        description: "Run AI analysis on every text message",
        arg: ArgKind::None,
    },
    CommandDef {
        flag: "-t",
        usage: "",
        description: "Stop analysing text messages automatically",
        arg: ArgKind::None,
    },
];

pub fn builtin_commands() -> &'static [CommandDef] {
    BUILTIN_COMMANDS
}

/// Exact flag lookup; `-ta` and `-t` are distinct flags.
pub fn find(flag: &str) -> Option<&'static CommandDef> {
    BUILTIN_COMMANDS.iter().find(|def| def.flag == flag)
}

pub fn help_text() -> String {
    let mut out = String::from("Supported commands:");
    for def in BUILTIN_COMMANDS {
        out.push('\n');
        out.push_str(def.flag);
        if !def.usage.is_empty() {
            out.push(' ');
            out.push_str(def.usage);
        }
        out.push_str(": ");
        out.push_str(def.description);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_unique() {
        let mut flags: Vec<_> = builtin_commands().iter().map(|d| d.flag).collect();
        flags.sort();
        flags.dedup();
        assert_eq!(flags.len(), builtin_commands().len());
    }

    #[test]
    fn help_lists_every_flag() {
        let help = help_text();
        for def in builtin_commands() {
            assert!(help.contains(&format!("\n{}", def.flag)), "missing {}", def.flag);
        }
        assert!(help.contains("-m <model>: Switch the AI model"));
    }

    #[test]
    fn find_is_exact() {
        assert_eq!(find("-t").unwrap().arg, ArgKind::None);
        assert!(find("-x").is_none());
        assert!(find("-").is_none());
    }
}
