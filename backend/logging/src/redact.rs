//! Log Redaction Layer
//!
//! Scrubs API keys, bearer tokens and `-k` command arguments from strings
//! prior to logging.

use once_cell::sync::Lazy;
use regex::Regex;

static API_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9_\-]{16,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});

/// `-k <key>` as typed into the chat to set the AI key.
static KEY_COMMAND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(\s*-k\s+)\S+").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = KEY_COMMAND_RE.replace_all(input, "${1}[REDACTED_KEY]");
    API_KEY_RE
        .replace_all(&redacted, "[REDACTED_TOKEN]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_bearer_and_api_keys() {
        let raw = "POST with Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9 and sk-abcdefghijklmnop1234";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"));
        assert!(!clean.contains("sk-abcdefghijklmnop1234"));
        assert_eq!(clean.matches("[REDACTED_TOKEN]").count(), 2);
    }

    #[test]
    fn redacts_key_command_argument() {
        let clean = redact_sensitive_data("-k my-private-key");
        assert_eq!(clean, "-k [REDACTED_KEY]");
    }

    #[test]
    fn leaves_other_commands_alone() {
        assert_eq!(redact_sensitive_data("-m deepseek-chat"), "-m deepseek-chat");
        assert_eq!(redact_sensitive_data("hello world"), "hello world");
    }
}
