//! Config redaction: safe-to-share config snapshots with secrets masked.

use anyhow::Result;
use serde_json::Value;

use crate::schema::BotConfig;

/// Keys whose string values are secrets.
static SECRET_KEYS: &[&str] = &[
    "apiKey",
    "api_key",
    "ai_api_key",
    "appSecret",
    "app_secret",
    "secretCode",
    "secret_code",
    "encryptKey",
    "encrypt_key",
    "verificationToken",
    "verification_token",
    "token",
    "secret",
    "password",
];

/// Redact a JSON value, masking every sensitive field.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

/// The config as pretty YAML with secrets masked.
pub fn redacted_yaml(config: &BotConfig) -> Result<String> {
    let value = serde_json::to_value(config)?;
    Ok(serde_yaml::to_string(&redact(&value))?)
}

fn is_sensitive_key(key: &str) -> bool {
    SECRET_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn mask(s: &str) -> String {
    // Keep a 4-char hint when the secret is long enough for it to be harmless.
    if s.chars().count() > 8 {
        let hint: String = s.chars().take(4).collect();
        format!("{hint}***")
    } else {
        "***".to_string()
    }
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_sensitive_key(key) && !s.is_empty() => Value::String(mask(s)),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_nested_secrets() {
        let v = json!({
            "feishu": { "appId": "cli_a1b2", "appSecret": "abcdefghijklmnop" },
            "ai": { "apiKey": "sk-1234567890abcdef", "model": "deepseek-chat" }
        });
        let redacted = redact(&v);
        assert_eq!(redacted["feishu"]["appId"], "cli_a1b2");
        assert_eq!(redacted["feishu"]["appSecret"], "abcd***");
        assert_eq!(redacted["ai"]["apiKey"], "sk-1***");
        assert_eq!(redacted["ai"]["model"], "deepseek-chat");
    }

    #[test]
    fn short_secrets_are_fully_masked() {
        let redacted = redact(&json!({ "secretCode": "abc" }));
        assert_eq!(redacted["secretCode"], "***");
    }

    #[test]
    fn empty_secrets_stay_empty() {
        let redacted = redact(&json!({ "apiKey": "" }));
        assert_eq!(redacted["apiKey"], "");
    }

    #[test]
    fn redacted_yaml_hides_config_secrets() {
        let mut config = BotConfig::default();
        config.ocr.secret_code = "textin-secret-value".into();
        let yaml = redacted_yaml(&config).unwrap();
        assert!(!yaml.contains("textin-secret-value"));
        assert!(yaml.contains("text***"));
    }
}
