//! Environment variable substitution for config values.
//!
//! Supports `${VAR_NAME}` syntax in string values, resolved at load time.
//! Only uppercase `[A-Z_][A-Z0-9_]*` variable names are matched.
//! `$${VAR}` escapes to a literal `${VAR}`.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

/// Matches `${VAR}` with an optional leading `$` (the escape form).
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config value tree from the process environment.
///
/// Returns an error if any referenced env var is unset or empty.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    substitute_value(value, &std::env::vars().collect(), "")
}

/// Substitute env vars using a provided map (useful for testing).
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => {
            let result: Result<Vec<_>> = arr
                .iter()
                .enumerate()
                .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(result?))
        }
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &regex::Captures| {
        let var_name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_simple_var() {
        let v = json!({"feishu": {"appSecret": "${FEISHU_APP_SECRET}"}});
        let env = env(&[("FEISHU_APP_SECRET", "s3cret")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["feishu"]["appSecret"], "s3cret");
    }

    #[test]
    fn substitutes_inside_larger_string() {
        let v = json!({"path": "${HOME_DIR}/vault"});
        let env = env(&[("HOME_DIR", "/home/bot")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["path"], "/home/bot/vault");
    }

    #[test]
    fn error_on_missing_var() {
        let v = json!({"ocr": {"appId": "${MISSING_VAR}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("MISSING_VAR"));
        assert!(msg.contains("ocr.appId"));
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"prompt": "use $${NOT_A_VAR} literally"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["prompt"], "use ${NOT_A_VAR} literally");
    }

    #[test]
    fn passthrough_non_var_strings() {
        let v = json!({"key": "plain-string", "n": 3});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result, v);
    }
}
