//! Config redaction: produce safe-to-print snapshots by masking sensitive fields.

use serde_json::Value;

const SENSITIVE_KEYS: &[&str] = &[
    "apiKey",
    "api_key",
    "x-api-key",
    "token",
    "accessToken",
    "access_token",
    "secret",
    "password",
];

/// Redact a JSON value, replacing all sensitive string fields with a masked hint.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

/// Keep the first four characters of a secret and mask the rest.
pub fn mask_secret(s: &str) -> String {
    if s.chars().count() > 4 {
        format!("{}***", s.chars().take(4).collect::<String>())
    } else {
        "***".to_string()
    }
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_sensitive_key(key) && !s.is_empty() => {
            Value::String(mask_secret(s))
        }
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                result.insert(k.clone(), redact_recursive(v, k));
            }
            Value::Object(result)
        }
        other => other.clone(),
    }
}
