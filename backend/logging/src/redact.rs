//! Log Redaction Layer
//!
//! Scrubs API keys and bearer tokens from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9_\-]{16,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});
static API_KEY_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)("?(?:x-api-key|api_key|apikey)"?\s*[:=]\s*"?)([^"\s,}]+)"#).unwrap()
});

/// Redacts credential-looking patterns in a string.
pub fn redact_secrets(input: &str) -> String {
    let redacted = API_KEY_FIELD_RE.replace_all(input, "${1}[REDACTED]");
    API_KEY_RE
        .replace_all(&redacted, "[REDACTED_TOKEN]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let raw = "auth failed with Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9 and sk-abcdefghijklmnop1234";
        let clean = redact_secrets(raw);
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"));
        assert!(!clean.contains("sk-abcdefghijklmnop1234"));
    }

    #[test]
    fn test_redacts_echoed_key_field() {
        let raw = r#"{"detail":"invalid key","x-api-key":"lyzr-12345"}"#;
        let clean = redact_secrets(raw);
        assert!(!clean.contains("lyzr-12345"));
        assert!(clean.contains("invalid key"));
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(redact_secrets("overloaded"), "overloaded");
    }
}
