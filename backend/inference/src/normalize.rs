//! Reply normalization for the inference service.
//!
//! The service does not commit to one reply shape. Display text is taken from
//! the first match in this chain:
//!
//! 1. `response.content` (non-empty string)
//! 2. `response` itself (non-empty string)
//! 3. [`NO_REPLY_PLACEHOLDER`]
//!
//! Sources come from `response.sources`; entries without a string `title` and
//! `link` are dropped, and a missing list becomes empty.

use serde_json::Value;

use finnext_core::{ProxyReply, Source};

pub const NO_REPLY_PLACEHOLDER: &str = "No reply content found.";

/// Flatten a raw inference reply into the `{reply, sources}` contract.
pub fn normalize_reply(body: &Value) -> ProxyReply {
    let response = body.get("response");
    ProxyReply {
        reply: extract_reply(response),
        sources: extract_sources(response),
    }
}

fn extract_reply(response: Option<&Value>) -> String {
    let nested = response
        .and_then(|r| r.get("content"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty());
    let top_level = response.and_then(Value::as_str).filter(|s| !s.is_empty());

    nested
        .or(top_level)
        .unwrap_or(NO_REPLY_PLACEHOLDER)
        .to_string()
}

fn extract_sources(response: Option<&Value>) -> Vec<Source> {
    let Some(items) = response
        .and_then(|r| r.get("sources"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let title = item.get("title")?.as_str()?;
            let link = item.get("link")?.as_str()?;
            Some(Source {
                title: title.to_string(),
                link: link.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_content() {
        let reply = normalize_reply(&json!({
            "response": { "content": "Your risk score is 6/10.", "sources": [] }
        }));
        assert_eq!(reply.reply, "Your risk score is 6/10.");
        assert!(reply.sources.is_empty());
    }

    #[test]
    fn test_top_level_string_response() {
        let reply = normalize_reply(&json!({ "response": "Markets look calm." }));
        assert_eq!(reply.reply, "Markets look calm.");
        assert!(reply.sources.is_empty());
    }

    #[test]
    fn test_placeholder_when_nothing_usable() {
        for body in [
            json!({}),
            json!({ "response": null }),
            json!({ "response": { "content": "" } }),
            json!({ "response": { "content": 42 } }),
            json!({ "response": "" }),
        ] {
            assert_eq!(normalize_reply(&body).reply, NO_REPLY_PLACEHOLDER, "{body}");
        }
    }

    #[test]
    fn test_sources_skip_malformed_entries() {
        let reply = normalize_reply(&json!({
            "response": {
                "content": "See filings.",
                "sources": [
                    { "title": "10-K", "link": "https://example.com/10k" },
                    { "title": "no link" },
                    "garbage",
                    { "title": "8-K", "link": "https://example.com/8k", "score": 0.4 }
                ]
            }
        }));
        let titles: Vec<&str> = reply.sources.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["10-K", "8-K"]);
    }

    #[test]
    fn test_sources_not_an_array() {
        let reply = normalize_reply(&json!({
            "response": { "content": "ok", "sources": "none" }
        }));
        assert!(reply.sources.is_empty());
    }
}
