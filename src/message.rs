//! Transient message records.
//!
//! Messages are fetched a page at a time and discarded once deleted; nothing
//! here persists. The platform returns a few pagination shapes, so flattening
//! is tolerant: a plain array, an object with a `messages` array, and arrays
//! nested one level deep (search-style results) all work.

use serde::{Deserialize, Serialize};

/// A single message scheduled for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message snowflake.
    pub id: String,
    /// Parent channel snowflake.
    pub channel_id: String,
    /// Textual content, possibly empty (attachments, embeds).
    #[serde(default)]
    pub content: String,
}

impl Message {
    /// First `n` characters of the content, for log lines.
    pub fn preview(&self, n: usize) -> String {
        self.content.chars().take(n).collect()
    }
}

/// Result of flattening an API response into message records.
#[derive(Debug, Default)]
pub struct Flattened {
    pub messages: Vec<Message>,
    /// Items missing an id or channel id, skipped rather than fatal.
    pub skipped: usize,
}

/// Flatten a messages response into deletable records, preserving order.
pub fn flatten(value: &serde_json::Value) -> Flattened {
    let items: &[serde_json::Value] = match value {
        serde_json::Value::Array(a) => a,
        serde_json::Value::Object(o) => o
            .get("messages")
            .and_then(|m| m.as_array())
            .map(|a| a.as_slice())
            .unwrap_or(&[]),
        _ => &[],
    };

    let mut out = Flattened::default();
    for item in items {
        match item {
            serde_json::Value::Array(inner) => {
                for m in inner {
                    push_message(m, &mut out);
                }
            }
            other => push_message(other, &mut out),
        }
    }
    out
}

fn push_message(item: &serde_json::Value, out: &mut Flattened) {
    let id = item.get("id").and_then(|v| v.as_str());
    let channel_id = item.get("channel_id").and_then(|v| v.as_str());
    match (id, channel_id) {
        (Some(id), Some(channel_id)) => out.messages.push(Message {
            id: id.to_string(),
            channel_id: channel_id.to_string(),
            content: item
                .get("content")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
        }),
        _ => out.skipped += 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_plain_array() {
        let value = json!([
            {"id": "1", "channel_id": "9", "content": "a"},
            {"id": "2", "channel_id": "9", "content": "b"},
        ]);
        let flat = flatten(&value);
        assert_eq!(flat.messages.len(), 2);
        assert_eq!(flat.skipped, 0);
        assert_eq!(flat.messages[0].id, "1");
        assert_eq!(flat.messages[1].content, "b");
    }

    #[test]
    fn test_flatten_messages_object() {
        let value = json!({"messages": [{"id": "1", "channel_id": "9"}]});
        let flat = flatten(&value);
        assert_eq!(flat.messages.len(), 1);
        assert_eq!(flat.messages[0].content, "");
    }

    #[test]
    fn test_flatten_nested_arrays() {
        let value = json!({"messages": [
            [{"id": "1", "channel_id": "9", "content": "x"}],
            [{"id": "2", "channel_id": "9", "content": "y"}],
        ]});
        let flat = flatten(&value);
        assert_eq!(flat.messages.len(), 2);
        assert_eq!(flat.messages[1].id, "2");
    }

    #[test]
    fn test_flatten_skips_incomplete_items() {
        let value = json!([
            {"id": "1", "channel_id": "9"},
            {"id": "2"},
            {"channel_id": "9"},
            "not even an object",
        ]);
        let flat = flatten(&value);
        assert_eq!(flat.messages.len(), 1);
        assert_eq!(flat.skipped, 3);
    }

    #[test]
    fn test_flatten_non_collection() {
        let flat = flatten(&json!("nope"));
        assert!(flat.messages.is_empty());
        assert_eq!(flat.skipped, 0);
    }

    #[test]
    fn test_preview_char_boundaries() {
        let m = Message {
            id: "1".into(),
            channel_id: "2".into(),
            content: "héllo wörld".into(),
        };
        assert_eq!(m.preview(4), "héll");
        assert_eq!(m.preview(100), "héllo wörld");
    }
}
