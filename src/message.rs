use serde::{Deserialize, Serialize};

/// A chat message as fetched from a group.
///
/// `timestamp` is seconds since epoch. Older exports wrote the text under
/// `message`, newer ones under `body`; both are accepted on input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    #[serde(alias = "message", default)]
    pub body: String,
    pub timestamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub reactions: u32,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl Message {
    pub fn new(id: impl Into<String>, body: impl Into<String>, timestamp: f64) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            timestamp,
            from: None,
            reactions: 0,
        }
    }
}

/// One page returned by a single source call, newest first.
pub type MessageBatch = Vec<Message>;

/// Oldest timestamp in a batch; `None` for an empty batch.
pub fn oldest_timestamp(batch: &[Message]) -> Option<f64> {
    batch
        .iter()
        .map(|m| m.timestamp)
        .fold(None, |acc, ts| match acc {
            Some(min) if min <= ts => Some(min),
            _ => Some(ts),
        })
}

/// Newest timestamp in a batch; `None` for an empty batch.
pub fn newest_timestamp(batch: &[Message]) -> Option<f64> {
    batch.iter().map(|m| m.timestamp).reduce(f64::max)
}

/// A WhatsApp group as listed by the bridge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_message_alias() {
        let json = r#"{"id":"g_1","message":"Message 1","timestamp":1700000000.5}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.body, "Message 1");
        assert_eq!(msg.reactions, 0);
        assert!(msg.from.is_none());
    }

    #[test]
    fn test_serializes_body_and_skips_empty_extras() {
        let msg = Message::new("a", "hello", 10.0);
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["body"], "hello");
        assert!(value.get("from").is_none());
        assert!(value.get("reactions").is_none());
    }

    #[test]
    fn test_oldest_timestamp() {
        let batch = vec![
            Message::new("a", "", 30.0),
            Message::new("b", "", 10.0),
            Message::new("c", "", 20.0),
        ];
        assert_eq!(oldest_timestamp(&batch), Some(10.0));
        assert_eq!(oldest_timestamp(&[]), None);
        assert_eq!(newest_timestamp(&batch), Some(30.0));
        assert_eq!(newest_timestamp(&[]), None);
    }
}
