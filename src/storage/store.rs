//! Persisted message sets and the key-value store they live in.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::DigestResult;

/// All persisted messages of one group, unique by id.
///
/// Serialized as a plain JSON array so the file stays readable by anything
/// that expects `[{id, body, timestamp}, ...]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Message>", into = "Vec<Message>")]
pub struct MessageSet {
    messages: Vec<Message>,
}

impl From<Vec<Message>> for MessageSet {
    /// Duplicate ids keep their first occurrence. Files written by older
    /// versions appended without checking and may contain repeats.
    fn from(messages: Vec<Message>) -> Self {
        let mut set = Self::default();
        set.merge(messages);
        set
    }
}

impl From<MessageSet> for Vec<Message> {
    fn from(set: MessageSet) -> Self {
        set.messages
    }
}

impl MessageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.messages.iter().any(|m| m.id == id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Insert every message whose id is not already present.
    /// Returns how many were inserted.
    pub fn merge<I>(&mut self, incoming: I) -> usize
    where
        I: IntoIterator<Item = Message>,
    {
        let mut seen: HashSet<String> = self.messages.iter().map(|m| m.id.clone()).collect();
        let before = self.messages.len();
        for msg in incoming {
            if seen.insert(msg.id.clone()) {
                self.messages.push(msg);
            }
        }
        self.messages.len() - before
    }

    /// Messages with `timestamp >= since`, oldest first.
    pub fn since(&self, since: f64) -> Vec<Message> {
        let mut recent: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| m.timestamp >= since)
            .cloned()
            .collect();
        recent.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        recent
    }
}

/// Key-value store of message sets, addressed by group id.
///
/// Sets are read and written wholesale. `put` must never leave a partially
/// written set visible. Read-modify-write goes through `update`, which is
/// exclusive per group against every other `update` on the same backing
/// data, including from other processes.
pub trait MessageStore: Send + Sync {
    /// The group's set, empty if nothing was stored yet.
    fn get(&self, group_id: &str) -> DigestResult<MessageSet>;

    /// Replace the group's set.
    fn put(&self, group_id: &str, set: &MessageSet) -> DigestResult<()>;

    /// Load the group's set, let `apply` modify it, and store the result,
    /// holding the group exclusively from load to store.
    fn update(&self, group_id: &str, apply: &mut dyn FnMut(&mut MessageSet)) -> DigestResult<()>;
}
