use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::storage::MessageStore;
use crate::time_utils;
use crate::DigestResult;

/// What the summary should focus on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    /// Every message in the window.
    #[default]
    MainTopics,
    /// Only messages whose body contains the user's criteria.
    SpecificMessages,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MainTopics => "main_topics",
            Self::SpecificMessages => "specific_messages",
        }
    }

    /// Keep the messages this analysis looks at. Matching is a plain,
    /// case-sensitive substring test; an empty criteria keeps everything.
    pub fn select(&self, messages: Vec<Message>, criteria: Option<&str>) -> Vec<Message> {
        match (self, criteria) {
            (Self::SpecificMessages, Some(c)) if !c.is_empty() => {
                messages.into_iter().filter(|m| m.body.contains(c)).collect()
            }
            _ => messages,
        }
    }
}

impl std::str::FromStr for AnalysisType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main_topics" => Ok(Self::MainTopics),
            "specific_messages" => Ok(Self::SpecificMessages),
            _ => Err(format!("Unknown analysis type: {}", s)),
        }
    }
}

/// Stored messages of the last `window_secs` seconds, oldest first.
pub fn recent_messages(
    store: &dyn MessageStore,
    group_id: &str,
    window_secs: f64,
    now: f64,
) -> DigestResult<Vec<Message>> {
    let set = store.get(group_id)?;
    Ok(set.since(time_utils::window_start(now, window_secs)))
}

/// Number of stored messages inside the window.
pub fn verify_recent_messages(
    store: &dyn MessageStore,
    group_id: &str,
    window_secs: f64,
    now: f64,
) -> DigestResult<usize> {
    let count = recent_messages(store, group_id, window_secs, now)?.len();
    tracing::info!(group_id = %group_id, count, window_secs, "Recent messages in store");
    Ok(count)
}
