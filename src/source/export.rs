use std::path::PathBuf;

use crate::message::{Message, MessageBatch};
use crate::storage::path_utils;
use crate::time_utils;
use crate::{DigestError, DigestResult};

use super::MessageSource;

/// Pages through the raw export written by the download script
/// (`messages_export_{group_id}.json`, an array of `{id, from, body,
/// timestamp, reactions}`).
///
/// The export is re-read on every call so a download finishing mid-sync is
/// picked up by the next page.
pub struct ExportFileSource {
    root: PathBuf,
}

impl ExportFileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn load(&self, group_id: &str) -> DigestResult<Vec<Message>> {
        if !path_utils::is_safe_group_id(group_id) {
            return Err(DigestError::InvalidArgument(format!("invalid group id {:?}", group_id)));
        }
        let path = path_utils::export_path(&self.root, group_id);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            DigestError::Bridge(format!(
                "No export for group {} at {} ({}). Run `download` first.",
                group_id,
                path.display(),
                e
            ))
        })?;
        let mut messages: Vec<Message> = serde_json::from_str(&content)?;
        messages.sort_by(|a, b| b.timestamp.total_cmp(&a.timestamp));
        Ok(messages)
    }
}

impl MessageSource for ExportFileSource {
    fn fetch_batch(
        &self,
        group_id: &str,
        limit: usize,
        before: Option<f64>,
    ) -> DigestResult<MessageBatch> {
        let now = time_utils::now_secs();
        Ok(self
            .load(group_id)?
            .into_iter()
            .filter(|m| match before {
                Some(b) => m.timestamp < b,
                None => m.timestamp <= now,
            })
            .take(limit)
            .collect())
    }
}
