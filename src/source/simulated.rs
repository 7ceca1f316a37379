use crate::constants::{SIMULATED_HISTORY_LEN, SIMULATED_SPACING_SECS};
use crate::message::{Message, MessageBatch};
use crate::time_utils;
use crate::DigestResult;

use super::MessageSource;

/// Synthetic group history for running without a WhatsApp session.
///
/// Message `i` (0 = newest) has id `{group_id}_{i}`, body `Message {i}` and
/// timestamp `anchor - i * spacing`. The history is finite, so paging past
/// the oldest message yields an empty batch.
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    anchor: f64,
    history_len: usize,
    spacing_secs: f64,
}

impl SimulatedSource {
    pub fn new(anchor: f64) -> Self {
        Self {
            anchor,
            history_len: SIMULATED_HISTORY_LEN,
            spacing_secs: SIMULATED_SPACING_SECS,
        }
    }

    /// History whose newest message is "now".
    pub fn anchored_now() -> Self {
        Self::new(time_utils::now_secs())
    }

    pub fn with_history(mut self, history_len: usize, spacing_secs: f64) -> Self {
        self.history_len = history_len;
        self.spacing_secs = spacing_secs;
        self
    }

    fn timestamp_of(&self, i: usize) -> f64 {
        self.anchor - i as f64 * self.spacing_secs
    }
}

impl MessageSource for SimulatedSource {
    fn fetch_batch(
        &self,
        group_id: &str,
        limit: usize,
        before: Option<f64>,
    ) -> DigestResult<MessageBatch> {
        let now = time_utils::now_secs();
        let batch: MessageBatch = (0..self.history_len)
            .filter(|&i| {
                let ts = self.timestamp_of(i);
                match before {
                    Some(b) => ts < b,
                    None => ts <= now,
                }
            })
            .take(limit)
            .map(|i| Message::new(format!("{}_{}", group_id, i), format!("Message {}", i), self.timestamp_of(i)))
            .collect();

        tracing::debug!(group_id = %group_id, limit, ?before, returned = batch.len(), "Simulated batch");
        Ok(batch)
    }
}
