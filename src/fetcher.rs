//! Windowed fetcher — pages a message source backwards over a trailing
//! time window and merges the result into the group's persisted set.
//!
//! Flow per call (all under the group's lock):
//! 1. cursor = now, lower = now - window
//! 2. while cursor > lower: fetch `batch_size` messages before the cursor,
//!    stop on an empty batch, otherwise move the cursor to the batch's
//!    oldest timestamp (it must strictly decrease, and no message may be
//!    newer than the cursor it was requested with)
//! 3. merge everything inside the window by id
//! 4. return how many messages were new
//!
//! A failing source or a stalled cursor still merges the batches received
//! before the failure; the error reports how many of those were new.

use std::sync::Arc;

use rayon::prelude::*;

use crate::config::FetchConfig;
use crate::message::{newest_timestamp, oldest_timestamp, Message};
use crate::source::MessageSource;
use crate::storage::group_locks::{self, GroupLocks};
use crate::storage::MessageStore;
use crate::time_utils;
use crate::{DigestError, DigestResult};

/// Time source for the window arithmetic.
pub trait Clock: Send + Sync {
    /// Seconds since epoch.
    fn now(&self) -> f64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        time_utils::now_secs()
    }
}

/// Always returns the same instant. Used for replays and tests.
pub struct FixedClock(pub f64);

impl Clock for FixedClock {
    fn now(&self) -> f64 {
        self.0
    }
}

/// Why the pagination loop stopped before exhausting the window.
enum Abort {
    Source(String),
    Stalled { cursor: f64, offending: f64 },
}

pub struct WindowedFetcher {
    source: Box<dyn MessageSource>,
    store: Arc<dyn MessageStore>,
    locks: Arc<GroupLocks>,
    clock: Arc<dyn Clock>,
}

impl WindowedFetcher {
    pub fn new(source: Box<dyn MessageSource>, store: Arc<dyn MessageStore>) -> Self {
        Self {
            source,
            store,
            locks: Arc::new(GroupLocks::new()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Share a lock table with other fetchers writing to the same store.
    pub fn with_locks(mut self, locks: Arc<GroupLocks>) -> Self {
        self.locks = locks;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// `fetch_window` with the configured window and batch size.
    pub fn fetch_with(&self, group_id: &str, cfg: &FetchConfig) -> DigestResult<usize> {
        self.fetch_window(group_id, cfg.window_secs, cfg.batch_size)
    }

    /// Fetch every message of the last `window_secs` seconds and merge it
    /// into the group's set. Returns the number of newly stored messages.
    pub fn fetch_window(
        &self,
        group_id: &str,
        window_secs: f64,
        batch_size: usize,
    ) -> DigestResult<usize> {
        validate_args(group_id, window_secs, batch_size)?;

        let lock = self.locks.lock_for(group_id);
        let _guard = group_locks::acquire(&lock, group_id);

        let now = self.clock.now();
        let lower = time_utils::window_start(now, window_secs);
        let mut cursor = now;
        let mut collected: Vec<Message> = Vec::new();
        let mut abort = None;
        let mut batches = 0usize;

        while cursor > lower {
            let batch = match self.source.fetch_batch(group_id, batch_size, Some(cursor)) {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::warn!(group_id = %group_id, cursor, error = %e, "Message source call failed");
                    abort = Some(Abort::Source(e.to_string()));
                    break;
                }
            };

            let Some(oldest) = oldest_timestamp(&batch) else {
                tracing::debug!(group_id = %group_id, cursor, "Source exhausted");
                break;
            };

            if oldest >= cursor {
                tracing::error!(
                    group_id = %group_id,
                    cursor,
                    oldest,
                    "Source returned a batch that does not move the cursor back"
                );
                abort = Some(Abort::Stalled { cursor, offending: oldest });
                break;
            }

            // Every message must be older than the cursor it was requested with.
            if let Some(newest) = newest_timestamp(&batch).filter(|&t| t > cursor) {
                tracing::error!(
                    group_id = %group_id,
                    cursor,
                    newest,
                    "Source returned messages newer than the cursor"
                );
                abort = Some(Abort::Stalled { cursor, offending: newest });
                break;
            }

            if batch.len() > batch_size {
                tracing::warn!(group_id = %group_id, limit = batch_size, returned = batch.len(), "Source exceeded batch limit");
            }

            batches += 1;
            tracing::debug!(group_id = %group_id, batch = batches, size = batch.len(), oldest, "Batch fetched");
            collected.extend(batch);
            cursor = oldest;
        }

        let fetched = collected.len();
        let merged = self.merge(group_id, &collected, lower)?;
        tracing::info!(
            group_id = %group_id,
            batches,
            fetched,
            merged,
            complete = abort.is_none(),
            "Window fetch finished"
        );

        match abort {
            None => Ok(merged),
            Some(Abort::Source(reason)) => Err(DigestError::SourceUnavailable {
                group_id: group_id.to_string(),
                merged,
                reason,
            }),
            Some(Abort::Stalled { cursor, offending }) => Err(DigestError::NonProgressingFetch {
                group_id: group_id.to_string(),
                cursor,
                offending,
                merged,
            }),
        }
    }

    /// Run `fetch_window` for several groups in parallel. Groups are
    /// independent; results come back in input order.
    pub fn sync_all(
        &self,
        group_ids: &[String],
        window_secs: f64,
        batch_size: usize,
    ) -> Vec<(String, DigestResult<usize>)> {
        group_ids
            .par_iter()
            .map(|id| (id.clone(), self.fetch_window(id, window_secs, batch_size)))
            .collect()
    }

    /// Read-modify-write of the group's set through `MessageStore::update`,
    /// which excludes writers outside this lock table (other processes).
    fn merge(&self, group_id: &str, collected: &[Message], lower: f64) -> DigestResult<usize> {
        let mut inserted = 0;
        let mut total = 0;
        self.store.update(group_id, &mut |set| {
            inserted = set.merge(collected.iter().filter(|m| m.timestamp >= lower).cloned());
            total = set.len();
        })?;
        tracing::debug!(group_id = %group_id, inserted, total, "Merged into message set");
        Ok(inserted)
    }
}

fn validate_args(group_id: &str, window_secs: f64, batch_size: usize) -> DigestResult<()> {
    if group_id.trim().is_empty() {
        return Err(DigestError::InvalidArgument("group id must not be empty".into()));
    }
    if !(window_secs.is_finite() && window_secs > 0.0) {
        return Err(DigestError::InvalidArgument(format!(
            "window must be a positive number of seconds, got {}",
            window_secs
        )));
    }
    if batch_size == 0 {
        return Err(DigestError::InvalidArgument("batch size must be positive".into()));
    }
    Ok(())
}
