//! Message sources — the paginated "latest N before T" primitive.
//!
//! Contract for every implementation:
//! - at most `limit` messages per call
//! - all timestamps `< before`, or `<= now` when `before` is `None`
//! - newest first
//! - an empty batch means the history is exhausted
//!
//! Retries are the source's own business; callers treat a failed call as
//! terminal for the current fetch.

pub mod export;
pub mod simulated;

use std::sync::Arc;

use crate::message::MessageBatch;
use crate::DigestResult;

pub use export::ExportFileSource;
pub use simulated::SimulatedSource;

pub trait MessageSource: Send + Sync {
    fn fetch_batch(
        &self,
        group_id: &str,
        limit: usize,
        before: Option<f64>,
    ) -> DigestResult<MessageBatch>;
}

impl<S: MessageSource + ?Sized> MessageSource for Arc<S> {
    fn fetch_batch(
        &self,
        group_id: &str,
        limit: usize,
        before: Option<f64>,
    ) -> DigestResult<MessageBatch> {
        (**self).fetch_batch(group_id, limit, before)
    }
}

impl<S: MessageSource + ?Sized> MessageSource for Box<S> {
    fn fetch_batch(
        &self,
        group_id: &str,
        limit: usize,
        before: Option<f64>,
    ) -> DigestResult<MessageBatch> {
        (**self).fetch_batch(group_id, limit, before)
    }
}
