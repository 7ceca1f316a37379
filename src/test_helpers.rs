//! Shared test utilities — message builders, scripted sources, stub clients.
//!
//! Available only under `#[cfg(test)]`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::message::{Message, MessageBatch};
use crate::source::{MessageSource, SimulatedSource};
use crate::summary::client::{Completion, CompletionClient, CompletionRequest, TokenUsage};
use crate::{DigestError, DigestResult};

/// Quick message with a body derived from its id.
pub fn msg(id: &str, timestamp: f64) -> Message {
    Message::new(id, format!("body of {}", id), timestamp)
}

// ============================================================================
// ScriptedSource
// ============================================================================

enum Step {
    Batch(MessageBatch),
    Fail(String),
}

/// Replays queued batches and failures in order, then reports exhaustion.
/// Records every `(limit, before)` it was asked for.
pub struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<(usize, Option<f64>)>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push_batch(&self, batch: MessageBatch) {
        self.steps.lock().unwrap().push_back(Step::Batch(batch));
    }

    pub fn push_failure(&self, reason: &str) {
        self.steps.lock().unwrap().push_back(Step::Fail(reason.to_string()));
    }

    pub fn requests(&self) -> Vec<(usize, Option<f64>)> {
        self.requests.lock().unwrap().clone()
    }
}

impl MessageSource for ScriptedSource {
    fn fetch_batch(&self, _group_id: &str, limit: usize, before: Option<f64>) -> DigestResult<MessageBatch> {
        self.requests.lock().unwrap().push((limit, before));
        match self.steps.lock().unwrap().pop_front() {
            Some(Step::Batch(batch)) => Ok(batch),
            Some(Step::Fail(reason)) => Err(DigestError::Bridge(reason)),
            None => Ok(Vec::new()),
        }
    }
}

// ============================================================================
// StuckSource
// ============================================================================

/// Ignores the cursor and always serves the same message.
pub struct StuckSource {
    message: Message,
}

impl StuckSource {
    pub fn new(message: Message) -> Self {
        Self { message }
    }
}

impl MessageSource for StuckSource {
    fn fetch_batch(&self, _group_id: &str, _limit: usize, _before: Option<f64>) -> DigestResult<MessageBatch> {
        Ok(vec![self.message.clone()])
    }
}

// ============================================================================
// ConcurrencyTrackingSource
// ============================================================================

/// Simulated history that records the peak number of overlapping calls.
pub struct ConcurrencyTrackingSource {
    inner: SimulatedSource,
    history_len: usize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ConcurrencyTrackingSource {
    pub fn new(anchor: f64) -> Self {
        let history_len = 20;
        Self {
            inner: SimulatedSource::new(anchor).with_history(history_len, 60.0),
            history_len,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn history_len(&self) -> usize {
        self.history_len
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl MessageSource for ConcurrencyTrackingSource {
    fn fetch_batch(&self, group_id: &str, limit: usize, before: Option<f64>) -> DigestResult<MessageBatch> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(5));
        let result = self.inner.fetch_batch(group_id, limit, before);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

// ============================================================================
// StubCompletionClient
// ============================================================================

/// Returns a canned completion and keeps the requests it received.
pub struct StubCompletionClient {
    reply: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl StubCompletionClient {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl CompletionClient for StubCompletionClient {
    fn complete(&self, request: &CompletionRequest) -> DigestResult<Completion> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Some(text) => Ok(Completion {
                text: text.clone(),
                usage: TokenUsage {
                    prompt_tokens: 40,
                    completion_tokens: 10,
                    total_tokens: 50,
                },
            }),
            None => Err(DigestError::Provider("stub provider down".into())),
        }
    }
}
