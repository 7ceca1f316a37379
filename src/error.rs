use thiserror::Error;

#[derive(Error, Debug)]
pub enum DigestError {
    /// Caller misuse (empty group id, non-positive window or batch size). Not retriable.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A message source call failed. Messages from earlier batches were
    /// still merged; `merged` is how many of them were new.
    #[error("Message source unavailable for group {group_id} ({merged} new messages kept): {reason}")]
    SourceUnavailable {
        group_id: String,
        merged: usize,
        reason: String,
    },

    /// The source returned a batch that did not move the cursor backwards,
    /// or one holding messages newer than the cursor it was asked for.
    /// `offending` is the timestamp that broke the rule.
    #[error("Non-progressing fetch for group {group_id}: cursor {cursor}, batch timestamp {offending} ({merged} new messages kept)")]
    NonProgressingFetch {
        group_id: String,
        cursor: f64,
        offending: f64,
        merged: usize,
    },

    /// Business-logic storage errors (corrupt record, lock poisoned, etc.)
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// External WhatsApp bridge scripts (QR, download)
    #[error("Bridge error: {0}")]
    Bridge(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Raw database errors from rusqlite
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl DigestError {
    /// Whether calling again later may succeed without a fix.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. } | Self::Provider(_))
    }

    /// New messages persisted before a fetch aborted, if any.
    pub fn partial_count(&self) -> Option<usize> {
        match self {
            Self::SourceUnavailable { merged, .. } | Self::NonProgressingFetch { merged, .. } => {
                Some(*merged)
            }
            _ => None,
        }
    }
}

pub type DigestResult<T> = Result<T, DigestError>;
