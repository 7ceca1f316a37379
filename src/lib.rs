//! Group Digest — windowed WhatsApp group sync and AI summaries.
//!
//! Library behind the `group-digest` CLI: message sources, the windowed
//! fetcher, message stores, the WhatsApp bridge and the summarizer.

// Foundation types
pub mod constants;
pub mod error;
pub mod message;
pub mod time_utils;

// Core types
pub mod config;
pub mod fetcher;

// Sub-systems
pub mod bridge;
pub mod source;
pub mod storage;
pub mod summary;
pub mod tracing_init;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-exports for convenience
pub use error::{DigestError, DigestResult};
pub use fetcher::WindowedFetcher;
pub use message::{Group, Message};
