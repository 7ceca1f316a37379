//! Summaries of stored group messages through a chat-completion API.

pub mod analysis;
pub mod client;
pub mod parse;
pub mod prompts;
pub mod summarizer;

pub use analysis::{recent_messages, verify_recent_messages, AnalysisType};
pub use client::{CompletionClient, OpenAiClient};
pub use parse::{parse_discussions, Discussion};
pub use prompts::SummaryPrompts;
pub use summarizer::{Summarizer, Summary, SummaryRequest};
