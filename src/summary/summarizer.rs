use std::sync::Arc;

use serde::Serialize;

use super::analysis::{recent_messages, AnalysisType};
use super::client::{CompletionClient, CompletionRequest};
use super::parse::{parse_discussions, Discussion};
use crate::config::LlmConfig;
use crate::fetcher::{Clock, SystemClock};
use crate::message::Message;
use crate::storage::{MessageStore, UsageLog, UsageRecord};
use crate::{DigestError, DigestResult};

/// Fallback when neither a named prompt nor an analysis prompt exists.
pub const DEFAULT_PROMPT: &str = "Summarize the conversation";

#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub group_id: String,
    pub window_secs: f64,
    pub analysis: AnalysisType,
    pub criteria: Option<String>,
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub text: String,
    pub messages_used: usize,
    pub discussions: Vec<Discussion>,
}

/// One message per line, bodies only.
pub fn format_messages(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| m.body.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct Summarizer {
    store: Arc<dyn MessageStore>,
    client: Box<dyn CompletionClient>,
    llm: LlmConfig,
    usage_log: Option<UsageLog>,
    clock: Arc<dyn Clock>,
}

impl Summarizer {
    pub fn new(store: Arc<dyn MessageStore>, client: Box<dyn CompletionClient>, llm: LlmConfig) -> Self {
        Self {
            store,
            client,
            llm,
            usage_log: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_usage_log(mut self, log: UsageLog) -> Self {
        self.usage_log = Some(log);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Summarize the group's stored messages inside the request window.
    pub fn summarize(&self, req: &SummaryRequest) -> DigestResult<Summary> {
        let now = self.clock.now();
        let recent = recent_messages(self.store.as_ref(), &req.group_id, req.window_secs, now)?;
        let selected = req.analysis.select(recent, req.criteria.as_deref());
        if selected.is_empty() {
            return Err(DigestError::InvalidArgument(format!(
                "no messages to summarize for group {} ({})",
                req.group_id,
                req.analysis.as_str()
            )));
        }

        let completion = self.client.complete(&CompletionRequest {
            model: self.llm.model.clone(),
            system: self.llm.system_prompt.clone(),
            user: format!("{}\n\nMessages:\n{}", req.prompt, format_messages(&selected)),
            max_tokens: self.llm.max_tokens,
            temperature: self.llm.temperature,
        })?;

        if let Some(log) = &self.usage_log {
            let record = UsageRecord {
                timestamp: now,
                prompt: req.prompt.clone(),
                message_count: selected.len(),
                summary: completion.text.clone(),
                tokens_used: completion.usage.total_tokens,
                tokens_input: completion.usage.prompt_tokens,
                tokens_output: completion.usage.completion_tokens,
            };
            if let Err(e) = log.append(&record) {
                tracing::warn!(error = %e, path = %log.path().display(), "Failed to log API usage");
            }
        }

        tracing::info!(
            group_id = %req.group_id,
            analysis = req.analysis.as_str(),
            messages = selected.len(),
            "Summary generated"
        );

        Ok(Summary {
            discussions: parse_discussions(&completion.text),
            text: completion.text,
            messages_used: selected.len(),
        })
    }
}
