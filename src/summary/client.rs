//! Chat-completion client — the only place that talks to the LLM API.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::{DigestError, DigestResult};

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

/// Abstraction du fournisseur LLM
pub trait CompletionClient: Send + Sync {
    fn complete(&self, request: &CompletionRequest) -> DigestResult<Completion>;
}

impl<C: CompletionClient + ?Sized> CompletionClient for Arc<C> {
    fn complete(&self, request: &CompletionRequest) -> DigestResult<Completion> {
        (**self).complete(request)
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible `/chat/completions` endpoint, blocking.
pub struct OpenAiClient {
    api_base: String,
    api_key: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(api_base: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout,
        }
    }

    /// Build from config; fails if the API key variable is unset.
    pub fn from_config(cfg: &LlmConfig) -> DigestResult<Self> {
        let key = cfg.api_key()?;
        Ok(Self::new(&cfg.api_base, &key, Duration::from_secs(cfg.timeout_secs)))
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

pub(crate) fn request_body(request: &CompletionRequest) -> serde_json::Value {
    serde_json::json!({
        "model": request.model,
        "messages": [
            {"role": "system", "content": request.system},
            {"role": "user", "content": request.user},
        ],
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
    })
}

pub(crate) fn parse_response(raw: &str) -> DigestResult<Completion> {
    let parsed: ChatResponse = serde_json::from_str(raw)
        .map_err(|e| DigestError::Provider(format!("Unreadable completion response: {}", e)))?;
    let text = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| DigestError::Provider("Completion returned no content".into()))?;
    Ok(Completion {
        text,
        usage: parsed.usage,
    })
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, request: &CompletionRequest) -> DigestResult<Completion> {
        tracing::info!(model = %request.model, prompt_len = request.user.len(), "Completion call starting");

        let body = serde_json::to_vec(&request_body(request))?;
        let response = ureq::post(&self.endpoint())
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .config()
            .timeout_global(Some(self.timeout))
            .build()
            .send(body.as_slice())
            .map_err(|e| DigestError::Provider(format!("Completion request failed: {}", e)))?;

        let raw = response
            .into_body()
            .read_to_string()
            .map_err(|e| DigestError::Provider(format!("Completion body unreadable: {}", e)))?;

        let completion = parse_response(&raw)?;
        tracing::info!(
            model = %request.model,
            tokens = completion.usage.total_tokens,
            "Completion call finished"
        );
        Ok(completion)
    }
}
