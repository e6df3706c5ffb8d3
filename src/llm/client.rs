// Anthropic Messages API client for the slate Q&A panel.
//
// Unlike an interactive chat surface, the Q&A panel returns the model's
// answer verbatim, so this client uses a plain (non-streaming) request.
// The source behavior had no timeout or retry; we impose a per-request
// timeout and a single retry on transport errors as a documented extension.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("language model not configured (no API key)")]
    NotConfigured,

    #[error("request to language model failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("language model returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("language model response contained no text content")]
    EmptyResponse,
}

// ---------------------------------------------------------------------------
// GptClient
// ---------------------------------------------------------------------------

/// Low-level Messages API client.
pub struct GptClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl GptClient {
    /// Create a client with the given API key, model, and token budget.
    /// `timeout` bounds each individual HTTP request.
    pub fn new(api_key: String, model: String, max_tokens: u32, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            api_key,
            model,
            max_tokens,
        }
    }

    /// Forward `question` plus the serialized results `context` to the model
    /// and return its answer verbatim.
    pub async fn ask(&self, question: &str, context: &str) -> Result<String, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::NotConfigured);
        }

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": crate::llm::prompt::system_prompt(),
            "messages": [{
                "role": "user",
                "content": crate::llm::prompt::build_question_prompt(question, context),
            }]
        });

        // Single retry on transport failure only; HTTP error statuses are
        // returned to the caller immediately.
        let response = match self.send(&body).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "transport error talking to language model, retrying once");
                self.send(&body).await.map_err(LlmError::Transport)?
            }
        };

        let status = response.status();
        let payload: Value = response.json().await.map_err(LlmError::Transport)?;

        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: parse_api_error(&payload).unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        debug!("language model answered");
        parse_answer_text(&payload).ok_or(LlmError::EmptyResponse)
    }

    async fn send(&self, body: &Value) -> Result<reqwest::Response, reqwest::Error> {
        self.http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
    }
}

// ---------------------------------------------------------------------------
// LlmClient wrapper
// ---------------------------------------------------------------------------

/// High-level wrapper that is either an active client or disabled.
pub enum LlmClient {
    /// API key configured and ready.
    Active(GptClient),
    /// Q&A disabled (no API key). Asking returns `NotConfigured` instead of
    /// blocking or corrupting the already-computed results.
    Disabled,
}

impl LlmClient {
    /// Build an `LlmClient` from the application config.
    pub fn from_config(config: &Config) -> Self {
        match &config.credentials.anthropic_api_key {
            Some(key) if !key.is_empty() => LlmClient::Active(GptClient::new(
                key.clone(),
                config.llm.model.clone(),
                config.llm.max_tokens,
                Duration::from_secs(config.llm.timeout_secs),
            )),
            _ => LlmClient::Disabled,
        }
    }

    /// Ask a free-text question about the serialized results table.
    pub async fn ask_gpt(&self, question: &str, context: &str) -> Result<String, LlmError> {
        match self {
            LlmClient::Active(client) => client.ask(question, context).await,
            LlmClient::Disabled => Err(LlmError::NotConfigured),
        }
    }
}

// ---------------------------------------------------------------------------
// Response JSON parsing helpers
// ---------------------------------------------------------------------------

/// Extract the concatenated text blocks from a Messages API response.
///
/// Expected shape: `{ "content": [ { "type": "text", "text": "..." }, ... ] }`
pub(crate) fn parse_answer_text(payload: &Value) -> Option<String> {
    let blocks = payload.get("content")?.as_array()?;
    let mut text = String::new();
    for block in blocks {
        if block.get("type").and_then(Value::as_str) == Some("text") {
            if let Some(t) = block.get("text").and_then(Value::as_str) {
                text.push_str(t);
            }
        }
    }
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Extract `error.message` from an API error payload.
///
/// Expected shape: `{ "error": { "type": "...", "message": "..." } }`
pub(crate) fn parse_api_error(payload: &Value) -> Option<String> {
    payload
        .get("error")?
        .get("message")?
        .as_str()
        .map(|s| s.to_string())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
