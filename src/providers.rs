use serde::{Deserialize, Serialize};

use crate::session::ChatRole;

// -- Chat-completion request (OpenAI-compatible, as served by OpenRouter) ----

#[derive(Debug, Clone, Serialize)]
pub struct CompletionMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<CompletionMessage>,
    pub stream: bool,
}

// -- Streamed chunk types ----------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct CompletionDelta {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub delta: CompletionDelta,
    #[allow(dead_code)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChunk {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

impl CompletionChunk {
    /// The incremental text of the first choice, if non-empty.
    pub fn token(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
            .filter(|t| !t.is_empty())
    }
}

// -- Error envelope ----------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ProviderErrorBody {
    pub message: String,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ProviderErrorEnvelope {
    pub error: ProviderErrorBody,
}

/// Human-readable detail from an error response body; falls back to the raw
/// text when it is not the usual `{"error":{"message":...}}` envelope.
pub fn error_detail(body: &str) -> String {
    serde_json::from_str::<ProviderErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
