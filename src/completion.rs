//! Streaming chat-completion client.
//!
//! One POST per user question. The response body is handed back as a
//! [`CompletionStream`] of decoded [`SseEvent`]s; the caller drives it with a
//! single consuming loop, so tokens are applied in arrival order.

use std::pin::Pin;

use futures_util::stream::{Stream, StreamExt};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use tracing::{debug, error};

use crate::config::Config;
use crate::error::{DriveChatError, Result};
use crate::providers::{error_detail, CompletionMessage, CompletionRequest};
use crate::session::ChatRole;
use crate::sse::{decode_events, SseEvent};

pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<SseEvent>> + Send>>;

/// Where a single request is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionPhase {
    Idle,
    Requesting,
    Streaming,
    Done,
    Failed,
}

impl CompletionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, CompletionPhase::Done | CompletionPhase::Failed)
    }
}

impl std::fmt::Display for CompletionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CompletionPhase::Idle => "idle",
            CompletionPhase::Requesting => "requesting",
            CompletionPhase::Streaming => "streaming",
            CompletionPhase::Done => "done",
            CompletionPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    referer: String,
    title: String,
}

impl CompletionClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            url: config.completions_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            referer: config.referer.clone(),
            title: config.title.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Two-message streaming request body.
    pub fn build_request(&self, system: &str, user: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                CompletionMessage { role: ChatRole::System, content: system.to_string() },
                CompletionMessage { role: ChatRole::User, content: user.to_string() },
            ],
            stream: true,
        }
    }

    /// POST the request and return the decoded event stream once the
    /// endpoint has answered with a 2xx status.
    pub async fn start(&self, system: &str, user: &str) -> Result<CompletionStream> {
        let request = self.build_request(system, user);
        debug!(url = %self.url, model = %self.model, user_len = user.len(), "posting completion");

        let response = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&request)
            .send()
            .await
            .map_err(|e| DriveChatError::transport(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = DriveChatError::CompletionStatus {
                status: status.as_u16(),
                body: error_detail(&body),
            };
            error!(error = %err, "completion request rejected");
            return Err(err);
        }

        let bytes = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|e| DriveChatError::Stream(e.to_string()))),
        );
        Ok(Box::pin(decode_events(bytes)))
    }
}
