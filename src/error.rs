//! Crate-level error type.
//!
//! Every fallible operation in the crate returns [`DriveChatError`]. Each
//! variant carries the URL or status needed to diagnose the failure without
//! inspecting the originating error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriveChatError {
    /// The request never produced an HTTP response (DNS, TCP, TLS, reset).
    #[error("transport failure fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A GET for a remote asset answered with a non-2xx status.
    #[error("HTTP {status} fetching {url}")]
    FetchStatus { url: String, status: u16 },

    /// The body arrived but could not be parsed as the expected JSON shape.
    #[error("could not decode JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The chat-completion endpoint answered with a non-2xx status.
    #[error("completion endpoint returned HTTP {status}: {body}")]
    CompletionStatus { status: u16, body: String },

    /// Reading the streamed completion body failed part-way.
    #[error("completion stream failed: {0}")]
    Stream(String),

    /// Configuration file could not be read or parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DriveChatError {
    /// Wrap a reqwest error raised while talking to `url`.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        DriveChatError::Transport { url: url.into(), source }
    }

    /// HTTP status code, when the failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            DriveChatError::FetchStatus { status, .. }
            | DriveChatError::CompletionStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DriveChatError>;
