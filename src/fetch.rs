//! Single-attempt GET helpers for the remote asset host.

use std::sync::Arc;

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::error::{DriveChatError, Result};
use crate::notify::{Notification, Notifier};

/// What the caller expects back; selects the `Accept` header and the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Json,
    Text,
}

impl ContentKind {
    pub fn accept(self) -> &'static str {
        match self {
            ContentKind::Json => "application/json",
            ContentKind::Text => "text/plain",
        }
    }
}

/// GET helper that reports every failure to a [`Notifier`] before
/// returning it. No retries.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    notifier: Arc<dyn Notifier>,
}

impl Fetcher {
    pub fn new(client: Client, notifier: Arc<dyn Notifier>) -> Self {
        Self { client, notifier }
    }

    /// GET `url` and parse the body as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get_bytes(url, ContentKind::Json).await?;
        serde_json::from_slice::<T>(&body).map_err(|source| {
            let err = DriveChatError::Decode { url: url.to_string(), source };
            self.report(&err);
            err
        })
    }

    /// GET `url` as plain text.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let body = self.get_bytes(url, ContentKind::Text).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Best-effort text fetch: any failure is logged and yields `None`
    /// without a user notification.
    pub async fn get_text_optional(&self, url: &str) -> Option<String> {
        match self.request(url, ContentKind::Text).await {
            Ok(body) => Some(String::from_utf8_lossy(&body).into_owned()),
            Err(e) => {
                warn!(url, error = %e, "optional text fetch failed");
                None
            }
        }
    }

    async fn get_bytes(&self, url: &str, kind: ContentKind) -> Result<Vec<u8>> {
        self.request(url, kind).await.inspect_err(|e| self.report(e))
    }

    async fn request(&self, url: &str, kind: ContentKind) -> Result<Vec<u8>> {
        debug!(url, accept = kind.accept(), "GET");
        let resp = self
            .client
            .get(url)
            .header(ACCEPT, kind.accept())
            .send()
            .await
            .map_err(|e| DriveChatError::transport(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DriveChatError::FetchStatus { url: url.to_string(), status: status.as_u16() });
        }

        let bytes = resp.bytes().await.map_err(|e| DriveChatError::transport(url, e))?;
        Ok(bytes.to_vec())
    }

    fn report(&self, err: &DriveChatError) {
        error!(error = %err, "fetch failed");
        let message = match err {
            DriveChatError::FetchStatus { url, status } => {
                format!("Failed to load {} ({status})", asset_name(url))
            }
            DriveChatError::Decode { url, .. } => {
                format!("Could not read {}", asset_name(url))
            }
            DriveChatError::Transport { url, .. } => format!("Failed to load {}", asset_name(url)),
            other => other.to_string(),
        };
        self.notifier.notify(Notification::error(message));
    }
}

/// Last path segment, for short notification text.
fn asset_name(url: &str) -> &str {
    url.rsplit('/').find(|s| !s.is_empty()).unwrap_or(url)
}
