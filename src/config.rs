//! Runtime configuration.
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML file,
//! environment variables. The binary applies CLI flags on top of the result.

use std::path::Path;

use serde::Deserialize;

use crate::error::{DriveChatError, Result};

pub const DEFAULT_ASSET_BASE_URL: &str = "https://d2u0hfgsz4s77s.cloudfront.net";
pub const DEFAULT_COMPLETIONS_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-exp:free";
pub const DEFAULT_TITLE: &str = "PCD Chat Assistant";
pub const DEFAULT_REFERER: &str = "http://localhost";
/// Sent when no key is configured; the endpoint rejects it with 401.
pub const PLACEHOLDER_API_KEY: &str = "OPENROUTER_API_KEY";

pub const ENV_API_KEY: &str = "OPENROUTER_API_KEY";
pub const ENV_MODEL: &str = "DRIVECHAT_MODEL";
pub const ENV_ASSET_BASE_URL: &str = "DRIVECHAT_ASSET_BASE";
pub const ENV_COMPLETIONS_URL: &str = "DRIVECHAT_COMPLETIONS_URL";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Root of the per-sequence asset tree (`{base}/scene_{id}/...`).
    pub asset_base_url: String,
    pub completions_url: String,
    pub model: String,
    pub api_key: String,
    /// Value of the `HTTP-Referer` attribution header.
    pub referer: String,
    /// Value of the `X-Title` attribution header.
    pub title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            asset_base_url: DEFAULT_ASSET_BASE_URL.to_string(),
            completions_url: DEFAULT_COMPLETIONS_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: PLACEHOLDER_API_KEY.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// On-disk shape; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    asset_base_url: Option<String>,
    completions_url: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    referer: Option<String>,
    title: Option<String>,
}

impl Config {
    /// Defaults, then `path` (if given), then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();
        if let Some(path) = path {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| DriveChatError::Config(format!("{}: {e}", path.display())))?;
            config.merge_toml(&raw)?;
        }
        config.merge_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Overlay keys present in a TOML document.
    pub fn merge_toml(&mut self, raw: &str) -> Result<()> {
        let file: FileConfig =
            toml::from_str(raw).map_err(|e| DriveChatError::Config(e.to_string()))?;
        overlay(&mut self.asset_base_url, file.asset_base_url);
        overlay(&mut self.completions_url, file.completions_url);
        overlay(&mut self.model, file.model);
        overlay(&mut self.api_key, file.api_key);
        overlay(&mut self.referer, file.referer);
        overlay(&mut self.title, file.title);
        Ok(())
    }

    /// Overlay environment variables; blank values are ignored.
    pub fn merge_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        overlay(&mut self.api_key, lookup(ENV_API_KEY));
        overlay(&mut self.model, lookup(ENV_MODEL));
        overlay(&mut self.asset_base_url, lookup(ENV_ASSET_BASE_URL));
        overlay(&mut self.completions_url, lookup(ENV_COMPLETIONS_URL));
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key != PLACEHOLDER_API_KEY
    }
}

fn overlay(slot: &mut String, value: Option<String>) {
    if let Some(v) = value {
        let v = v.trim();
        if !v.is_empty() {
            *slot = v.to_string();
        }
    }
}
