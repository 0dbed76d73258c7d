use std::env;

use crate::{errors::Error, Result};

/// Endpoint of the hosted Bale API.
pub const DEFAULT_BASE_URL: &str = "https://tapi.bale.ai";

/// Immutable connection settings for one bot.
#[derive(Clone, Debug)]
pub struct BotConfig {
    pub token: String,
    pub base_url: String,
}

impl BotConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API host (self-hosted or test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build from `BALE_BOT_TOKEN` and optional `BALE_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        let token = env_str("BALE_BOT_TOKEN").and_then(non_empty).ok_or_else(|| {
            Error::Config("BALE_BOT_TOKEN environment variable is required".to_string())
        })?;

        let base_url = env_str("BALE_BASE_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self { token, base_url })
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
