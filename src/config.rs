//! n8n connection configuration
//!
//! Read once at process start and handed to [`crate::n8n::N8nClient::new`].

use std::time::Duration;

use url::Url;

use crate::n8n::error::{N8nError, Result};

pub const DEFAULT_BASE_URL: &str = "https://n8n.8k.net.br";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the n8n public API
#[derive(Debug, Clone)]
pub struct N8nConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub request_timeout: Duration,
}

/// How requests authenticate against n8n
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum N8nAuth {
    /// `X-N8N-API-KEY` header
    ApiKey(String),
    /// `Authorization: Basic ...`
    Basic { username: String, password: String },
}

impl Default for N8nConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            username: None,
            password: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl N8nConfig {
    /// Create a config for `base_url` with no credentials
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Build from `N8N_*` environment variables.
    ///
    /// Missing credentials are not an error here; they surface on the first
    /// request through [`N8nConfig::auth`].
    pub fn from_env() -> Self {
        Self {
            base_url: env_non_empty("N8N_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: env_non_empty("N8N_API_KEY"),
            username: env_non_empty("N8N_USERNAME"),
            password: env_non_empty("N8N_PASSWORD"),
            request_timeout: Duration::from_secs(
                env_non_empty("N8N_REQUEST_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Pick the auth method: API key wins, basic auth is the fallback.
    pub fn auth(&self) -> Result<N8nAuth> {
        if let Some(key) = non_empty(&self.api_key) {
            return Ok(N8nAuth::ApiKey(key.to_string()));
        }

        match (non_empty(&self.username), non_empty(&self.password)) {
            (Some(username), Some(password)) => Ok(N8nAuth::Basic {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => Err(N8nError::Configuration(
                "no authentication method available; set N8N_API_KEY or N8N_USERNAME/N8N_PASSWORD"
                    .to_string(),
            )),
        }
    }

    /// `{base_url}/api/v1` with trailing slashes removed from the base
    pub fn api_root(&self) -> Result<String> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        Url::parse(trimmed).map_err(|e| {
            N8nError::Configuration(format!("invalid n8n base URL '{}': {}", self.base_url, e))
        })?;
        Ok(format!("{}/api/v1", trimmed))
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
