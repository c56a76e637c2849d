use std::time::Duration;

use taskdeck_core::{ClientError, ClientResult};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the task store lives and how to talk to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Sent as a bearer token when present. Never inspected here.
    pub auth_token: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build from `TASKDECK_API_URL`, `TASKDECK_API_TOKEN` and
    /// `TASKDECK_TIMEOUT_SECS`.
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("TASKDECK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "TASKDECK_API_URL must be an http(s) URL, got {:?}",
                base_url
            )));
        }

        let mut config = Self::new(&base_url);

        if let Some(token) = lookup("TASKDECK_API_TOKEN").filter(|t| !t.is_empty()) {
            config = config.with_token(token);
        }

        if let Some(raw) = lookup("TASKDECK_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ClientError::Config(format!("TASKDECK_TIMEOUT_SECS is not a number: {:?}", raw))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
