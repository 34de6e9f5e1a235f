//! Heartbeat configuration loaded from the environment

use crate::config::defaults::{DEFAULT_ENDPOINT, ENV_API_KEY, ENV_ENDPOINT};
use crate::transport::RetryPolicy;

/// Everything needed to construct a [`crate::Pinger`].
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Opsgenie API key sent as `GenieKey <key>`
    pub api_key: String,
    /// API root, e.g. `https://api.opsgenie.com`
    pub endpoint: String,
    /// Retry policy applied by the resilient transport
    pub retry: RetryPolicy,
}

impl HeartbeatConfig {
    /// Production endpoint and retry policy for the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Override the API root.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Load from `OPSGENIE_HEARTBEAT_KEY` and `OPSGENIE_API_ENDPOINT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = non_empty_var(ENV_API_KEY).ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key);
        if let Some(endpoint) = non_empty_var(ENV_ENDPOINT) {
            tracing::debug!(endpoint = %endpoint, "Using API endpoint from environment");
            config.endpoint = endpoint;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that could never produce a successful ping.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        let url = reqwest::Url::parse(&self.endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        Ok(())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("OPSGENIE_HEARTBEAT_KEY is not set")]
    MissingApiKey,
    #[error("invalid API endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}
