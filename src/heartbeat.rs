//! Heartbeat Pinger — builds the ping request and classifies the answer
//!
//! The API key and endpoint are bound at construction; the heartbeat name is
//! supplied per call, so one pinger can serve any number of heartbeats.
//!
//! Retries are entirely the transport's concern. The pinger only ever sees the
//! final outcome and maps it, in order, to:
//!
//! 1. transport failure → [`PingError::Transport`]
//! 2. 401 → [`PingError::Unauthorized`]
//! 3. any other non-2xx → [`PingError::NonOkStatus`]
//! 4. 2xx → `Ok(())`

use crate::config::defaults::AUTH_SCHEME;
use crate::config::HeartbeatConfig;
use crate::transport::{HttpRequest, ReqwestExecutor, ResilientTransport, Transport, TransportError};
use reqwest::header::{HeaderValue, InvalidHeaderValue, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Ping errors
#[derive(Debug, thiserror::Error)]
pub enum PingError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("invalid api key")]
    Unauthorized,
    #[error("non 2xx status code: {0}")]
    NonOkStatus(StatusCode),
    #[error("invalid ping URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("api key is not a valid header value: {0}")]
    InvalidApiKey(#[from] InvalidHeaderValue),
}

/// Talks to the Opsgenie Heartbeat API.
#[derive(Clone)]
pub struct Pinger {
    api_key: String,
    endpoint: String,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Pinger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pinger")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl Pinger {
    /// Create a pinger. Trailing slashes on `endpoint` are dropped.
    pub fn new(api_key: impl Into<String>, endpoint: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            transport,
        }
    }

    /// Create a pinger backed by a retrying reqwest transport.
    pub fn from_config(config: &HeartbeatConfig) -> Result<Self, PingError> {
        let executor = ReqwestExecutor::new()?;
        let transport = ResilientTransport::new(executor, config.retry);

        Ok(Self::new(
            config.api_key.clone(),
            &config.endpoint,
            Arc::new(transport),
        ))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// API root without trailing slash.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `{endpoint}/v2/heartbeats/{heartbeat}/ping`. The name is used verbatim.
    pub fn ping_url(&self, heartbeat: &str) -> String {
        format!("{}/v2/heartbeats/{}/ping", self.endpoint, heartbeat)
    }

    /// Build the authenticated GET for `heartbeat`.
    pub fn build_request(&self, heartbeat: &str) -> Result<HttpRequest, PingError> {
        let url = self.ping_url(heartbeat);
        let parsed = Url::parse(&url).map_err(|e| PingError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let mut auth = HeaderValue::from_str(&format!("{AUTH_SCHEME} {}", self.api_key))?;
        auth.set_sensitive(true);

        let mut request = HttpRequest::get(parsed);
        request.headers.insert(AUTHORIZATION, auth);
        Ok(request)
    }

    /// Ping `heartbeat` once (as far as the caller can tell).
    pub async fn ping(&self, heartbeat: &str, cancel: &CancellationToken) -> Result<(), PingError> {
        let request = self.build_request(heartbeat)?;
        debug!(heartbeat, url = %request.url, "Pinging heartbeat");

        let resp = self.transport.send(&request, cancel).await?;

        match resp.status {
            StatusCode::UNAUTHORIZED => Err(PingError::Unauthorized),
            status if !status.is_success() => Err(PingError::NonOkStatus(status)),
            status => {
                info!(heartbeat, %status, "Heartbeat sent");
                Ok(())
            }
        }
    }
}
