//! Resilient Transport — retrying HTTP execution for the heartbeat pinger
//!
//! ## Architecture
//!
//! - **HttpExecutor**: one physical attempt (production: [`ReqwestExecutor`])
//! - **Transport**: one logical request, however many attempts it takes
//! - **ResilientTransport**: racing rounds with jittered exponential backoff
//!
//! The transport never interprets status codes beyond "2xx or not". A 401 is
//! retried like any other failure; telling it apart is the pinger's job.

mod executor;
mod retry;

pub use executor::ReqwestExecutor;
pub use retry::{Backoff, ResilientTransport, RetryPolicy};

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode, Url};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Request description shared by every attempt of a logical request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl HttpRequest {
    /// Bodyless GET.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
        }
    }
}

/// Outcome of an attempt that reached the server. The body is never kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: StatusCode,
}

impl HttpResponse {
    pub fn new(status: StatusCode) -> Self {
        Self { status }
    }
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),
    #[error("request cancelled")]
    Cancelled,
    #[error("retry round finished without any attempt")]
    NoAttempts,
}

/// Executes a single physical HTTP attempt.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Executes one logical request and yields its final outcome.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: &HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, TransportError>;
}
