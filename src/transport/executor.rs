//! reqwest-backed executor

use super::{HttpExecutor, HttpRequest, HttpResponse, TransportError};
use crate::config::defaults::{MAX_DRAIN_BYTES, USER_AGENT};
use async_trait::async_trait;

/// Executes attempts on a pooled `reqwest::Client`.
///
/// The pool is shared by every attempt, so racing attempts and later rounds
/// reuse warm connections where the server allows it. The client carries no
/// timeout of its own; the per-attempt ceiling belongs to
/// [`super::ResilientTransport`].
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    http: reqwest::Client,
}

impl ReqwestExecutor {
    pub fn new() -> Result<Self, TransportError> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self { http })
    }

    /// Wrap an existing client.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut resp = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status();

        // Drain small bodies so the connection can go back to the pool. Past
        // MAX_DRAIN_BYTES the response is dropped and the connection closed.
        let mut drained = 0;
        while drained < MAX_DRAIN_BYTES {
            match resp.chunk().await {
                Ok(Some(chunk)) => drained += chunk.len(),
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!(error = %e, %status, "Failed to drain response body");
                    break;
                }
            }
        }

        Ok(HttpResponse::new(status))
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_connect() {
        TransportError::Connection(e.to_string())
    } else {
        TransportError::Http(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, Bytes};
    use axum::Router;
    use std::time::{Duration, Instant};

    fn ping_url(addr: std::net::SocketAddr) -> reqwest::Url {
        reqwest::Url::parse(&format!("http://{addr}/v2/heartbeats/x/ping")).unwrap()
    }

    #[tokio::test]
    async fn test_connection_refused_is_connection_error() {
        // Bind then drop so the port is known to be closed.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let executor = ReqwestExecutor::new().unwrap();
        let err = executor
            .execute(&HttpRequest::get(ping_url(addr)))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_endless_body_is_not_read_to_the_end() {
        let app = Router::new().fallback(|| async {
            let chunk = Bytes::from(vec![b'x'; 8 * 1024]);
            let endless = futures::StreamExt::map(futures::stream::repeat(chunk), Ok::<_, std::io::Error>);
            Body::from_stream(endless)
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let executor = ReqwestExecutor::new().unwrap();
        let started = Instant::now();
        let resp = tokio::time::timeout(
            Duration::from_secs(5),
            executor.execute(&HttpRequest::get(ping_url(addr))),
        )
        .await
        .expect("drain should stop at the byte cap")
        .unwrap();

        assert_eq!(resp.status, reqwest::StatusCode::OK);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
