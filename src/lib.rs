//! opsgenie-heartbeat: liveness pings for the Opsgenie Heartbeat API
//!
//! Sends one authenticated `GET /v2/heartbeats/{name}/ping` per invocation,
//! riding out transient failures without hiding authentication errors.
//!
//! ## Architecture
//!
//! - **Pinger**: builds the request, classifies the final response
//! - **ResilientTransport**: racing retry rounds with jittered exponential backoff
//! - **HeartbeatConfig**: API key, endpoint and retry policy
//!
//! ```no_run
//! use opsgenie_heartbeat::{HeartbeatConfig, Pinger};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pinger = Pinger::from_config(&HeartbeatConfig::new("api-key"))?;
//! pinger.ping("nightly-backup", &CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod heartbeat;
pub mod transport;

pub use config::{ConfigError, HeartbeatConfig};
pub use heartbeat::{PingError, Pinger};
pub use transport::{
    Backoff, HttpExecutor, HttpRequest, HttpResponse, ReqwestExecutor, ResilientTransport,
    RetryPolicy, Transport, TransportError,
};
