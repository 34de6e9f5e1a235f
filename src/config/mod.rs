//! Heartbeat Configuration Module
//!
//! Resolves the API key, API root and retry policy for one ping.
//!
//! ## Loading Order
//!
//! 1. `OPSGENIE_HEARTBEAT_KEY` environment variable (required)
//! 2. `OPSGENIE_API_ENDPOINT` environment variable (optional)
//! 3. Built-in defaults from [`defaults`]
//!
//! Only the binary calls [`HeartbeatConfig::from_env`]; the library types take
//! every value as an explicit argument.

mod heartbeat_config;
pub mod defaults;

pub use heartbeat_config::*;
