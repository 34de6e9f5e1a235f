//! System-wide default constants.
//!
//! Centralises the wire contract and retry tuning so the pinger, the
//! transport and the CLI agree on a single set of numbers.

// ============================================================================
// Opsgenie API
// ============================================================================

/// Production root of the Opsgenie API.
pub const DEFAULT_ENDPOINT: &str = "https://api.opsgenie.com";

/// Authorization scheme expected by the Heartbeat API (`Authorization: GenieKey <key>`).
pub const AUTH_SCHEME: &str = "GenieKey";

/// User agent sent with every ping.
pub const USER_AGENT: &str = concat!("opsgenie-heartbeat/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Environment
// ============================================================================

/// Environment variable holding the Opsgenie API key.
pub const ENV_API_KEY: &str = "OPSGENIE_HEARTBEAT_KEY";

/// Environment variable overriding the API root (e.g. the EU instance).
pub const ENV_ENDPOINT: &str = "OPSGENIE_API_ENDPOINT";

// ============================================================================
// Resilient Transport
// ============================================================================

/// Hard ceiling for a single physical attempt (seconds).
pub const ATTEMPT_TIMEOUT_SECS: u64 = 10;

/// Retry rounds after the original attempt. 5 = up to 6 rounds in total.
pub const MAX_RETRIES: u32 = 5;

/// Racing attempts issued per round.
pub const RETRY_CONCURRENCY: usize = 3;

/// Upper bound (exclusive) of the random jitter added by the jittered backoffs (ms).
pub const BACKOFF_JITTER_MS: u64 = 1_000;

/// Largest exponent used by exponential backoff. 2^6 = 64 s.
pub const MAX_BACKOFF_EXPONENT: u32 = 6;

/// Response bytes read before the body is abandoned. The body is never used.
pub const MAX_DRAIN_BYTES: usize = 64 * 1024;
