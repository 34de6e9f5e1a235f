//! Retry policy and the racing retry loop

use super::{HttpExecutor, HttpRequest, HttpResponse, Transport, TransportError};
use crate::config::defaults::{
    ATTEMPT_TIMEOUT_SECS, BACKOFF_JITTER_MS, MAX_BACKOFF_EXPONENT, MAX_RETRIES,
    RETRY_CONCURRENCY,
};
use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use rand::Rng;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Delay between retry rounds.
///
/// `n` is the 1-based retry round. Jittered variants add `[0, 1000)` ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay every round
    Constant(Duration),
    /// `n` seconds
    Linear,
    /// `n` seconds plus jitter
    LinearJitter,
    /// `2^n` seconds
    Exponential,
    /// `2^n` seconds plus jitter
    ExponentialJitter,
}

impl Backoff {
    pub fn delay(&self, retry: u32) -> Duration {
        match self {
            Self::Constant(d) => *d,
            Self::Linear => Duration::from_secs(u64::from(retry)),
            Self::LinearJitter => Duration::from_secs(u64::from(retry)) + jitter(),
            Self::Exponential => exponential(retry),
            Self::ExponentialJitter => exponential(retry) + jitter(),
        }
    }
}

fn exponential(retry: u32) -> Duration {
    Duration::from_secs(1u64 << retry.min(MAX_BACKOFF_EXPONENT))
}

fn jitter() -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(0..BACKOFF_JITTER_MS))
}

/// How a logical request is retried. Fixed once the transport is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Rounds after the original one
    pub max_retries: u32,
    /// Racing attempts per round
    pub concurrency: NonZeroUsize,
    /// Ceiling for each physical attempt
    pub timeout: Duration,
    pub backoff: Backoff,
}

const DEFAULT_CONCURRENCY: NonZeroUsize = match NonZeroUsize::new(RETRY_CONCURRENCY) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            concurrency: DEFAULT_CONCURRENCY,
            timeout: Duration::from_secs(ATTEMPT_TIMEOUT_SECS),
            backoff: Backoff::ExponentialJitter,
        }
    }
}

impl RetryPolicy {
    /// One attempt, no retries.
    pub fn single_attempt() -> Self {
        Self {
            max_retries: 0,
            concurrency: NonZeroUsize::MIN,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Clamped to at least one attempt per round.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = NonZeroUsize::new(concurrency).unwrap_or(NonZeroUsize::MIN);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }
}

type Outcome = Result<HttpResponse, TransportError>;

fn is_success(outcome: &Outcome) -> bool {
    matches!(outcome, Ok(resp) if resp.status.is_success())
}

/// Retries failed requests in racing rounds with backoff in between.
///
/// Round 0 is the original request, rounds `1..=max_retries` are retries.
/// Each round fires `concurrency` identical attempts; the first 2xx wins and
/// the rest of the round is dropped. Anything else (transport error or non-2xx,
/// 401 included) counts as a failed attempt. When every round has failed the
/// last outcome observed is returned unchanged.
#[derive(Debug)]
pub struct ResilientTransport<E> {
    executor: E,
    policy: RetryPolicy,
}

impl<E: HttpExecutor> ResilientTransport<E> {
    pub fn new(executor: E, policy: RetryPolicy) -> Self {
        Self { executor, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    async fn attempt(&self, request: &HttpRequest) -> Outcome {
        let attempt = self.executor.execute(request);
        match tokio::time::timeout(self.policy.timeout, attempt).await {
            Ok(outcome) => outcome,
            Err(_) => Err(TransportError::Timeout(self.policy.timeout)),
        }
    }

    /// Race one round. Returns the winning 2xx, or the last failure to land.
    async fn race_round(&self, request: &HttpRequest, cancel: &CancellationToken) -> Outcome {
        let mut attempts: FuturesUnordered<_> = (0..self.policy.concurrency.get())
            .map(|_| self.attempt(request))
            .collect();

        let mut last = None;
        loop {
            tokio::select! {
                () = cancel.cancelled() => return Err(TransportError::Cancelled),
                next = attempts.next() => match next {
                    Some(outcome) if is_success(&outcome) => return outcome,
                    Some(outcome) => {
                        debug!(outcome = ?outcome, "Attempt failed");
                        last = Some(outcome);
                    }
                    None => break,
                },
            }
        }

        last.unwrap_or(Err(TransportError::NoAttempts))
    }
}

#[async_trait]
impl<E: HttpExecutor> Transport for ResilientTransport<E> {
    async fn send(&self, request: &HttpRequest, cancel: &CancellationToken) -> Outcome {
        let mut round: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(TransportError::Cancelled);
            }

            debug!(
                round,
                concurrency = self.policy.concurrency.get(),
                url = %request.url,
                "Sending request"
            );
            let outcome = self.race_round(request, cancel).await;

            if is_success(&outcome)
                || matches!(outcome, Err(TransportError::Cancelled))
                || round >= self.policy.max_retries
            {
                return outcome;
            }

            round += 1;
            let delay = self.policy.backoff.delay(round);
            // Intermediate failures stay below the CLI's default `warn` filter.
            info!(
                url = %request.url,
                outcome = ?outcome,
                retry = round,
                max_retries = self.policy.max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Request failed, backing off"
            );

            tokio::select! {
                () = cancel.cancelled() => return Err(TransportError::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }
        }
    }
}
