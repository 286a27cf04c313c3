//! Bounded exponential backoff for transient backend failures.
//!
//! Rate limits, 5xx responses, timeouts and connection errors are retried a
//! fixed number of times. Everything else fails on the first try.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use tracing::warn;

use mcpconv_core::config::RetryConfig;

/// Failure of one HTTP round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// Worth retrying: 429, 5xx gateway errors, timeouts, dropped connections.
    #[error("{0}")]
    Transient(String),

    /// Auth errors, bad requests, malformed bodies.
    #[error("{0}")]
    Fatal(String),
}

impl CallError {
    pub fn is_transient(&self) -> bool {
        matches!(self, CallError::Transient(_))
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let detail = format!("{} {}", status, body.trim());
        if is_transient_status(status) {
            CallError::Transient(detail)
        } else {
            CallError::Fatal(detail)
        }
    }

    /// Classify a transport-level error from reqwest.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            CallError::Transient(err.to_string())
        } else if let Some(status) = err.status() {
            CallError::from_status(status, "")
        } else {
            CallError::Fatal(err.to_string())
        }
    }

    /// Classify a failure while reading or decoding a success response.
    ///
    /// A body read cut short by the per-call timeout or a dropped connection
    /// is transient; anything else means the backend sent something we
    /// cannot decode.
    pub fn from_body(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            CallError::Transient(format!("timed out reading response: {err}"))
        } else if err.is_body() || err.is_connect() {
            CallError::Transient(format!("response body interrupted: {err}"))
        } else {
            CallError::Fatal(format!("malformed response: {err}"))
        }
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 408 | 429 | 500 | 502 | 503 | 504)
}

/// Retry schedule: `initial_delay * 2^n`, capped, with ±10% jitter.
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::from_config(&RetryConfig::default())
    }
}

impl Backoff {
    pub fn from_config(config: &RetryConfig) -> Self {
        Backoff {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms.max(config.initial_delay_ms)),
        }
    }

    /// Single attempt, no retries.
    pub fn none() -> Self {
        Backoff {
            max_retries: 0,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// This schedule, with the retry bound replaced when a request
    /// carries its own.
    pub fn for_request(&self, max_retries: Option<u32>) -> Backoff {
        match max_retries {
            Some(n) => self.clone().with_max_retries(n),
            None => self.clone(),
        }
    }

    /// Delay before retry number `retry` (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let multiplier = 2f64.powi(retry.min(16) as i32);
        let base = (self.initial_delay.as_millis() as f64 * multiplier)
            .min(self.max_delay.as_millis() as f64);
        let jitter = (rand::random::<f64>() - 0.5) * 0.2;
        Duration::from_millis((base * (1.0 + jitter)) as u64).min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails fatally, or retries run out.
    pub async fn retry<T, F, Fut>(&self, provider: &str, mut op: F) -> Result<T, CallError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CallError>>,
    {
        let mut retry = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && retry < self.max_retries => {
                    let delay = self.delay_for(retry);
                    warn!(
                        provider,
                        retry = retry + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
