//! The capability interface every LLM backend implements.
//!
//! The converter only ever talks to `dyn LlmClient`; which concrete client it
//! gets is decided by the registry's factory.

use std::time::Duration;

use async_trait::async_trait;

use mcpconv_core::config::LlmConfig;
use mcpconv_core::types::{AuthStatus, Availability, LlmRequest, LlmResult};

use crate::backoff::Backoff;

/// A live connection to one LLM backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Registry name (e.g. `"openai"`, `"custom"`).
    fn name(&self) -> &str;

    /// Model used when the request does not override it.
    fn model(&self) -> &str;

    /// Whether the backend can be reached, without making a billed call.
    ///
    /// Remote APIs only check that they are configured; the local runtime
    /// is actually checked.
    async fn check_availability(&self) -> Availability;

    /// Whether a credential is present. `NotApplicable` for backends that
    /// need none.
    fn check_authentication(&self) -> AuthStatus;

    /// Issue one model call.
    ///
    /// Transient failures are retried internally with bounded backoff.
    /// Expected failures come back as `succeeded = false`, never as a panic.
    async fn complete(&self, request: &LlmRequest) -> LlmResult;
}

/// Per-call knobs shared by every client built from one config.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOptions {
    pub max_tokens: u32,
    pub temperature: f64,
    /// Bound on a single HTTP round trip. Exceeding it counts as transient.
    pub timeout: Duration,
    pub backoff: Backoff,
}

impl CallOptions {
    pub fn from_config(config: &LlmConfig) -> Self {
        CallOptions {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: Duration::from_secs(config.request_timeout_secs.max(1)),
            backoff: Backoff::from_config(&config.retry),
        }
    }
}

impl Default for CallOptions {
    fn default() -> Self {
        CallOptions::from_config(&LlmConfig::default())
    }
}
