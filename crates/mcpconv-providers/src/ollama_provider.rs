//! Local Ollama runtime client.
//!
//! No credential. Availability is a real request to `GET /api/tags`, since a
//! local daemon is often simply not running.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use mcpconv_core::types::{AuthStatus, Availability, LlmRequest, LlmResult, Message};

use crate::backoff::CallError;
use crate::traits::{CallOptions, LlmClient};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

/// Normalize an `OLLAMA_HOST`-style value (`0.0.0.0:11434`, `gpu:11434/`)
/// into a base URL.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

/// Client for a local (or LAN) Ollama daemon.
#[derive(Debug)]
pub struct OllamaProvider {
    client: reqwest::Client,
    name: String,
    base_url: String,
    model: String,
    options: CallOptions,
}

impl OllamaProvider {
    pub fn new(
        name: impl Into<String>,
        base_url: &str,
        model: impl Into<String>,
        options: CallOptions,
    ) -> Self {
        OllamaProvider {
            client: reqwest::Client::new(),
            name: name.into(),
            base_url: normalize_host(base_url),
            model: model.into(),
            options,
        }
    }

    async fn send_once(&self, body: &ChatRequest<'_>) -> Result<String, CallError> {
        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .timeout(self.options.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = %self.name, error = %e, "HTTP request failed");
                CallError::from_reqwest(&e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(provider = %self.name, status = %status, body = %error_text, "Ollama error");
            return Err(CallError::from_status(status, &error_text));
        }

        let parsed = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| CallError::from_body(&e))?;

        parsed
            .message
            .map(|m| m.content)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| CallError::Fatal("response contained no message content".to_string()))
    }
}

#[async_trait]
impl LlmClient for OllamaProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn check_availability(&self) -> Availability {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).timeout(HEALTH_TIMEOUT).send().await {
            Ok(resp) if resp.status().is_success() => Availability::Ok,
            Ok(resp) => Availability::Failed(format!("{} returned {}", url, resp.status())),
            Err(e) => {
                debug!(provider = %self.name, error = %e, "Ollama health check failed");
                Availability::Failed(format!("not reachable at {}", self.base_url))
            }
        }
    }

    fn check_authentication(&self) -> AuthStatus {
        AuthStatus::NotApplicable
    }

    async fn complete(&self, request: &LlmRequest) -> LlmResult {
        let model = request.model_name.as_deref().unwrap_or(&self.model);
        let body = ChatRequest {
            model,
            messages: request.messages(),
            stream: false,
            options: ChatOptions {
                temperature: self.options.temperature,
                num_predict: self.options.max_tokens,
            },
        };

        debug!(provider = %self.name, model, base_url = %self.base_url, "Calling Ollama");

        let backoff = self.options.backoff.for_request(request.max_retries);
        match backoff.retry(&self.name, || self.send_once(&body)).await {
            Ok(text) => LlmResult::success(&self.name, model, text),
            Err(e) => LlmResult::failure(&self.name, model, e.to_string()),
        }
    }
}
