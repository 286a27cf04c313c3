//! Anthropic Messages API client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use mcpconv_core::types::{AuthStatus, Availability, LlmRequest, LlmResult};

use crate::backoff::CallError;
use crate::traits::{CallOptions, LlmClient};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    messages: [UserTurn<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserTurn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// Concatenated text blocks.
    fn text(self) -> Option<String> {
        let text: String = self
            .content
            .into_iter()
            .filter(|b| b.kind == "text")
            .filter_map(|b| b.text)
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

/// Client for `POST {base}/messages`.
pub struct AnthropicProvider {
    client: reqwest::Client,
    name: String,
    api_base: String,
    api_key: Option<String>,
    key_hint: String,
    model: String,
    options: CallOptions,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("name", &self.name)
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(
        name: impl Into<String>,
        api_base: impl Into<String>,
        api_key: Option<String>,
        key_hint: impl Into<String>,
        model: impl Into<String>,
        options: CallOptions,
    ) -> Self {
        AnthropicProvider {
            client: reqwest::Client::new(),
            name: name.into(),
            api_base: api_base.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            key_hint: key_hint.into(),
            model: model.into(),
            options,
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.api_base.trim_end_matches('/'))
    }

    async fn send_once(&self, key: &str, body: &MessagesRequest<'_>) -> Result<String, CallError> {
        let response = self
            .client
            .post(self.messages_url())
            .timeout(self.options.timeout)
            .header("x-api-key", key)
            .header("anthropic-version", ANTHROPIC_VERSION)
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
            error!(provider = %self.name, status = %status, body = %error_text, "API error");
            // 529 is Anthropic's "overloaded".
            if status.as_u16() == 529 {
                return Err(CallError::Transient(format!("{status} {error_text}")));
            }
            return Err(CallError::from_status(status, &error_text));
        }

        response
            .json::<MessagesResponse>()
            .await
            .map_err(|e| CallError::from_body(&e))?
            .text()
            .ok_or_else(|| CallError::Fatal("response contained no text block".to_string()))
    }
}

#[async_trait]
impl LlmClient for AnthropicProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn check_availability(&self) -> Availability {
        match reqwest::Url::parse(&self.api_base) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Availability::Ok,
            Ok(url) => Availability::Failed(format!("unsupported URL scheme '{}'", url.scheme())),
            Err(e) => Availability::Failed(format!("invalid API base '{}': {e}", self.api_base)),
        }
    }

    fn check_authentication(&self) -> AuthStatus {
        if self.api_key.is_some() {
            AuthStatus::Ok
        } else {
            AuthStatus::Failed(self.key_hint.clone())
        }
    }

    async fn complete(&self, request: &LlmRequest) -> LlmResult {
        let model = request.model_name.as_deref().unwrap_or(&self.model);
        let Some(key) = self.api_key.as_deref() else {
            return LlmResult::failure(&self.name, model, format!("no API key: {}", self.key_hint));
        };

        let body = MessagesRequest {
            model,
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
            system: &request.system_prompt,
            messages: [UserTurn {
                role: "user",
                content: &request.user_prompt,
            }],
        };

        debug!(provider = %self.name, model, "Calling Anthropic Messages API");

        let backoff = self.options.backoff.for_request(request.max_retries);
        match backoff.retry(&self.name, || self.send_once(key, &body)).await {
            Ok(text) => LlmResult::success(&self.name, model, text),
            Err(e) => LlmResult::failure(&self.name, model, e.to_string()),
        }
    }
}
