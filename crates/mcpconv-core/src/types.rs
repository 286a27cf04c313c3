//! Core types shared by the providers and the converter.
//!
//! The request/result pair is what crosses the LLM client boundary; the wire
//! types model the OpenAI chat completions format used by most backends.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConversionFailure;
use crate::format::OutputFormat;

// ─────────────────────────────────────────────
// Messages (OpenAI chat completions format)
// ─────────────────────────────────────────────

/// A chat message. Conversion prompts only ever need system + user turns.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role")]
pub enum Message {
    #[serde(rename = "system")]
    System { content: String },

    #[serde(rename = "user")]
    User { content: String },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }
}

/// Request body for an OpenAI-compatible chat completion API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Raw chat completion response from an OpenAI-compatible API.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if the backend returned any.
    pub fn first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
    }
}

// ─────────────────────────────────────────────
// LLM request / result
// ─────────────────────────────────────────────

/// One model call. Built per conversion attempt and never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct LlmRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    /// Model override; `None` uses the client's configured model.
    pub model_name: Option<String>,
    /// Override for the client's transient-failure retry bound. `None`
    /// keeps the bound configured under `llm.retry`.
    pub max_retries: Option<u32>,
}

impl LlmRequest {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            model_name: None,
            max_retries: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_name = Some(model.into());
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Messages in chat-completions order.
    pub fn messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(2);
        if !self.system_prompt.is_empty() {
            messages.push(Message::system(self.system_prompt.clone()));
        }
        messages.push(Message::user(self.user_prompt.clone()));
        messages
    }
}

/// Result of exactly one `complete` call.
///
/// Expected failures (auth, exhausted rate limits, malformed responses) are
/// reported here with `succeeded = false` instead of as an `Err`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LlmResult {
    pub raw_text: String,
    pub provider_used: String,
    pub model_used: String,
    pub succeeded: bool,
    pub error_detail: Option<String>,
}

impl LlmResult {
    pub fn success(
        provider: impl Into<String>,
        model: impl Into<String>,
        raw_text: impl Into<String>,
    ) -> Self {
        LlmResult {
            raw_text: raw_text.into(),
            provider_used: provider.into(),
            model_used: model.into(),
            succeeded: true,
            error_detail: None,
        }
    }

    pub fn failure(
        provider: impl Into<String>,
        model: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        LlmResult {
            raw_text: String::new(),
            provider_used: provider.into(),
            model_used: model.into(),
            succeeded: false,
            error_detail: Some(detail.into()),
        }
    }
}

// ─────────────────────────────────────────────
// Provider health checks
// ─────────────────────────────────────────────

/// Outcome of an availability check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Availability {
    Ok,
    Failed(String),
}

impl Availability {
    pub fn is_ok(&self) -> bool {
        matches!(self, Availability::Ok)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Ok => f.write_str("ok"),
            Availability::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

/// Outcome of an authentication check. Local runtimes need no credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum AuthStatus {
    Ok,
    Failed(String),
    NotApplicable,
}

impl AuthStatus {
    /// Whether the provider may be used (`Ok` or `NotApplicable`).
    pub fn permits_use(&self) -> bool {
        !matches!(self, AuthStatus::Failed(_))
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthStatus::Ok => f.write_str("ok"),
            AuthStatus::Failed(reason) => write!(f, "failed ({reason})"),
            AuthStatus::NotApplicable => f.write_str("n/a"),
        }
    }
}

// ─────────────────────────────────────────────
// Conversion outcome
// ─────────────────────────────────────────────

/// What happened on a single orchestrator attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "detail", rename_all = "snake_case")]
pub enum AttemptResult {
    Accepted,
    CallFailed(String),
    Rejected(String),
}

/// One entry in the attempt trail of a conversion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    pub attempt: u32,
    pub provider: String,
    pub model: String,
    #[serde(flatten)]
    pub result: AttemptResult,
}

/// A validated conversion result.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConvertedConfig {
    pub output_text: String,
    pub format: OutputFormat,
    pub target: String,
    pub provider_used: String,
    pub model_used: String,
    pub attempts: u32,
    pub trail: Vec<AttemptRecord>,
}

/// Terminal artifact of a conversion: valid target text or a structured error.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConversionOutcome {
    Succeeded(ConvertedConfig),
    Failed {
        error: ConversionFailure,
        attempts: u32,
        trail: Vec<AttemptRecord>,
    },
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Succeeded(_))
    }

    /// Number of LLM calls made for this conversion.
    pub fn attempts(&self) -> u32 {
        match self {
            ConversionOutcome::Succeeded(c) => c.attempts,
            ConversionOutcome::Failed { attempts, .. } => *attempts,
        }
    }

    pub fn output_text(&self) -> Option<&str> {
        match self {
            ConversionOutcome::Succeeded(c) => Some(&c.output_text),
            ConversionOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ConversionFailure> {
        match self {
            ConversionOutcome::Succeeded(_) => None,
            ConversionOutcome::Failed { error, .. } => Some(error),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_messages_order() {
        let req = LlmRequest::new("You convert configs.", "Convert this");
        let json = serde_json::to_value(req.messages()).unwrap();
        assert_eq!(json[0]["role"], "system");
        assert_eq!(json[0]["content"], "You convert configs.");
        assert_eq!(json[1]["role"], "user");
        assert_eq!(json[1]["content"], "Convert this");
    }

    #[test]
    fn test_messages_skip_empty_system() {
        let req = LlmRequest::new("", "hi");
        assert_eq!(req.messages(), vec![Message::user("hi")]);
    }

    #[test]
    fn test_request_builders() {
        let req = LlmRequest::new("s", "u").with_model("gpt-4o").with_max_retries(1);
        assert_eq!(req.model_name.as_deref(), Some("gpt-4o"));
        assert_eq!(req.max_retries, Some(1));
        assert_eq!(LlmRequest::new("s", "u").max_retries, None);
    }

    #[test]
    fn test_chat_response_first_content() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [{"message": {"content": "{}"}, "finish_reason": "stop"}]
        }))
        .unwrap();
        assert_eq!(resp.first_content().as_deref(), Some("{}"));

        let empty: ChatCompletionResponse =
            serde_json::from_value(json!({"id": null, "choices": []})).unwrap();
        assert!(empty.first_content().is_none());
    }

    #[test]
    fn test_llm_result_constructors() {
        let ok = LlmResult::success("openai", "gpt-4o-mini", "{}");
        assert!(ok.succeeded);
        assert!(ok.error_detail.is_none());

        let failed = LlmResult::failure("openai", "gpt-4o-mini", "401 Unauthorized");
        assert!(!failed.succeeded);
        assert!(failed.raw_text.is_empty());
        assert_eq!(failed.error_detail.as_deref(), Some("401 Unauthorized"));
    }

    #[test]
    fn test_auth_status_permits_use() {
        assert!(AuthStatus::Ok.permits_use());
        assert!(AuthStatus::NotApplicable.permits_use());
        assert!(!AuthStatus::Failed("missing key".into()).permits_use());
    }

    #[test]
    fn test_health_status_display() {
        assert_eq!(Availability::Ok.to_string(), "ok");
        assert_eq!(AuthStatus::NotApplicable.to_string(), "n/a");
        assert_eq!(
            Availability::Failed("connection refused".into()).to_string(),
            "failed (connection refused)"
        );
    }
}
