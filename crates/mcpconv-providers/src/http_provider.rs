//! Generic client for OpenAI-compatible `/chat/completions` APIs.
//!
//! Covers OpenAI, DeepSeek, Gemini (OpenAI endpoint), SambaNova, OpenRouter,
//! Z.AI, Perplexity, Mistral, and custom endpoints such as vLLM or LM Studio.

use async_trait::async_trait;
use tracing::{debug, error};

use mcpconv_core::types::{
    AuthStatus, Availability, ChatCompletionRequest, ChatCompletionResponse, LlmRequest,
    LlmResult,
};

use crate::backoff::CallError;
use crate::traits::{CallOptions, LlmClient};

/// A client for any OpenAI-compatible HTTP API.
pub struct HttpProvider {
    /// HTTP client (connection-pooled).
    client: reqwest::Client,
    name: String,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    api_key: Option<String>,
    /// Shown when the key is missing. `None` means the endpoint needs no key.
    key_hint: Option<String>,
    model: String,
    options: CallOptions,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("name", &self.name)
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("has_key", &self.api_key.is_some())
            .finish()
    }
}

impl HttpProvider {
    pub fn new(
        name: impl Into<String>,
        api_base: impl Into<String>,
        api_key: Option<String>,
        key_hint: Option<String>,
        model: impl Into<String>,
        options: CallOptions,
    ) -> Self {
        HttpProvider {
            client: reqwest::Client::new(),
            name: name.into(),
            api_base: api_base.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            key_hint,
            model: model.into(),
            options,
        }
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }

    async fn send_once(&self, body: &ChatCompletionRequest) -> Result<String, CallError> {
        let mut request = self
            .client
            .post(self.completions_url())
            .timeout(self.options.timeout)
            .json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            error!(provider = %self.name, error = %e, "HTTP request failed");
            CallError::from_reqwest(&e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(
                provider = %self.name,
                status = %status,
                body = %error_text,
                "API error"
            );
            return Err(CallError::from_status(status, &error_text));
        }

        let parsed = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| CallError::from_body(&e))?;

        parsed
            .first_content()
            .ok_or_else(|| CallError::Fatal("response contained no message content".to_string()))
    }
}

#[async_trait]
impl LlmClient for HttpProvider {
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
        match (&self.api_key, &self.key_hint) {
            (Some(_), _) => AuthStatus::Ok,
            (None, Some(hint)) => AuthStatus::Failed(hint.clone()),
            (None, None) => AuthStatus::NotApplicable,
        }
    }

    async fn complete(&self, request: &LlmRequest) -> LlmResult {
        let model = request.model_name.clone().unwrap_or_else(|| self.model.clone());

        if let (None, Some(hint)) = (&self.api_key, &self.key_hint) {
            return LlmResult::failure(&self.name, &model, format!("no API key: {hint}"));
        }

        let body = ChatCompletionRequest {
            model: model.clone(),
            messages: request.messages(),
            max_tokens: Some(self.options.max_tokens),
            temperature: Some(self.options.temperature),
        };

        debug!(provider = %self.name, model = %model, url = %self.completions_url(), "Calling LLM");

        let backoff = self.options.backoff.for_request(request.max_retries);
        match backoff.retry(&self.name, || self.send_once(&body)).await {
            Ok(text) => {
                debug!(provider = %self.name, chars = text.len(), "LLM response received");
                LlmResult::success(&self.name, &model, text)
            }
            Err(e) => LlmResult::failure(&self.name, &model, e.to_string()),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backoff::Backoff;
    use crate::test_support::{fast_options, stalled_body_server};
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn options() -> CallOptions {
        CallOptions {
            max_tokens: 512,
            temperature: 0.0,
            timeout: Duration::from_secs(5),
            backoff: Backoff {
                max_retries: 2,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
            },
        }
    }

    fn provider(base: &str, key: Option<&str>) -> HttpProvider {
        HttpProvider::new(
            "openai",
            base,
            key.map(String::from),
            Some("OPENAI_API_KEY not set".to_string()),
            "gpt-4o-mini",
            options(),
        )
    }

    fn ok_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-test",
            "choices": [{"message": {"content": content}, "finish_reason": "stop"}]
        })
    }

    #[test]
    fn test_completions_url_trailing_slash() {
        let p = provider("https://api.openai.com/v1/", Some("k"));
        assert_eq!(p.completions_url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_auth_status() {
        assert_eq!(provider("http://x", Some("k")).check_authentication(), AuthStatus::Ok);
        assert!(matches!(
            provider("http://x", None).check_authentication(),
            AuthStatus::Failed(_)
        ));
        let keyless = HttpProvider::new("custom", "http://x", None, None, "m", options());
        assert_eq!(keyless.check_authentication(), AuthStatus::NotApplicable);
    }

    #[tokio::test]
    async fn test_availability_checks_url() {
        assert!(provider("https://api.openai.com/v1", None)
            .check_availability()
            .await
            .is_ok());
        assert!(!provider("not a url", None).check_availability().await.is_ok());
    }

    #[tokio::test]
    async fn test_complete_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key-123"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "max_tokens": 512
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("{\"servers\": {}}")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let p = provider(&mock_server.uri(), Some("test-key-123"));
        let result = p.complete(&LlmRequest::new("system rules", "convert")).await;

        assert!(result.succeeded, "{:?}", result.error_detail);
        assert_eq!(result.raw_text, "{\"servers\": {}}");
        assert_eq!(result.provider_used, "openai");
        assert_eq!(result.model_used, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_complete_model_override() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({"model": "gpt-4o"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("{}")))
            .mount(&mock_server)
            .await;

        let p = provider(&mock_server.uri(), Some("k"));
        let result = p
            .complete(&LlmRequest::new("s", "u").with_model("gpt-4o"))
            .await;
        assert!(result.succeeded);
        assert_eq!(result.model_used, "gpt-4o");
    }

    #[tokio::test]
    async fn test_unauthorized_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let p = provider(&mock_server.uri(), Some("bad"));
        let result = p.complete(&LlmRequest::new("s", "u")).await;
        assert!(!result.succeeded);
        assert!(result.error_detail.unwrap().contains("401"));
    }

    #[tokio::test]
    async fn test_rate_limit_retried_then_succeeds() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("{\"a\": 1}")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let p = provider(&mock_server.uri(), Some("k"));
        let result = p.complete(&LlmRequest::new("s", "u")).await;
        assert!(result.succeeded, "{:?}", result.error_detail);
        assert_eq!(result.raw_text, "{\"a\": 1}");
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&mock_server)
            .await;

        let p = provider(&mock_server.uri(), Some("k"));
        let result = p
            .complete(&LlmRequest::new("s", "u").with_max_retries(1))
            .await;
        assert!(!result.succeeded);
        assert!(result.error_detail.unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let p = provider(&mock_server.uri(), Some("k"));
        let result = p.complete(&LlmRequest::new("s", "u")).await;
        assert!(!result.succeeded);
        assert!(result.error_detail.unwrap().contains("malformed"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("{}")))
            .expect(0)
            .mount(&mock_server)
            .await;

        let p = provider(&mock_server.uri(), None);
        let result = p.complete(&LlmRequest::new("s", "u")).await;
        assert!(!result.succeeded);
        assert!(result.error_detail.unwrap().contains("OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&mock_server)
            .await;

        let p = provider(&mock_server.uri(), Some("k"));
        let result = p.complete(&LlmRequest::new("s", "u")).await;
        assert!(!result.succeeded);
    }

    #[tokio::test]
    async fn test_configured_retry_bound_applies() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&mock_server)
            .await;

        // options() allows 2 retries and the request carries no override.
        let p = provider(&mock_server.uri(), Some("k"));
        let result = p.complete(&LlmRequest::new("s", "u")).await;
        assert!(!result.succeeded);
    }

    #[tokio::test]
    async fn test_slow_response_times_out_and_retries() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(ok_body("{}"))
                    .set_delay(Duration::from_millis(500)),
            )
            .expect(2)
            .mount(&mock_server)
            .await;

        let p = HttpProvider::new(
            "openai",
            mock_server.uri(),
            Some("k".into()),
            None,
            "gpt-4o-mini",
            fast_options(Duration::from_millis(100), 1),
        );
        let result = p.complete(&LlmRequest::new("s", "u")).await;
        assert!(!result.succeeded);
    }

    #[tokio::test]
    async fn test_stalled_body_is_transient() {
        let (base, connections) = stalled_body_server().await;
        let p = HttpProvider::new(
            "openai",
            base,
            Some("k".into()),
            None,
            "gpt-4o-mini",
            fast_options(Duration::from_millis(300), 2),
        );

        let result = p.complete(&LlmRequest::new("s", "u")).await;

        assert!(!result.succeeded);
        assert!(!result.error_detail.unwrap().contains("malformed"));
        assert_eq!(connections.load(Ordering::SeqCst), 3);
    }
}
