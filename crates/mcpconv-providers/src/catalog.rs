//! Built-in backend catalog.
//!
//! Each `BackendSpec` describes how to reach one LLM service: its API family,
//! where its credential lives, its default endpoint and model, and its relative
//! cost for auto-selection (lower is preferred).

use std::sync::Arc;

use mcpconv_core::config::ProviderConfig;
use mcpconv_core::utils::first_env;

use crate::anthropic_provider::AnthropicProvider;
use crate::http_provider::HttpProvider;
use crate::ollama_provider::OllamaProvider;
use crate::traits::{CallOptions, LlmClient};

/// Wire protocol a backend speaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendFamily {
    /// `POST {base}/chat/completions` with Bearer auth.
    OpenAiCompatible,
    /// Anthropic Messages API.
    Anthropic,
    /// Local Ollama runtime, no credential.
    Ollama,
}

/// Static description of one built-in backend.
#[derive(Clone, Debug)]
pub struct BackendSpec {
    /// Registry name (e.g. `"openrouter"`).
    pub name: &'static str,
    /// Human-readable name for logs.
    pub display_name: &'static str,
    pub family: BackendFamily,
    /// Credential env vars, checked in order; the first non-blank one wins.
    pub env_keys: &'static [&'static str],
    /// Env var that overrides the default API base.
    pub base_url_env: Option<&'static str>,
    pub default_api_base: &'static str,
    pub default_model: &'static str,
    /// Relative cost, lower is preferred.
    pub cost: u32,
}

/// All built-in backends, cheapest first.
pub static BACKENDS: &[BackendSpec] = &[
    BackendSpec {
        name: "ollama",
        display_name: "Ollama",
        family: BackendFamily::Ollama,
        env_keys: &[],
        base_url_env: Some("OLLAMA_HOST"),
        default_api_base: "http://localhost:11434",
        default_model: "llama3.2",
        cost: 1,
    },
    BackendSpec {
        name: "deepseek",
        display_name: "DeepSeek",
        family: BackendFamily::OpenAiCompatible,
        env_keys: &["DEEPSEEK_API_KEY"],
        base_url_env: None,
        default_api_base: "https://api.deepseek.com/v1",
        default_model: "deepseek-chat",
        cost: 8,
    },
    BackendSpec {
        name: "gemini",
        display_name: "Gemini",
        family: BackendFamily::OpenAiCompatible,
        env_keys: &["GEMINI_API_KEY", "GOOGLE_API_KEY", "GOOGLE_GENERATIVE_AI_API_KEY"],
        base_url_env: None,
        default_api_base: "https://generativelanguage.googleapis.com/v1beta/openai",
        default_model: "gemini-2.5-flash",
        cost: 12,
    },
    BackendSpec {
        name: "openai",
        display_name: "OpenAI",
        family: BackendFamily::OpenAiCompatible,
        env_keys: &["OPENAI_API_KEY"],
        base_url_env: None,
        default_api_base: "https://api.openai.com/v1",
        default_model: "gpt-4o-mini",
        cost: 15,
    },
    BackendSpec {
        name: "sambanova",
        display_name: "SambaNova",
        family: BackendFamily::OpenAiCompatible,
        env_keys: &["SAMBANOVA_API_KEY"],
        base_url_env: Some("SAMBANOVA_API_BASE_URL"),
        default_api_base: "https://api.sambanova.ai/v1",
        default_model: "gpt-oss-120b",
        cost: 16,
    },
    BackendSpec {
        name: "openrouter",
        display_name: "OpenRouter",
        family: BackendFamily::OpenAiCompatible,
        env_keys: &["OPENROUTER_API_KEY"],
        base_url_env: None,
        default_api_base: "https://openrouter.ai/api/v1",
        default_model: "openai/gpt-4o-mini",
        cost: 17,
    },
    BackendSpec {
        name: "zai",
        display_name: "Z.AI",
        family: BackendFamily::OpenAiCompatible,
        env_keys: &["ZAI_API_KEY"],
        base_url_env: Some("ZAI_API_BASE_URL"),
        default_api_base: "https://api.z.ai/api/paas/v4",
        default_model: "glm-4.7",
        cost: 18,
    },
    BackendSpec {
        name: "perplexity",
        display_name: "Perplexity",
        family: BackendFamily::OpenAiCompatible,
        env_keys: &["PERPLEXITY_API_KEY"],
        base_url_env: None,
        default_api_base: "https://api.perplexity.ai",
        default_model: "sonar",
        cost: 20,
    },
    BackendSpec {
        name: "mistral",
        display_name: "Mistral",
        family: BackendFamily::OpenAiCompatible,
        env_keys: &["MISTRAL_API_KEY"],
        base_url_env: None,
        default_api_base: "https://api.mistral.ai/v1",
        default_model: "mistral-medium-latest",
        cost: 25,
    },
    BackendSpec {
        name: "anthropic",
        display_name: "Anthropic",
        family: BackendFamily::Anthropic,
        env_keys: &["ANTHROPIC_API_KEY"],
        base_url_env: None,
        default_api_base: "https://api.anthropic.com/v1",
        default_model: "claude-3-5-sonnet-20241022",
        cost: 30,
    },
];

/// Find a backend spec by name.
pub fn find_by_name(name: &str) -> Option<&'static BackendSpec> {
    BACKENDS.iter().find(|s| s.name == name)
}

impl BackendSpec {
    pub fn requires_api_key(&self) -> bool {
        !self.env_keys.is_empty()
    }

    /// API key: config file first, then the documented env vars.
    pub fn resolve_api_key(&self, config: &ProviderConfig) -> Option<String> {
        if config.is_configured() {
            return Some(config.api_key.trim().to_string());
        }
        first_env(self.env_keys).map(|(_, value)| value)
    }

    /// API base: config file, then the base-URL env var, then the default.
    pub fn resolve_api_base(&self, config: &ProviderConfig) -> String {
        config
            .api_base
            .clone()
            .filter(|b| !b.trim().is_empty())
            .or_else(|| self.base_url_env.and_then(|key| first_env(&[key]).map(|(_, v)| v)))
            .unwrap_or_else(|| self.default_api_base.to_string())
    }

    pub fn resolve_model(&self, config: &ProviderConfig) -> String {
        config
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.default_model.to_string())
    }

    /// Where the user should put a missing credential.
    pub fn key_hint(&self) -> String {
        format!(
            "{} not set (or providers.{}.apiKey in config)",
            self.env_keys.join(" / "),
            self.name
        )
    }

    /// Build a live client for this backend.
    pub fn create_client(
        &'static self,
        config: &ProviderConfig,
        options: &CallOptions,
    ) -> Arc<dyn LlmClient> {
        let api_base = self.resolve_api_base(config);
        let model = self.resolve_model(config);
        match self.family {
            BackendFamily::OpenAiCompatible => Arc::new(HttpProvider::new(
                self.name,
                api_base,
                self.resolve_api_key(config),
                Some(self.key_hint()),
                model,
                options.clone(),
            )),
            BackendFamily::Anthropic => Arc::new(AnthropicProvider::new(
                self.name,
                api_base,
                self.resolve_api_key(config),
                self.key_hint(),
                model,
                options.clone(),
            )),
            BackendFamily::Ollama => Arc::new(OllamaProvider::new(
                self.name,
                &api_base,
                model,
                options.clone(),
            )),
        }
    }
}
