//! Configuration schema.
//!
//! Hierarchy: `Config` → `LlmConfig`, `ProvidersConfig`, `OutputConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Root configuration, loaded from `~/.mcpconv/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub llm: LlmConfig,
    pub providers: ProvidersConfig,
    pub output: OutputConfig,
}

// ─────────────────────────────────────────────
// LLM
// ─────────────────────────────────────────────

/// Provider selection and call limits.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmConfig {
    /// `"auto"` or a registered provider name.
    pub preferred_provider: String,
    /// Total LLM calls allowed for one conversion, across all providers.
    pub max_attempts: u32,
    /// Move on to the next eligible provider when a call fails (auto mode only).
    pub failover: bool,
    /// Per-call HTTP timeout.
    pub request_timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f64,
    pub retry: RetryConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            preferred_provider: "auto".to_string(),
            max_attempts: 3,
            failover: true,
            request_timeout_secs: 120,
            max_tokens: 4096,
            temperature: 0.0,
            retry: RetryConfig::default(),
        }
    }
}

impl LlmConfig {
    /// Explicit provider name, or `None` for auto-selection.
    pub fn explicit_provider(&self) -> Option<&str> {
        let name = self.preferred_provider.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("auto") {
            None
        } else {
            Some(name)
        }
    }
}

/// Backoff for transient failures inside a single client call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 30_000,
        }
    }
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Settings for a single LLM backend. Empty fields fall back to the
/// backend's documented env vars and defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ProviderConfig {
    /// Whether an API key is set in the config file itself.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// One `ProviderConfig` per catalog backend.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    pub ollama: ProviderConfig,
    pub deepseek: ProviderConfig,
    pub gemini: ProviderConfig,
    pub openai: ProviderConfig,
    pub sambanova: ProviderConfig,
    pub openrouter: ProviderConfig,
    pub zai: ProviderConfig,
    pub perplexity: ProviderConfig,
    pub mistral: ProviderConfig,
    pub anthropic: ProviderConfig,
}

impl ProvidersConfig {
    fn entries(&self) -> [(&'static str, &ProviderConfig); 10] {
        [
            ("ollama", &self.ollama),
            ("deepseek", &self.deepseek),
            ("gemini", &self.gemini),
            ("openai", &self.openai),
            ("sambanova", &self.sambanova),
            ("openrouter", &self.openrouter),
            ("zai", &self.zai),
            ("perplexity", &self.perplexity),
            ("mistral", &self.mistral),
            ("anthropic", &self.anthropic),
        ]
    }

    /// Get a provider config by name (e.g. `"anthropic"`).
    pub fn get_by_name(&self, name: &str) -> Option<&ProviderConfig> {
        self.entries()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, c)| c)
    }

    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut ProviderConfig> {
        match name {
            "ollama" => Some(&mut self.ollama),
            "deepseek" => Some(&mut self.deepseek),
            "gemini" => Some(&mut self.gemini),
            "openai" => Some(&mut self.openai),
            "sambanova" => Some(&mut self.sambanova),
            "openrouter" => Some(&mut self.openrouter),
            "zai" => Some(&mut self.zai),
            "perplexity" => Some(&mut self.perplexity),
            "mistral" => Some(&mut self.mistral),
            "anthropic" => Some(&mut self.anthropic),
            _ => None,
        }
    }

    pub fn names() -> [&'static str; 10] {
        Self::default().entries().map(|(name, _)| name)
    }
}

// ─────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────

/// What to do when the output file already exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputAction {
    #[default]
    Overwrite,
    Skip,
    Merge,
}

impl fmt::Display for OutputAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputAction::Overwrite => "overwrite",
            OutputAction::Skip => "skip",
            OutputAction::Merge => "merge",
        })
    }
}

impl FromStr for OutputAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overwrite" => Ok(OutputAction::Overwrite),
            "skip" => Ok(OutputAction::Skip),
            "merge" => Ok(OutputAction::Merge),
            other => Err(format!(
                "unknown output action '{other}' (expected overwrite, skip or merge)"
            )),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputConfig {
    pub action: OutputAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.llm.preferred_provider, "auto");
        assert_eq!(config.llm.max_attempts, 3);
        assert!(config.llm.failover);
        assert_eq!(config.llm.retry.initial_delay_ms, 1000);
        assert_eq!(config.output.action, OutputAction::Overwrite);
    }

    #[test]
    fn test_explicit_provider() {
        let mut llm = LlmConfig::default();
        assert_eq!(llm.explicit_provider(), None);
        llm.preferred_provider = "AUTO".into();
        assert_eq!(llm.explicit_provider(), None);
        llm.preferred_provider = "openai".into();
        assert_eq!(llm.explicit_provider(), Some("openai"));
    }

    #[test]
    fn test_get_by_name() {
        let mut providers = ProvidersConfig::default();
        providers.zai.api_key = "zk".into();
        assert!(providers.get_by_name("zai").unwrap().is_configured());
        assert!(!providers.get_by_name("openai").unwrap().is_configured());
        assert!(providers.get_by_name("groq").is_none());
        for name in ProvidersConfig::names() {
            assert!(providers.get_by_name(name).is_some(), "{name}");
        }
    }

    #[test]
    fn test_output_action_parse() {
        assert_eq!("Merge".parse::<OutputAction>().unwrap(), OutputAction::Merge);
        assert!("replace".parse::<OutputAction>().is_err());
        let json = serde_json::to_string(&OutputAction::Skip).unwrap();
        assert_eq!(json, "\"skip\"");
    }

    #[test]
    fn test_camel_case_deserialize() {
        let config: Config = serde_json::from_str(
            r#"{"llm": {"preferredProvider": "ollama", "maxAttempts": 2, "retry": {"maxRetries": 0}},
                "providers": {"ollama": {"apiBase": "http://gpu:11434", "model": "qwen2.5"}}}"#,
        )
        .unwrap();
        assert_eq!(config.llm.explicit_provider(), Some("ollama"));
        assert_eq!(config.llm.max_attempts, 2);
        assert_eq!(config.llm.retry.max_retries, 0);
        assert_eq!(config.llm.retry.max_delay_ms, 30_000);
        assert_eq!(config.providers.ollama.model.as_deref(), Some("qwen2.5"));
    }
}
