//! Config loader: reads `~/.mcpconv/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.mcpconv/config.json`
//! 3. Environment variables `MCPCONV_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::schema::{Config, ProviderConfig, ProvidersConfig};

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from `path` (or the default path) plus env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    load_config_from_path(&config_path)
}

fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `MCPCONV_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `MCPCONV_LLM__PREFERRED_PROVIDER` → `llm.preferred_provider`
/// - `MCPCONV_LLM__MAX_ATTEMPTS` → `llm.max_attempts`
/// - `MCPCONV_LLM__FAILOVER` → `llm.failover`
/// - `MCPCONV_LLM__REQUEST_TIMEOUT_SECS` → `llm.request_timeout_secs`
/// - `MCPCONV_LLM__MAX_TOKENS` → `llm.max_tokens`
/// - `MCPCONV_LLM__TEMPERATURE` → `llm.temperature`
/// - `MCPCONV_LLM__RETRY__MAX_RETRIES` → `llm.retry.max_retries`
/// - `MCPCONV_PROVIDERS__<NAME>__API_KEY` / `__API_BASE` / `__MODEL`
/// - `MCPCONV_OUTPUT__ACTION` → `output.action`
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("MCPCONV_LLM__PREFERRED_PROVIDER") {
        config.llm.preferred_provider = val;
    }
    if let Some(n) = env_parse::<u32>("MCPCONV_LLM__MAX_ATTEMPTS") {
        config.llm.max_attempts = n;
    }
    if let Ok(val) = std::env::var("MCPCONV_LLM__FAILOVER") {
        config.llm.failover = val == "true" || val == "1";
    }
    if let Some(n) = env_parse::<u64>("MCPCONV_LLM__REQUEST_TIMEOUT_SECS") {
        config.llm.request_timeout_secs = n;
    }
    if let Some(n) = env_parse::<u32>("MCPCONV_LLM__MAX_TOKENS") {
        config.llm.max_tokens = n;
    }
    if let Some(t) = env_parse::<f64>("MCPCONV_LLM__TEMPERATURE") {
        config.llm.temperature = t;
    }
    if let Some(n) = env_parse::<u32>("MCPCONV_LLM__RETRY__MAX_RETRIES") {
        config.llm.retry.max_retries = n;
    }

    for name in ProvidersConfig::names() {
        if let Some(provider) = config.providers.get_by_name_mut(name) {
            apply_provider_env(provider, &name.to_uppercase());
        }
    }

    if let Ok(val) = std::env::var("MCPCONV_OUTPUT__ACTION") {
        match val.parse() {
            Ok(action) => config.output.action = action,
            Err(e) => warn!("Ignoring MCPCONV_OUTPUT__ACTION: {}", e),
        }
    }

    config
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn apply_provider_env(provider: &mut ProviderConfig, name: &str) {
    if let Ok(val) = std::env::var(format!("MCPCONV_PROVIDERS__{name}__API_KEY")) {
        provider.api_key = val;
    }
    if let Ok(val) = std::env::var(format!("MCPCONV_PROVIDERS__{name}__API_BASE")) {
        provider.api_base = Some(val);
    }
    if let Ok(val) = std::env::var(format!("MCPCONV_PROVIDERS__{name}__MODEL")) {
        provider.model = Some(val);
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
