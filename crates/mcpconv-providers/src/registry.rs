//! Provider registry: name → client factory, with a cost for auto-selection.
//!
//! Constructed once at startup (usually via [`ProviderRegistry::with_defaults`])
//! and passed by reference to the converter. Read-mostly; registrations are
//! guarded by an `RwLock` that is never held across an `.await`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::{debug, info};

use mcpconv_core::config::{Config, ProviderConfig};
use mcpconv_core::error::ConversionError;
use mcpconv_core::types::{AuthStatus, Availability};

use crate::anthropic_provider::AnthropicProvider;
use crate::catalog::{find_by_name, BackendFamily, BACKENDS};
use crate::http_provider::HttpProvider;
use crate::ollama_provider::OllamaProvider;
use crate::traits::{CallOptions, LlmClient};

/// Builds a fresh client on demand.
pub type ClientFactory = Arc<dyn Fn() -> Arc<dyn LlmClient> + Send + Sync>;

/// Cost reserved for custom providers. Registered providers never go below 1.
pub const CUSTOM_COST: u32 = 0;

/// Name under which a custom provider appears.
pub const CUSTOM_NAME: &str = "custom";

/// One registered backend.
#[derive(Clone)]
pub struct ProviderRegistration {
    pub name: String,
    pub cost: u32,
    pub factory: ClientFactory,
    pub requires_api_key: bool,
    /// Registration order, used to break cost ties.
    seq: u64,
}

impl std::fmt::Debug for ProviderRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistration")
            .field("name", &self.name)
            .field("cost", &self.cost)
            .field("requires_api_key", &self.requires_api_key)
            .finish()
    }
}

impl ProviderRegistration {
    pub fn create_client(&self) -> Arc<dyn LlmClient> {
        (self.factory)()
    }

    pub fn is_custom(&self) -> bool {
        self.cost == CUSTOM_COST
    }
}

/// A user-supplied endpoint, used for a single conversion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CustomProvider {
    pub base_url: String,
    /// `"openai"`, an OpenAI-compatible catalog name, `"anthropic"` or `"ollama"`.
    pub provider_type: String,
    pub model: String,
    pub api_key: Option<String>,
}

/// One row of the provider health report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProviderHealth {
    pub name: String,
    pub model: String,
    pub availability: Availability,
    pub authentication: AuthStatus,
    pub cost: u32,
}

impl ProviderHealth {
    /// Passes both health checks, so auto-selection may pick it.
    pub fn is_eligible(&self) -> bool {
        self.availability.is_ok() && self.authentication.permits_use()
    }
}

/// Process-wide catalog of LLM backends.
pub struct ProviderRegistry {
    entries: RwLock<Vec<ProviderRegistration>>,
    next_seq: AtomicU64,
    options: CallOptions,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        ProviderRegistry::new(CallOptions::default())
    }
}

impl ProviderRegistry {
    /// An empty registry. `options` apply to custom providers it creates.
    pub fn new(options: CallOptions) -> Self {
        ProviderRegistry {
            entries: RwLock::new(Vec::new()),
            next_seq: AtomicU64::new(0),
            options,
        }
    }

    /// A registry holding every built-in backend, configured from `config`.
    pub fn with_defaults(config: &Config) -> Self {
        let options = CallOptions::from_config(&config.llm);
        let registry = ProviderRegistry::new(options.clone());

        for spec in BACKENDS {
            let provider_config = config
                .providers
                .get_by_name(spec.name)
                .cloned()
                .unwrap_or_default();
            let options = options.clone();
            registry.register(
                spec.name,
                spec.cost,
                Arc::new(move || spec.create_client(&provider_config, &options)),
                spec.requires_api_key(),
            );
        }

        debug!(count = BACKENDS.len(), "Registered built-in providers");
        registry
    }

    /// Add or replace the registration for `name`.
    ///
    /// A replacement keeps its original position for tie-breaking. Costs
    /// below 1 are raised to 1; 0 is reserved for custom providers.
    pub fn register(
        &self,
        name: impl Into<String>,
        cost: u32,
        factory: ClientFactory,
        requires_api_key: bool,
    ) {
        let name = name.into();
        let cost = cost.max(CUSTOM_COST + 1);
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(existing) = entries.iter_mut().find(|e| e.name == name) {
            debug!(provider = %name, cost, "Replacing provider registration");
            existing.cost = cost;
            existing.factory = factory;
            existing.requires_api_key = requires_api_key;
            return;
        }

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        entries.push(ProviderRegistration {
            name,
            cost,
            factory,
            requires_api_key,
            seq,
        });
    }

    /// Look up a registration by name.
    pub fn get(&self, name: &str) -> Result<ProviderRegistration, ConversionError> {
        self.read()
            .iter()
            .find(|e| e.name == name)
            .cloned()
            .ok_or_else(|| ConversionError::UnknownProvider(name.to_string()))
    }

    /// All registrations, cheapest first; ties keep registration order.
    pub fn list_all(&self) -> Vec<ProviderRegistration> {
        let mut all = self.read().clone();
        all.sort_by_key(|e| (e.cost, e.seq));
        all
    }

    pub fn names(&self) -> Vec<String> {
        self.list_all().into_iter().map(|e| e.name).collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<ProviderRegistration>> {
        match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Build a one-off registration for a user-supplied endpoint.
    ///
    /// The registry itself is not modified; the caller hands the result to
    /// the converter for one conversion.
    pub fn create_custom(
        &self,
        custom: &CustomProvider,
    ) -> Result<ProviderRegistration, ConversionError> {
        let kind = custom.provider_type.trim().to_lowercase();
        let family = custom_family(&kind).ok_or_else(|| ConversionError::UnsupportedProviderType {
            provider_type: custom.provider_type.clone(),
            supported: supported_custom_types(),
        })?;

        // Fall back to the matching backend's env vars for the key.
        let catalog_spec = find_by_name(&kind);
        let api_key = custom
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| catalog_spec.and_then(|s| s.resolve_api_key(&ProviderConfig::default())));
        let model = if custom.model.trim().is_empty() {
            catalog_spec
                .map(|s| s.default_model.to_string())
                .unwrap_or_default()
        } else {
            custom.model.clone()
        };
        let base_url = custom.base_url.clone();
        let options = self.options.clone();

        info!(provider_type = %kind, base_url = %base_url, model = %model, "Using custom provider");

        let requires_api_key = family == BackendFamily::Anthropic;
        let factory: ClientFactory = match family {
            BackendFamily::OpenAiCompatible => Arc::new(move || {
                Arc::new(HttpProvider::new(
                    CUSTOM_NAME,
                    base_url.clone(),
                    api_key.clone(),
                    None,
                    model.clone(),
                    options.clone(),
                )) as Arc<dyn LlmClient>
            }),
            BackendFamily::Anthropic => Arc::new(move || {
                Arc::new(AnthropicProvider::new(
                    CUSTOM_NAME,
                    base_url.clone(),
                    api_key.clone(),
                    "no API key given for the custom provider",
                    model.clone(),
                    options.clone(),
                )) as Arc<dyn LlmClient>
            }),
            BackendFamily::Ollama => Arc::new(move || {
                Arc::new(OllamaProvider::new(
                    CUSTOM_NAME,
                    &base_url,
                    model.clone(),
                    options.clone(),
                )) as Arc<dyn LlmClient>
            }),
        };

        Ok(ProviderRegistration {
            name: CUSTOM_NAME.to_string(),
            cost: CUSTOM_COST,
            factory,
            requires_api_key,
            seq: 0,
        })
    }

    /// Check every registered provider (and `custom`, if given).
    ///
    /// Rows are sorted by cost, so the first eligible row is what
    /// auto-selection would pick.
    pub async fn enumerate(&self, custom: Option<&ProviderRegistration>) -> Vec<ProviderHealth> {
        let mut registrations: Vec<ProviderRegistration> = custom.into_iter().cloned().collect();
        registrations.extend(self.list_all());

        let mut rows = Vec::with_capacity(registrations.len());
        for registration in registrations {
            let client = registration.create_client();
            let availability = client.check_availability().await;
            let authentication = client.check_authentication();
            debug!(
                provider = %registration.name,
                availability = %availability,
                authentication = %authentication,
                "Checked provider"
            );
            rows.push(ProviderHealth {
                name: registration.name.clone(),
                model: client.model().to_string(),
                availability,
                authentication,
                cost: registration.cost,
            });
        }
        // Stable sort keeps registration order among equal costs.
        rows.sort_by_key(|r| r.cost);
        rows
    }
}

fn custom_family(kind: &str) -> Option<BackendFamily> {
    match kind {
        "openai" | "openai-compatible" => Some(BackendFamily::OpenAiCompatible),
        other => find_by_name(other).map(|spec| spec.family),
    }
}

fn supported_custom_types() -> Vec<String> {
    let mut types = vec!["openai-compatible".to_string()];
    types.extend(BACKENDS.iter().map(|s| s.name.to_string()));
    types
}
