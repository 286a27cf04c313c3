//! Conversion orchestrator.
//!
//! One conversion runs a strictly sequential pipeline: resolve the target
//! spec, select a provider, build the prompt, then call and validate until the
//! output is accepted or the attempt budget is spent. Every expected failure
//! is folded into a [`ConversionOutcome::Failed`]; the caller never sees
//! partially valid text.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, info, info_span, warn, Instrument};

use mcpconv_core::config::LlmConfig;
use mcpconv_core::error::{ConversionError, ProviderRejection};
use mcpconv_core::prompt::build_prompt;
use mcpconv_core::specs::{ProviderSpec, SpecRegistry};
use mcpconv_core::types::{
    AttemptRecord, AttemptResult, ConversionOutcome, ConvertedConfig, LlmRequest,
};
use mcpconv_core::validate::validate_output;
use mcpconv_core::InputDocument;
use mcpconv_providers::registry::CUSTOM_NAME;
use mcpconv_providers::{CustomProvider, LlmClient, ProviderRegistration, ProviderRegistry};

/// How the provider for a conversion is chosen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderChoice {
    /// Cheapest provider that passes availability and authentication.
    Auto,
    /// This provider or nothing.
    Named(String),
}

impl ProviderChoice {
    /// `"auto"` (any case) or blank means [`ProviderChoice::Auto`].
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("auto") {
            ProviderChoice::Auto
        } else {
            ProviderChoice::Named(value.to_lowercase())
        }
    }
}

/// One conversion to perform.
#[derive(Clone, Debug)]
pub struct ConversionRequest {
    pub input: InputDocument,
    /// Target name or alias (e.g. `"claude"`, `"vibe"`).
    pub target: String,
    pub provider: ProviderChoice,
    /// Endpoint supplied for this conversion only. Preferred over every
    /// registered provider in auto mode; selectable as `"custom"`.
    pub custom: Option<CustomProvider>,
    /// Model sent to whichever provider is selected, instead of its default.
    pub model: Option<String>,
    /// Per-call retry bound override; `None` keeps `llm.retry.maxRetries`.
    pub max_retries: Option<u32>,
}

impl ConversionRequest {
    pub fn new(input: InputDocument, target: impl Into<String>) -> Self {
        ConversionRequest {
            input,
            target: target.into(),
            provider: ProviderChoice::Auto,
            custom: None,
            model: None,
            max_retries: None,
        }
    }

    pub fn with_provider(mut self, provider: ProviderChoice) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_custom(mut self, custom: CustomProvider) -> Self {
        self.custom = Some(custom);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

/// Limits applied to every conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConverterSettings {
    /// Total LLM calls per conversion, across providers. At least 1.
    pub max_attempts: u32,
    /// In auto mode, move to the next eligible provider after a failed call.
    pub failover: bool,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        ConverterSettings::from_config(&LlmConfig::default())
    }
}

impl ConverterSettings {
    pub fn from_config(config: &LlmConfig) -> Self {
        ConverterSettings {
            max_attempts: config.max_attempts.max(1),
            failover: config.failover,
        }
    }
}

/// A provider picked for use, with its live client.
struct Selected {
    name: String,
    client: Arc<dyn LlmClient>,
}

/// Walks cost-ordered candidates, probing each one, and remembers why
/// rejected providers were skipped.
struct AutoSelector {
    queue: VecDeque<ProviderRegistration>,
    rejected: Vec<ProviderRejection>,
}

impl AutoSelector {
    fn new(custom: Option<ProviderRegistration>, registry: &ProviderRegistry) -> Self {
        let mut queue: VecDeque<_> = custom.into_iter().collect();
        queue.extend(registry.list_all());
        AutoSelector {
            queue,
            rejected: Vec::new(),
        }
    }

    async fn next_eligible(&mut self) -> Option<Selected> {
        while let Some(registration) = self.queue.pop_front() {
            let client = registration.create_client();
            match check_health(client.as_ref()).await {
                Ok(()) => {
                    debug!(provider = %registration.name, cost = registration.cost, "Provider eligible");
                    return Some(Selected {
                        name: registration.name,
                        client,
                    });
                }
                Err(reason) => {
                    debug!(provider = %registration.name, reason = %reason, "Provider skipped");
                    self.rejected.push(ProviderRejection {
                        provider: registration.name,
                        reason,
                    });
                }
            }
        }
        None
    }
}

/// Availability, then authentication. `Err` carries the reason.
async fn check_health(client: &dyn LlmClient) -> Result<(), String> {
    let availability = client.check_availability().await;
    if !availability.is_ok() {
        return Err(format!("availability {availability}"));
    }
    let auth = client.check_authentication();
    if !auth.permits_use() {
        return Err(format!("authentication {auth}"));
    }
    Ok(())
}

/// Runs conversions against a shared provider registry.
pub struct Converter {
    registry: Arc<ProviderRegistry>,
    specs: SpecRegistry,
    settings: ConverterSettings,
}

impl Converter {
    pub fn new(registry: Arc<ProviderRegistry>, settings: ConverterSettings) -> Self {
        Converter {
            registry,
            specs: SpecRegistry::new(),
            settings,
        }
    }

    /// Convert `request.input` into the target format.
    pub async fn convert(&self, request: &ConversionRequest) -> ConversionOutcome {
        let span = info_span!(
            "convert",
            target = %request.target,
            provider = ?request.provider,
            custom = request.custom.is_some()
        );
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: &ConversionRequest) -> ConversionOutcome {
        // Spec lookup is a pure table read; doing it first means an unknown
        // target costs no health checks and no calls.
        let spec = match self.specs.get_spec(&request.target) {
            Ok(spec) => spec,
            Err(e) => return failed(e, None, 0, Vec::new()),
        };

        let custom = match &request.custom {
            Some(custom) => match self.registry.create_custom(custom) {
                Ok(registration) => Some(registration),
                Err(e) => return failed(e, Some(CUSTOM_NAME.to_string()), 0, Vec::new()),
            },
            None => None,
        };

        let mut auto = None;
        let selected = match &request.provider {
            ProviderChoice::Named(name) => match self.select_named(name, custom).await {
                Ok(selected) => selected,
                Err(e) => return failed(e, Some(name.clone()), 0, Vec::new()),
            },
            ProviderChoice::Auto => {
                let mut selector = AutoSelector::new(custom, &self.registry);
                match selector.next_eligible().await {
                    Some(selected) => {
                        auto = Some(selector);
                        selected
                    }
                    None => {
                        let err = ConversionError::NoProviderAvailable {
                            attempted: selector.rejected,
                        };
                        return failed(err, None, 0, Vec::new());
                    }
                }
            }
        };

        info!(
            provider = %selected.name,
            model = %selected.client.model(),
            target = spec.name,
            "Provider selected"
        );

        let (system_prompt, user_prompt) = build_prompt(&request.input.text, spec);
        let mut llm_request = LlmRequest::new(system_prompt, user_prompt);
        if let Some(model) = &request.model {
            llm_request = llm_request.with_model(model.clone());
        }
        if let Some(max_retries) = request.max_retries {
            llm_request = llm_request.with_max_retries(max_retries);
        }

        self.attempt_loop(spec, &llm_request, selected, auto).await
    }

    async fn select_named(
        &self,
        name: &str,
        custom: Option<ProviderRegistration>,
    ) -> Result<Selected, ConversionError> {
        let registration = match custom {
            Some(custom) if name == CUSTOM_NAME => custom,
            _ => self.registry.get(name)?,
        };
        let client = registration.create_client();
        check_health(client.as_ref())
            .await
            .map_err(|reason| ConversionError::ProviderNotConfigured {
                provider: registration.name.clone(),
                reason,
            })?;
        Ok(Selected {
            name: registration.name,
            client,
        })
    }

    async fn attempt_loop(
        &self,
        spec: &'static ProviderSpec,
        llm_request: &LlmRequest,
        mut current: Selected,
        mut auto: Option<AutoSelector>,
    ) -> ConversionOutcome {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut trail = Vec::new();
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            debug!(attempt, max_attempts, provider = %current.name, "Invoking LLM");
            let result = current.client.complete(llm_request).await;

            if !result.succeeded {
                let detail = result
                    .error_detail
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string());
                warn!(attempt, provider = %current.name, error = %detail, "LLM call failed");
                trail.push(AttemptRecord {
                    attempt,
                    provider: current.name.clone(),
                    model: result.model_used.clone(),
                    result: AttemptResult::CallFailed(detail.clone()),
                });
                last_error = Some(ConversionError::Llm {
                    provider: current.name.clone(),
                    detail,
                });

                if attempt < max_attempts && self.settings.failover {
                    if let Some(selector) = auto.as_mut() {
                        if let Some(next) = selector.next_eligible().await {
                            info!(from = %current.name, to = %next.name, "Failing over");
                            current = next;
                        }
                    }
                }
                continue;
            }

            match validate_output(&result.raw_text, spec.output_format) {
                Ok(valid) => {
                    trail.push(AttemptRecord {
                        attempt,
                        provider: current.name.clone(),
                        model: result.model_used.clone(),
                        result: AttemptResult::Accepted,
                    });
                    info!(
                        attempt,
                        provider = %result.provider_used,
                        model = %result.model_used,
                        "Conversion succeeded"
                    );
                    return ConversionOutcome::Succeeded(ConvertedConfig {
                        output_text: valid.text,
                        format: spec.output_format,
                        target: spec.name.to_string(),
                        provider_used: result.provider_used,
                        model_used: result.model_used,
                        attempts: attempt,
                        trail,
                    });
                }
                Err(issue) => {
                    let reason = issue.to_string();
                    warn!(attempt, provider = %current.name, reason = %reason, "Output rejected");
                    trail.push(AttemptRecord {
                        attempt,
                        provider: current.name.clone(),
                        model: result.model_used.clone(),
                        result: AttemptResult::Rejected(reason.clone()),
                    });
                    last_error = Some(ConversionError::ConversionValidation {
                        attempts: attempt,
                        reason,
                        last_raw: result.raw_text,
                    });
                }
            }
        }

        let error = last_error.unwrap_or_else(|| ConversionError::Llm {
            provider: current.name.clone(),
            detail: "no attempts were made".to_string(),
        });
        warn!(attempts = max_attempts, error = %error, "Conversion failed");
        failed(error, Some(current.name), max_attempts, trail)
    }
}

fn failed(
    error: ConversionError,
    provider: Option<String>,
    attempts: u32,
    trail: Vec<AttemptRecord>,
) -> ConversionOutcome {
    ConversionOutcome::Failed {
        error: error.into_failure(provider),
        attempts,
        trail,
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
