//! Error taxonomy for a conversion.
//!
//! Expected failures are carried as `ConversionError` values and flattened into
//! a [`ConversionFailure`] at the orchestrator boundary, so a caller always gets
//! either valid target text or a structured explanation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stage of the conversion state machine where a failure happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    SelectProvider,
    BuildPrompt,
    Invoke,
    Validate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::SelectProvider => "select_provider",
            Stage::BuildPrompt => "build_prompt",
            Stage::Invoke => "invoke",
            Stage::Validate => "validate",
        })
    }
}

/// Machine-readable category of a [`ConversionError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownTargetFormat,
    UnknownProvider,
    ProviderNotConfigured,
    NoProviderAvailable,
    UnsupportedProviderType,
    ConversionValidation,
    LlmCall,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::UnknownTargetFormat => "unknown_target_format",
            ErrorKind::UnknownProvider => "unknown_provider",
            ErrorKind::ProviderNotConfigured => "provider_not_configured",
            ErrorKind::NoProviderAvailable => "no_provider_available",
            ErrorKind::UnsupportedProviderType => "unsupported_provider_type",
            ErrorKind::ConversionValidation => "conversion_validation",
            ErrorKind::LlmCall => "llm_call",
        })
    }
}

/// Why a provider was skipped during auto-selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRejection {
    pub provider: String,
    pub reason: String,
}

impl fmt::Display for ProviderRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.reason)
    }
}

/// Every expected way a conversion can fail.
#[derive(Clone, Debug, Error)]
pub enum ConversionError {
    #[error("unknown target format '{name}' (supported: {})", .supported.join(", "))]
    UnknownTargetFormat { name: String, supported: Vec<String> },

    #[error("unknown LLM provider '{0}'; run `mcpconv llm-check` to list registered providers")]
    UnknownProvider(String),

    #[error("LLM provider '{provider}' is not usable: {reason}; run `mcpconv llm-check` for details")]
    ProviderNotConfigured { provider: String, reason: String },

    #[error("no LLM provider available (tried: {})", format_rejections(.attempted))]
    NoProviderAvailable { attempted: Vec<ProviderRejection> },

    #[error("unsupported custom provider type '{provider_type}' (supported: {})", .supported.join(", "))]
    UnsupportedProviderType {
        provider_type: String,
        supported: Vec<String>,
    },

    #[error("model output failed validation after {attempts} attempt(s): {reason}")]
    ConversionValidation {
        attempts: u32,
        reason: String,
        last_raw: String,
    },

    #[error("LLM call to '{provider}' failed: {detail}")]
    Llm { provider: String, detail: String },
}

fn format_rejections(rejections: &[ProviderRejection]) -> String {
    if rejections.is_empty() {
        return "none registered".to_string();
    }
    rejections
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ConversionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversionError::UnknownTargetFormat { .. } => ErrorKind::UnknownTargetFormat,
            ConversionError::UnknownProvider(_) => ErrorKind::UnknownProvider,
            ConversionError::ProviderNotConfigured { .. } => ErrorKind::ProviderNotConfigured,
            ConversionError::NoProviderAvailable { .. } => ErrorKind::NoProviderAvailable,
            ConversionError::UnsupportedProviderType { .. } => ErrorKind::UnsupportedProviderType,
            ConversionError::ConversionValidation { .. } => ErrorKind::ConversionValidation,
            ConversionError::Llm { .. } => ErrorKind::LlmCall,
        }
    }

    /// The state-machine stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            ConversionError::UnknownTargetFormat { .. } => Stage::BuildPrompt,
            ConversionError::UnknownProvider(_)
            | ConversionError::ProviderNotConfigured { .. }
            | ConversionError::NoProviderAvailable { .. }
            | ConversionError::UnsupportedProviderType { .. } => Stage::SelectProvider,
            ConversionError::ConversionValidation { .. } => Stage::Validate,
            ConversionError::Llm { .. } => Stage::Invoke,
        }
    }

    /// Flatten into the structured failure returned to callers.
    pub fn into_failure(self, provider_attempted: Option<String>) -> ConversionFailure {
        let last_raw = match &self {
            ConversionError::ConversionValidation { last_raw, .. } => Some(last_raw.clone()),
            _ => None,
        };
        ConversionFailure {
            error_kind: self.kind(),
            message: self.to_string(),
            failed_stage: self.stage(),
            provider_attempted,
            last_raw_response: last_raw,
        }
    }
}

/// Structured error value handed back to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionFailure {
    pub error_kind: ErrorKind,
    pub message: String,
    pub failed_stage: Stage,
    pub provider_attempted: Option<String>,
    /// Last raw model response, kept for diagnosing validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_raw_response: Option<String>,
}

impl fmt::Display for ConversionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] stage={} provider={}: {}",
            self.error_kind,
            self.failed_stage,
            self.provider_attempted.as_deref().unwrap_or("-"),
            self.message
        )
    }
}
