//! Structural validation of raw model output.
//!
//! Wrapped output (code fences, leading or trailing prose) is rejected rather
//! than stripped; the orchestrator turns a rejection into a retry.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::format::OutputFormat;

/// Why a raw response was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("response is empty")]
    Empty,

    #[error("response is wrapped in a code fence")]
    CodeFence,

    #[error("response contains prose outside the {format} document: {line:?}")]
    Prose { format: OutputFormat, line: String },

    #[error("response does not decode as {format}: {message}")]
    Decode { format: OutputFormat, message: String },

    #[error("top level of the {format} document is not a mapping")]
    NotAMapping { format: OutputFormat },

    #[error("{format} document has no entries")]
    EmptyDocument { format: OutputFormat },
}

/// A response that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOutput {
    /// Response text with surrounding whitespace trimmed.
    pub text: String,
    pub value: Value,
}

/// Validate `raw` as a non-empty `format` document.
pub fn validate_output(raw: &str, format: OutputFormat) -> Result<ValidatedOutput, ValidationIssue> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ValidationIssue::Empty);
    }
    if text.lines().any(|l| l.trim_start().starts_with("```")) {
        return Err(ValidationIssue::CodeFence);
    }

    let value = format.decode(text).map_err(|e| ValidationIssue::Decode {
        format,
        message: e.to_string(),
    })?;

    let map = match &value {
        Value::Object(map) => map,
        _ => return Err(ValidationIssue::NotAMapping { format }),
    };
    if map.is_empty() {
        return Err(ValidationIssue::EmptyDocument { format });
    }

    // A sentence followed by a colon ("Here is the config:") is valid YAML
    // that decodes to a key with a null value. Prose that itself reads as
    // `key: value` ("Note: adjust the paths") decodes to an ordinary entry
    // and is not caught here.
    if format == OutputFormat::Yaml {
        if let Some((key, _)) = map
            .iter()
            .find(|(k, v)| v.is_null() && k.trim().contains(char::is_whitespace))
        {
            return Err(ValidationIssue::Prose {
                format,
                line: key.clone(),
            });
        }
    }

    debug!(format = %format, keys = map.len(), "Output validated");
    Ok(ValidatedOutput {
        text: text.to_string(),
        value,
    })
}
