//! Serialization formats a target configuration can be written in.
//!
//! All three decode into `serde_json::Value` so the rest of the pipeline
//! (validation, merging) works on a single structured representation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Declared output format of a target specification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Yaml,
    Toml,
}

/// Failure to decode or encode a document in a given format.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid {format}: {message}")]
    Decode { format: OutputFormat, message: String },

    #[error("cannot encode as {format}: {message}")]
    Encode { format: OutputFormat, message: String },

    #[error("unknown format '{0}' (expected json, yaml or toml)")]
    Unknown(String),
}

impl OutputFormat {
    /// All formats, in detection order (strictest first).
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Json, OutputFormat::Toml, OutputFormat::Yaml];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Toml => "toml",
        }
    }

    /// Upper-case label used inside prompts.
    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Json => "JSON",
            OutputFormat::Yaml => "YAML",
            OutputFormat::Toml => "TOML",
        }
    }

    /// Decode `text` into a structured value.
    pub fn decode(&self, text: &str) -> Result<Value, FormatError> {
        let decode_err = |message: String| FormatError::Decode {
            format: *self,
            message,
        };
        match self {
            OutputFormat::Json => serde_json::from_str(text).map_err(|e| decode_err(e.to_string())),
            OutputFormat::Yaml => serde_yaml::from_str(text).map_err(|e| decode_err(e.to_string())),
            OutputFormat::Toml => toml::from_str(text).map_err(|e| decode_err(e.to_string())),
        }
    }

    /// Encode a structured value back into text.
    pub fn encode(&self, value: &Value) -> Result<String, FormatError> {
        let encode_err = |message: String| FormatError::Encode {
            format: *self,
            message,
        };
        match self {
            OutputFormat::Json => {
                serde_json::to_string_pretty(value).map_err(|e| encode_err(e.to_string()))
            }
            OutputFormat::Yaml => serde_yaml::to_string(value).map_err(|e| encode_err(e.to_string())),
            OutputFormat::Toml => {
                toml::to_string_pretty(value).map_err(|e| encode_err(e.to_string()))
            }
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "toml" => Ok(OutputFormat::Toml),
            other => Err(FormatError::Unknown(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_each_format() {
        let json = OutputFormat::Json.decode(r#"{"a": 1}"#).unwrap();
        assert_eq!(json, json!({"a": 1}));

        let yaml = OutputFormat::Yaml.decode("a: 1\nb:\n  - x\n").unwrap();
        assert_eq!(yaml, json!({"a": 1, "b": ["x"]}));

        let toml = OutputFormat::Toml
            .decode("[mcp_servers.foo]\ncommand = \"node\"\n")
            .unwrap();
        assert_eq!(toml["mcp_servers"]["foo"]["command"], "node");
    }

    #[test]
    fn test_json_rejects_trailing_prose() {
        let err = OutputFormat::Json
            .decode("{\"a\": 1}\nHope this helps!")
            .unwrap_err();
        assert!(err.to_string().starts_with("invalid json"));
    }

    #[test]
    fn test_toml_rejects_prose() {
        assert!(OutputFormat::Toml
            .decode("Here is your config:\n[a]\nb = 1")
            .is_err());
    }

    #[test]
    fn test_toml_encode_top_level_table() {
        let text = OutputFormat::Toml
            .encode(&json!({"mcp_servers": {"foo": {"command": "node"}}}))
            .unwrap();
        assert!(text.contains("[mcp_servers.foo]"));
        assert!(text.contains("command = \"node\""));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert!("toon".parse::<OutputFormat>().is_err());
    }
}
