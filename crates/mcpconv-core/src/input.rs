//! Input configuration documents.

use serde_json::Value;

use crate::format::OutputFormat;

/// An input configuration: the original text plus, when it could be
/// recognised, its decoded form.
#[derive(Debug, Clone, PartialEq)]
pub struct InputDocument {
    /// Exactly what the user supplied.
    pub text: String,
    pub format: Option<OutputFormat>,
    pub parsed: Option<Value>,
}

impl InputDocument {
    /// Keep `text` verbatim and try JSON, then TOML, then YAML.
    ///
    /// Text that matches none of them is still accepted: the model does the
    /// mapping, so free-form descriptions are valid input.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let detected = OutputFormat::ALL.iter().find_map(|format| {
            format
                .decode(&text)
                .ok()
                .filter(is_structured)
                .map(|value| (*format, value))
        });

        match detected {
            Some((format, value)) => InputDocument {
                text,
                format: Some(format),
                parsed: Some(value),
            },
            None => InputDocument {
                text,
                format: None,
                parsed: None,
            },
        }
    }

    pub fn is_structured(&self) -> bool {
        self.parsed.is_some()
    }

    /// Number of entries under a recognised server map, if any.
    pub fn server_count(&self) -> Option<usize> {
        let parsed = self.parsed.as_ref()?;
        ["mcpServers", "servers", "mcp_servers", "mcp"]
            .iter()
            .find_map(|key| match parsed.get(key)? {
                Value::Object(map) => Some(map.len()),
                Value::Array(items) => Some(items.len()),
                _ => None,
            })
    }
}

// Bare YAML scalars ("hello world") decode fine but say nothing about structure.
fn is_structured(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_json() {
        let text = r#"{"mcpServers": {"foo": {"command": "node"}}}"#;
        let doc = InputDocument::from_text(text);
        assert_eq!(doc.format, Some(OutputFormat::Json));
        assert_eq!(doc.text, text);
        assert_eq!(doc.server_count(), Some(1));
    }

    #[test]
    fn test_detect_toml() {
        let doc = InputDocument::from_text("[mcp_servers.foo]\ncommand = \"node\"\n");
        assert_eq!(doc.format, Some(OutputFormat::Toml));
        assert_eq!(doc.server_count(), Some(1));
    }

    #[test]
    fn test_detect_yaml() {
        let doc = InputDocument::from_text("servers:\n  a:\n    command: x\n  b:\n    url: y\n");
        assert_eq!(doc.format, Some(OutputFormat::Yaml));
        assert_eq!(doc.server_count(), Some(2));
    }

    #[test]
    fn test_free_text_is_unstructured() {
        let doc = InputDocument::from_text("run the filesystem server with npx in this folder");
        assert!(!doc.is_structured());
        assert_eq!(doc.format, None);
        assert_eq!(doc.server_count(), None);
    }
}
