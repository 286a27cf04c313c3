//! Target-format specification registry.
//!
//! One markdown document per target tool is compiled into the binary. The
//! documents are handed to the model verbatim as grounding context.

use crate::error::ConversionError;
use crate::format::OutputFormat;

/// Immutable description of one target configuration format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSpec {
    /// Unique key, e.g. "claude".
    pub name: &'static str,
    pub display_name: &'static str,
    /// Markdown specification text.
    pub text: &'static str,
    pub output_format: OutputFormat,
    /// Where the tool looks for its MCP config, relative to the project root.
    pub default_output_path: &'static str,
    /// Alternate names accepted on lookup.
    pub aliases: &'static [&'static str],
}

static SPECS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "claude",
        display_name: "Claude Code",
        text: include_str!("../../specs/claude.md"),
        output_format: OutputFormat::Json,
        default_output_path: ".mcp.json",
        aliases: &["claude-code"],
    },
    ProviderSpec {
        name: "codex",
        display_name: "OpenAI Codex CLI",
        text: include_str!("../../specs/codex.md"),
        output_format: OutputFormat::Toml,
        default_output_path: ".codex/config.toml",
        aliases: &["codex-cli"],
    },
    ProviderSpec {
        name: "gemini",
        display_name: "Gemini CLI",
        text: include_str!("../../specs/gemini.md"),
        output_format: OutputFormat::Json,
        default_output_path: ".gemini/settings.json",
        aliases: &["gemini-cli"],
    },
    ProviderSpec {
        name: "mistral",
        display_name: "Mistral Vibe",
        text: include_str!("../../specs/mistral.md"),
        output_format: OutputFormat::Toml,
        default_output_path: ".vibe/config.toml",
        aliases: &["vibe"],
    },
    ProviderSpec {
        name: "opencode",
        display_name: "OpenCode",
        text: include_str!("../../specs/opencode.md"),
        output_format: OutputFormat::Json,
        default_output_path: "opencode.json",
        aliases: &[],
    },
    ProviderSpec {
        name: "qwen",
        display_name: "Qwen Code",
        text: include_str!("../../specs/qwen.md"),
        output_format: OutputFormat::Json,
        default_output_path: ".qwen/settings.json",
        aliases: &["qwen-code"],
    },
    ProviderSpec {
        name: "vscode",
        display_name: "VS Code",
        text: include_str!("../../specs/vscode.md"),
        output_format: OutputFormat::Json,
        default_output_path: ".vscode/mcp.json",
        aliases: &["code", "vs-code"],
    },
];

/// Read-only lookup over the compiled-in specifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecRegistry;

impl SpecRegistry {
    pub fn new() -> Self {
        SpecRegistry
    }

    /// All specifications, ordered by name.
    pub fn list(&self) -> &'static [ProviderSpec] {
        SPECS
    }

    /// Canonical target names.
    pub fn names(&self) -> Vec<String> {
        SPECS.iter().map(|s| s.name.to_string()).collect()
    }

    /// Resolve a name or alias (case-insensitive) to its specification.
    pub fn resolve(&self, name: &str) -> Option<&'static ProviderSpec> {
        let key = name.trim().to_lowercase();
        SPECS
            .iter()
            .find(|s| s.name == key || s.aliases.contains(&key.as_str()))
    }

    /// Look up the specification for a target, failing on unknown names.
    pub fn get_spec(&self, name: &str) -> Result<&'static ProviderSpec, ConversionError> {
        self.resolve(name)
            .ok_or_else(|| ConversionError::UnknownTargetFormat {
                name: name.to_string(),
                supported: self.names(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_every_spec_is_non_empty() {
        let registry = SpecRegistry::new();
        for name in registry.names() {
            let spec = registry.get_spec(&name).unwrap();
            assert!(!spec.text.trim().is_empty(), "{name} has empty text");
            assert!(spec.text.starts_with("# "), "{name} lacks a title");
        }
    }

    #[test]
    fn test_unknown_target() {
        let err = SpecRegistry::new().get_spec("nonexistent").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTargetFormat);
        assert!(err.to_string().contains("claude"));
    }

    #[test]
    fn test_aliases_and_case() {
        let registry = SpecRegistry::new();
        assert_eq!(registry.resolve("Claude-Code").unwrap().name, "claude");
        assert_eq!(registry.resolve("vibe").unwrap().name, "mistral");
        assert_eq!(registry.resolve(" VS-Code ").unwrap().name, "vscode");
        assert!(registry.resolve("cursor").is_none());
    }

    #[test]
    fn test_names_are_unique_and_sorted() {
        let names = SpecRegistry::new().names();
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_toml_targets() {
        let registry = SpecRegistry::new();
        assert_eq!(registry.get_spec("codex").unwrap().output_format, OutputFormat::Toml);
        assert_eq!(registry.get_spec("mistral").unwrap().output_format, OutputFormat::Toml);
        assert_eq!(registry.get_spec("vscode").unwrap().output_format, OutputFormat::Json);
    }
}
