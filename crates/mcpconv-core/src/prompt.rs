//! Prompt construction for a conversion request.
//!
//! Deterministic: no clock, no randomness, no environment lookups. The input
//! text is embedded byte-for-byte.

use crate::format::OutputFormat;
use crate::specs::ProviderSpec;

/// Role-setting instruction sent as the system prompt.
pub const SYSTEM_PROMPT: &str = "You are an expert in Model Context Protocol (MCP) server \
configuration. You convert MCP server configurations between the formats used by different \
coding-agent tools. You answer with the converted configuration document only.";

/// Fixed conversion rules, applied to every target.
pub const CONVERSION_RULES: &[&str] = &[
    "Preserve the semantics of every server: transport, command, arguments, URL, headers, \
     working directory and timeouts must keep their meaning.",
    "Treat server names as keys. Keep every server name exactly as written and never merge, \
     rename or drop servers.",
    "Preserve metadata such as descriptions, enabled/disabled flags and tool filters whenever \
     the target format has a place for them.",
    "Normalize environment-variable references to the syntax the target format documents. \
     Never inline a secret value that was given as a reference.",
    "Keep argument order and string values verbatim.",
];

/// Output directive for a given format.
pub fn output_directive(format: OutputFormat) -> String {
    format!(
        "Respond with a single {label} document that is decodable as {label} exactly as \
         returned. Do not wrap it in code fences or any other markup. Do not add explanations, \
         headings or any text before or after the document.",
        label = format.label()
    )
}

/// Build the `(system_prompt, user_prompt)` pair for converting `input_text`
/// into the format described by `spec`, using the standard rules and the
/// directive for the spec's output format.
pub fn build_prompt(input_text: &str, spec: &ProviderSpec) -> (String, String) {
    build_prompt_with(
        input_text,
        spec,
        CONVERSION_RULES,
        &output_directive(spec.output_format),
    )
}

/// Like [`build_prompt`] with caller-supplied rules and output instructions.
///
/// Sections appear in a fixed order: conversion rules, the input
/// configuration, the target specification, the output directive.
pub fn build_prompt_with(
    input_text: &str,
    spec: &ProviderSpec,
    conversion_rules: &[&str],
    output_instructions: &str,
) -> (String, String) {
    let mut user = String::with_capacity(input_text.len() + spec.text.len() + 1024);

    user.push_str("## Conversion rules\n\n");
    for (i, rule) in conversion_rules.iter().enumerate() {
        user.push_str(&format!("{}. {}\n", i + 1, rule));
    }

    user.push_str("\n## Input configuration\n\n");
    user.push_str("<input>\n");
    user.push_str(input_text);
    if !input_text.ends_with('\n') {
        user.push('\n');
    }
    user.push_str("</input>\n");

    user.push_str(&format!(
        "\n## Target format: {} ({})\n\n",
        spec.display_name, spec.name
    ));
    user.push_str(spec.text.trim_end());
    user.push('\n');

    user.push_str("\n## Output\n\n");
    user.push_str(output_instructions);
    user.push('\n');

    (SYSTEM_PROMPT.to_string(), user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specs::SpecRegistry;

    const INPUT: &str = r#"{"mcpServers": {"foo": {"command": "node", "args": ["s.js"]}}}"#;

    #[test]
    fn test_build_prompt_is_pure() {
        let spec = SpecRegistry::new().get_spec("claude").unwrap();
        let first = build_prompt(INPUT, spec);
        let second = build_prompt(INPUT, spec);
        assert_eq!(first, second);
    }

    #[test]
    fn test_input_embedded_verbatim() {
        let spec = SpecRegistry::new().get_spec("codex").unwrap();
        let odd = "servers:\n   foo:   {command: node}   \n\ttrailing\t";
        let (_, user) = build_prompt(odd, spec);
        assert!(user.contains(odd));
    }

    #[test]
    fn test_section_order() {
        let spec = SpecRegistry::new().get_spec("vscode").unwrap();
        let (system, user) = build_prompt(INPUT, spec);
        assert!(system.contains("Model Context Protocol"));

        let rules = user.find("## Conversion rules").unwrap();
        let input = user.find(INPUT).unwrap();
        let target = user.find(spec.text.trim_end()).unwrap();
        let output = user.find("## Output").unwrap();
        assert!(rules < input && input < target && target < output);
    }

    #[test]
    fn test_directive_names_format() {
        let spec = SpecRegistry::new().get_spec("mistral").unwrap();
        let (_, user) = build_prompt(INPUT, spec);
        assert!(user.contains("decodable as TOML"));
        assert!(user.contains("code fences"));
    }

    #[test]
    fn test_custom_rules_and_instructions() {
        let spec = SpecRegistry::new().get_spec("gemini").unwrap();
        let (_, user) = build_prompt_with(INPUT, spec, &["Keep it short."], "Answer in JSON.");
        assert!(user.contains("1. Keep it short.\n"));
        assert!(!user.contains(CONVERSION_RULES[0]));
        assert!(user.trim_end().ends_with("Answer in JSON."));
    }
}
