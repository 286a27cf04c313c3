//! `mcpconv convert` : run one conversion and write (or print) the result.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::info;

use mcpconv_convert::{
    write_output, ConversionRequest, Converter, ConverterSettings, ProviderChoice,
};
use mcpconv_core::config::{load_config, Config, OutputAction};
use mcpconv_core::types::{AttemptResult, ConvertedConfig};
use mcpconv_core::{ConversionFailure, ConversionOutcome, InputDocument, SpecRegistry};
use mcpconv_providers::ProviderRegistry;

use crate::helpers;
use crate::CustomProviderArgs;

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input config file (use -c to pass the content directly)
    pub input: Option<PathBuf>,

    /// Target assistant (claude, codex, gemini, mistral, opencode, qwen, vscode)
    #[arg(short, long)]
    pub target: String,

    /// Input configuration content instead of a file
    #[arg(short = 'c', long, conflicts_with = "input")]
    pub input_content: Option<String>,

    /// Output path (defaults to the target's conventional location)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// What to do when the output file exists: overwrite, skip or merge
    #[arg(short = 'a', long)]
    pub output_action: Option<OutputAction>,

    /// Print the converted config instead of writing it
    #[arg(long, default_value_t = false, conflicts_with = "output")]
    pub stdout: bool,

    /// LLM provider to use ("auto" picks the cheapest usable one)
    #[arg(long)]
    pub preferred_provider: Option<String>,

    /// Maximum LLM calls for this conversion
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Model to request from the selected provider instead of its default
    #[arg(long)]
    pub model: Option<String>,

    /// Transient-failure retries inside each LLM call
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Print failures as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[command(flatten)]
    pub custom: CustomProviderArgs,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    pub logs: bool,
}

/// Run the convert command.
pub async fn run(args: ConvertArgs) -> Result<()> {
    let mut config = load_config(None);
    apply_overrides(&mut config, &args);

    let input = read_input(&args)?;
    let document = InputDocument::from_text(input);
    info!(
        format = ?document.format,
        servers = ?document.server_count(),
        "Loaded input configuration"
    );

    let registry = Arc::new(ProviderRegistry::with_defaults(&config));
    let converter = Converter::new(registry, ConverterSettings::from_config(&config.llm));

    let request = build_request(&args, &config, document);

    match converter.convert(&request).await {
        ConversionOutcome::Succeeded(converted) => {
            finish(&args, &config, &converted)?;
            Ok(())
        }
        ConversionOutcome::Failed { error, attempts, .. } => {
            print_failure(&error, attempts, args.json)?;
            std::process::exit(1);
        }
    }
}

fn apply_overrides(config: &mut Config, args: &ConvertArgs) {
    if let Some(provider) = &args.preferred_provider {
        config.llm.preferred_provider = provider.clone();
    }
    if let Some(max_attempts) = args.max_attempts {
        config.llm.max_attempts = max_attempts.max(1);
    }
    if let Some(action) = args.output_action {
        config.output.action = action;
    }
}

fn build_request(args: &ConvertArgs, config: &Config, document: InputDocument) -> ConversionRequest {
    let mut request = ConversionRequest::new(document, args.target.clone())
        .with_provider(ProviderChoice::parse(&config.llm.preferred_provider));
    if let Some(custom) = args.custom.to_custom() {
        request = request.with_custom(custom);
    }
    if let Some(model) = args.model.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        request = request.with_model(model);
    }
    if let Some(max_retries) = args.max_retries {
        request = request.with_max_retries(max_retries);
    }
    request
}

fn read_input(args: &ConvertArgs) -> Result<String> {
    let text = match (&args.input_content, &args.input) {
        (Some(content), _) => content.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display()))?,
        (None, None) => bail!("no input given: pass a file path or --input-content"),
    };
    if text.trim().is_empty() {
        bail!("input configuration is empty");
    }
    Ok(text)
}

fn finish(args: &ConvertArgs, config: &Config, converted: &ConvertedConfig) -> Result<()> {
    if args.stdout {
        println!("{}", converted.output_text);
        return Ok(());
    }

    let path = match &args.output {
        Some(path) => path.clone(),
        None => {
            let spec = SpecRegistry::new().get_spec(&converted.target)?;
            PathBuf::from(spec.default_output_path)
        }
    };

    let outcome = write_output(
        &path,
        &converted.output_text,
        converted.format,
        config.output.action,
    )
    .with_context(|| format!("failed to write {}", path.display()))?;

    println!(
        "  {} {} config {}: {}",
        "✓".green(),
        converted.target.bold(),
        outcome,
        path.display()
    );
    println!(
        "  {}",
        format!(
            "{} / {} in {} attempt(s)",
            converted.provider_used, converted.model_used, converted.attempts
        )
        .dimmed()
    );
    for record in converted
        .trail
        .iter()
        .filter(|r| r.result != AttemptResult::Accepted)
    {
        println!(
            "  {}",
            format!("attempt {} ({}): {}", record.attempt, record.provider, describe(&record.result))
                .dimmed()
        );
    }
    Ok(())
}

fn describe(result: &AttemptResult) -> String {
    match result {
        AttemptResult::Accepted => "accepted".to_string(),
        AttemptResult::CallFailed(detail) => format!("call failed: {detail}"),
        AttemptResult::Rejected(reason) => format!("output rejected: {reason}"),
    }
}

fn print_failure(error: &ConversionFailure, attempts: u32, json: bool) -> Result<()> {
    if json {
        eprintln!("{}", serde_json::to_string_pretty(error)?);
        return Ok(());
    }

    eprintln!();
    eprintln!("{}", "✗ Conversion failed".red().bold());
    eprintln!("  {:<10} {}", "kind:".bold(), error.error_kind);
    eprintln!("  {:<10} {}", "stage:".bold(), error.failed_stage);
    eprintln!(
        "  {:<10} {}",
        "provider:".bold(),
        error.provider_attempted.as_deref().unwrap_or("-")
    );
    eprintln!("  {:<10} {}", "attempts:".bold(), attempts);
    eprintln!("  {:<10} {}", "message:".bold(), error.message);
    if let Some(raw) = &error.last_raw_response {
        eprintln!(
            "  {:<10} {}",
            "last raw:".bold(),
            helpers::preview(raw, 200).dimmed()
        );
    }
    eprintln!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: ConvertArgs,
    }

    fn parse(argv: &[&str]) -> ConvertArgs {
        let mut full = vec!["mcpconv"];
        full.extend_from_slice(argv);
        Harness::try_parse_from(full).unwrap().args
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let args = parse(&[
            "-t",
            "claude",
            "-c",
            "{}",
            "-a",
            "skip",
            "--preferred-provider",
            "ollama",
            "--max-attempts",
            "0",
        ]);
        let mut config = Config::default();
        apply_overrides(&mut config, &args);

        assert_eq!(config.llm.preferred_provider, "ollama");
        assert_eq!(config.llm.max_attempts, 1);
        assert_eq!(config.output.action, OutputAction::Skip);
    }

    #[test]
    fn test_input_from_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "{\"mcpServers\": {}}").unwrap();
        let path = tmp.path().to_string_lossy().to_string();

        let args = parse(&[&path, "-t", "claude"]);
        assert_eq!(read_input(&args).unwrap(), "{\"mcpServers\": {}}");
    }

    #[test]
    fn test_missing_or_blank_input_is_an_error() {
        assert!(read_input(&parse(&["-t", "claude"])).is_err());
        assert!(read_input(&parse(&["-t", "claude", "-c", "   "])).is_err());
    }

    #[test]
    fn test_content_conflicts_with_file() {
        let result = Harness::try_parse_from(["mcpconv", "in.json", "-t", "claude", "-c", "{}"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_request_carries_call_overrides() {
        let config = Config::default();
        let document = || InputDocument::from_text("{}");

        let plain = build_request(&parse(&["-t", "codex", "-c", "{}"]), &config, document());
        assert_eq!(plain.target, "codex");
        assert_eq!(plain.provider, ProviderChoice::Auto);
        assert!(plain.model.is_none());
        assert!(plain.max_retries.is_none());

        let args = parse(&[
            "-t",
            "codex",
            "-c",
            "{}",
            "--model",
            "gpt-4o-mini",
            "--max-retries",
            "0",
        ]);
        let request = build_request(&args, &config, document());
        assert_eq!(request.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(request.max_retries, Some(0));
    }
}
