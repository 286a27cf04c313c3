//! `mcpconv status` and `mcpconv show-defaults`.

use anyhow::Result;
use colored::Colorize;

use mcpconv_core::config::{get_config_path, load_config, ProviderConfig};
use mcpconv_core::utils::{first_env, mask_secret};
use mcpconv_core::SpecRegistry;
use mcpconv_providers::{BackendSpec, BACKENDS};

use crate::helpers;

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    helpers::print_title("mcpconv Status");

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );
    println!(
        "  {:<18} {}",
        "Provider:".bold(),
        config.llm.preferred_provider
    );
    println!(
        "  {:<18} {} | failover: {} | retries: {}",
        "Attempts:".bold(),
        config.llm.max_attempts,
        config.llm.failover,
        config.llm.retry.max_retries
    );
    println!(
        "  {:<18} {} | max_tokens: {} | timeout: {}s",
        "Parameters:".bold(),
        format!("temp: {}", config.llm.temperature).dimmed(),
        format!("{}", config.llm.max_tokens).dimmed(),
        config.llm.request_timeout_secs
    );
    println!("  {:<18} {}", "Output action:".bold(), config.output.action);

    println!();
    println!("  {}", "Credentials:".bold());
    for spec in BACKENDS {
        let provider_config = config
            .providers
            .get_by_name(spec.name)
            .cloned()
            .unwrap_or_default();
        println!(
            "    {:<20} {}",
            spec.display_name,
            credential_status(spec, &provider_config)
        );
    }
    println!();

    Ok(())
}

fn credential_status(spec: &BackendSpec, config: &ProviderConfig) -> String {
    if !spec.requires_api_key() {
        return format!("{}", "· no key needed".dimmed());
    }
    if config.is_configured() {
        return format!("{} {} (config)", "✓".green(), mask_secret(&config.api_key));
    }
    match first_env(spec.env_keys) {
        Some((key, value)) => format!("{} {} ({key})", "✓".green(), mask_secret(&value)),
        None => format!("{}", "· not configured".dimmed()),
    }
}

/// Run the show-defaults command.
pub fn show_defaults() -> Result<()> {
    helpers::print_title("mcpconv Target Formats");

    println!(
        "  {:<10} {:<16} {:<6} {:<24} {}",
        "NAME".bold(),
        "ASSISTANT".bold(),
        "FORMAT".bold(),
        "DEFAULT OUTPUT".bold(),
        "ALIASES".bold()
    );
    for spec in SpecRegistry::new().list() {
        println!(
            "  {:<10} {:<16} {:<6} {:<24} {}",
            spec.name,
            spec.display_name,
            spec.output_format.as_str(),
            spec.default_output_path,
            spec.aliases.join(", ").dimmed()
        );
    }
    println!();

    Ok(())
}
