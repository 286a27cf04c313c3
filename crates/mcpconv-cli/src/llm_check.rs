//! `mcpconv llm-check` : check every provider and show what auto-selection
//! would pick.

use anyhow::{Context, Result};
use colored::Colorize;

use mcpconv_core::config::load_config;
use mcpconv_providers::{ProviderHealth, ProviderRegistry};

use crate::helpers;
use crate::CustomProviderArgs;

/// Run the llm-check command.
pub async fn run(custom: &CustomProviderArgs) -> Result<()> {
    let config = load_config(None);
    let registry = ProviderRegistry::with_defaults(&config);

    let custom_registration = match custom.to_custom() {
        Some(custom) => Some(
            registry
                .create_custom(&custom)
                .context("invalid custom provider")?,
        ),
        None => None,
    };

    helpers::print_title("mcpconv LLM providers");

    let rows = registry.enumerate(custom_registration.as_ref()).await;
    print_table(&rows);

    println!();
    match config.llm.explicit_provider() {
        Some(name) => println!(
            "  {:<18} {} {}",
            "Preferred:".bold(),
            name,
            "(from config, no auto-selection)".dimmed()
        ),
        None => print_auto_pick(&rows),
    }
    println!();

    Ok(())
}

fn print_table(rows: &[ProviderHealth]) {
    println!(
        "  {:<12} {:<34} {:>4}  {:<22} {}",
        "PROVIDER".bold(),
        "MODEL".bold(),
        "COST".bold(),
        "AVAILABILITY".bold(),
        "AUTH".bold()
    );
    for row in rows {
        println!(
            "  {:<12} {:<34} {:>4}  {:<22} {}",
            row.name,
            row.model,
            row.cost,
            helpers::availability_badge(&row.availability),
            helpers::auth_badge(&row.authentication)
        );
    }
}

fn print_auto_pick(rows: &[ProviderHealth]) {
    match auto_pick(rows) {
        Some(row) => println!(
            "  {:<18} {} ({})",
            "Auto-selection:".bold(),
            row.name.green(),
            row.model
        ),
        None => println!(
            "  {:<18} {}",
            "Auto-selection:".bold(),
            "no provider is usable; start Ollama or set an API key".red()
        ),
    }
}

/// First eligible row; rows arrive sorted by cost.
fn auto_pick(rows: &[ProviderHealth]) -> Option<&ProviderHealth> {
    rows.iter().find(|row| row.is_eligible())
}
