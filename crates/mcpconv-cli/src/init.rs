//! `mcpconv init` : write `~/.mcpconv/config.json` with defaults.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use mcpconv_core::config::{get_config_path, save_config, Config};

use crate::helpers;

/// Run the init command.
pub fn run() -> Result<()> {
    helpers::print_title("mcpconv Setup");

    let config_path = get_config_path();
    if write_default_config(&config_path)? {
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    }

    println!();
    println!(
        "{}",
        "  Run `mcpconv llm-check` to see which LLM providers are usable.".green()
    );
    println!();

    Ok(())
}

/// Returns `false` when a config file is already present.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpconv_core::config::load_config;
    use tempfile::TempDir;

    #[test]
    fn test_writes_defaults_once() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.json");

        assert!(write_default_config(&path).unwrap());
        let loaded = load_config(Some(&path));
        assert_eq!(loaded.llm.max_attempts, 3);

        std::fs::write(&path, "{\"llm\": {\"maxAttempts\": 7}}").unwrap();
        assert!(!write_default_config(&path).unwrap());
        assert!(std::fs::read_to_string(&path).unwrap().contains('7'));
    }
}
