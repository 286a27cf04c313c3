//! mcpconv CLI entry point.
//!
//! # Commands
//!
//! - `mcpconv convert [INPUT] -t TARGET` : convert an MCP config with an LLM
//! - `mcpconv llm-check` : check every LLM provider
//! - `mcpconv show-defaults` : list target formats and default output paths
//! - `mcpconv status` : show configuration and credentials
//! - `mcpconv init` : write a default config file

mod convert_cmd;
mod helpers;
mod init;
mod llm_check;
mod status;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use mcpconv_providers::CustomProvider;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Convert MCP server configurations between AI coding assistants
#[derive(Parser)]
#[command(name = "mcpconv", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an MCP configuration into a target assistant's format
    Convert(convert_cmd::ConvertArgs),

    /// Check which LLM providers are available and authenticated
    LlmCheck {
        #[command(flatten)]
        custom: CustomProviderArgs,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// List supported target formats and their default output paths
    ShowDefaults,

    /// Show configuration and provider credential status
    Status,

    /// Write a default config file
    Init,
}

/// Flags describing a one-off LLM endpoint.
#[derive(Args, Debug, Clone, Default)]
pub struct CustomProviderArgs {
    /// Base URL of a custom LLM endpoint (e.g. http://localhost:8000/v1)
    #[arg(long)]
    pub llm_base_url: Option<String>,

    /// API flavour of the custom endpoint (openai, anthropic, ollama, or a backend name)
    #[arg(long, default_value = "openai")]
    pub llm_provider_type: String,

    /// Model to request from the custom endpoint
    #[arg(long)]
    pub llm_model: Option<String>,

    /// API key for the custom endpoint
    #[arg(long)]
    pub llm_api_key: Option<String>,
}

impl CustomProviderArgs {
    /// `Some` only when a base URL was given.
    pub fn to_custom(&self) -> Option<CustomProvider> {
        let base_url = self.llm_base_url.as_ref()?.trim();
        if base_url.is_empty() {
            return None;
        }
        Some(CustomProvider {
            base_url: base_url.to_string(),
            provider_type: self.llm_provider_type.clone(),
            model: self.llm_model.clone().unwrap_or_default(),
            api_key: self.llm_api_key.clone(),
        })
    }
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(args) => {
            init_logging(args.logs);
            convert_cmd::run(args).await
        }
        Commands::LlmCheck { custom, logs } => {
            init_logging(logs);
            llm_check::run(&custom).await
        }
        Commands::ShowDefaults => status::show_defaults(),
        Commands::Status => status::run(),
        Commands::Init => init::run(),
    }
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("mcpconv=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_args_require_base_url() {
        assert!(CustomProviderArgs::default().to_custom().is_none());

        let args = CustomProviderArgs {
            llm_base_url: Some("http://localhost:8000/v1".into()),
            llm_provider_type: "openai".into(),
            llm_model: Some("qwen2.5-coder".into()),
            llm_api_key: None,
        };
        let custom = args.to_custom().unwrap();
        assert_eq!(custom.base_url, "http://localhost:8000/v1");
        assert_eq!(custom.model, "qwen2.5-coder");
    }

    #[test]
    fn test_parses_convert_flags() {
        let cli = Cli::try_parse_from([
            "mcpconv",
            "convert",
            "in.json",
            "-t",
            "codex",
            "-a",
            "merge",
            "--preferred-provider",
            "deepseek",
            "--max-attempts",
            "5",
        ])
        .unwrap();
        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.target, "codex");
        assert_eq!(args.max_attempts, Some(5));
        assert_eq!(args.preferred_provider.as_deref(), Some("deepseek"));
    }
}
