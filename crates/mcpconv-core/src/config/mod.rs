//! Configuration: schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use mcpconv_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Max attempts: {}", cfg.llm.max_attempts);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, save_config};
pub use schema::{Config, LlmConfig, OutputAction, ProviderConfig, ProvidersConfig, RetryConfig};
