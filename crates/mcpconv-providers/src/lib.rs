//! LLM backend layer for mcpconv.
//!
//! # Architecture
//!
//! - [`traits::LlmClient`]: capability interface every backend implements
//! - [`catalog`]: static specs for the built-in backends (cost, env vars, defaults)
//! - [`registry::ProviderRegistry`]: name → factory map, cost ordering, custom providers
//! - [`http_provider::HttpProvider`]: OpenAI-compatible `/chat/completions` client
//! - [`anthropic_provider::AnthropicProvider`]: Anthropic Messages API client
//! - [`ollama_provider::OllamaProvider`]: local Ollama runtime
//! - [`backoff`]: bounded exponential backoff shared by the HTTP clients

pub mod anthropic_provider;
pub mod backoff;
pub mod catalog;
pub mod http_provider;
pub mod ollama_provider;
pub mod registry;
pub mod traits;

#[cfg(test)]
mod test_support;

pub use anthropic_provider::AnthropicProvider;
pub use backoff::{Backoff, CallError};
pub use catalog::{BackendFamily, BackendSpec, BACKENDS};
pub use http_provider::HttpProvider;
pub use ollama_provider::OllamaProvider;
pub use registry::{ClientFactory, CustomProvider, ProviderHealth, ProviderRegistration, ProviderRegistry};
pub use traits::{CallOptions, LlmClient};
