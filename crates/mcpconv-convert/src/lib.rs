//! Conversion pipeline for mcpconv.
//!
//! [`orchestrator::Converter`] turns an input configuration and a target name
//! into validated target text, choosing and failing over across LLM providers.
//! [`output`] writes the result to disk.

pub mod orchestrator;
pub mod output;

pub use orchestrator::{ConversionRequest, Converter, ConverterSettings, ProviderChoice};
pub use output::{write_output, OutputError, WriteOutcome};
