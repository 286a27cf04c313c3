//! Core building blocks for mcpconv.
//!
//! Everything that does not talk to a language model lives here: the shared
//! request/result types, the error taxonomy, the target specification
//! registry, prompt construction, and validation of model output.

pub mod config;
pub mod error;
pub mod format;
pub mod input;
pub mod prompt;
pub mod specs;
pub mod types;
pub mod utils;
pub mod validate;

pub use error::{ConversionError, ConversionFailure, ErrorKind, Stage};
pub use format::OutputFormat;
pub use input::InputDocument;
pub use specs::{ProviderSpec, SpecRegistry};
pub use types::{AuthStatus, Availability, ConversionOutcome, LlmRequest, LlmResult};
