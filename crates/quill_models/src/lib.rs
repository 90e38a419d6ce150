//! Text-generation backends and provider routing.
//!
//! Four backends implement [`quill_interface::Provider`]:
//! - [`OllamaProvider`] for a local inference engine
//! - [`OpenAiProvider`] for OpenAI-compatible chat completion APIs
//! - [`AnthropicProvider`] for the Anthropic messages API
//! - [`MockProvider`], a deterministic stand-in used when nothing is configured
//!
//! [`ProviderRegistry`] maps type names to constructors and wires one
//! provider per agent role from a [`ProviderSection`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod anthropic;
mod config;
mod http;
mod metrics;
mod mock;
mod ollama;
mod openai;
mod registry;

pub use anthropic::AnthropicProvider;
pub use config::{ProviderConfig, ProviderConfigBuilder, ProviderSection, QuillConfig};
pub use metrics::{classify_error, LlmMetrics};
pub use mock::{MockProvider, MOCK_RESPONSE};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use registry::{AgentConfig, AgentConfigs, ProviderFactory, ProviderRegistry};
