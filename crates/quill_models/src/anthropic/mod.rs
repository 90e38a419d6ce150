//! Anthropic messages API backend.

mod client;
mod dto;

pub use client::AnthropicProvider;
