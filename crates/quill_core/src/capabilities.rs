//! Declared backend properties.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// What a provider backend supports.
///
/// Queried when agents are wired and on health checks; never mutated.
///
/// # Examples
///
/// ```
/// use quill_core::ProviderCapabilities;
///
/// let caps = ProviderCapabilities::new(8192).with_json_mode(true);
/// assert_eq!(*caps.context_length(), 8192);
/// assert!(*caps.json_mode());
/// assert!(!*caps.streaming());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Getters)]
pub struct ProviderCapabilities {
    /// Maximum context window in tokens
    context_length: u32,
    /// Supports tool calls
    tool_use: bool,
    /// Reliably honours JSON-mode requests
    json_mode: bool,
    /// Supports an extended reasoning mode
    thinking: bool,
    /// Supports streamed responses
    streaming: bool,
}

impl ProviderCapabilities {
    /// Capabilities with the given context length and every flag off.
    pub fn new(context_length: u32) -> Self {
        Self {
            context_length,
            ..Self::default()
        }
    }

    /// Set tool-use support.
    pub fn with_tool_use(mut self, value: bool) -> Self {
        self.tool_use = value;
        self
    }

    /// Set JSON-mode reliability.
    pub fn with_json_mode(mut self, value: bool) -> Self {
        self.json_mode = value;
        self
    }

    /// Set thinking-mode support.
    pub fn with_thinking(mut self, value: bool) -> Self {
        self.thinking = value;
        self
    }

    /// Set streaming support.
    pub fn with_streaming(mut self, value: bool) -> Self {
        self.streaming = value;
        self
    }
}
