//! Wire types for the Anthropic messages API.

use serde::{Deserialize, Serialize};

/// Messages API request body.
#[derive(Debug, Clone, Serialize, PartialEq, derive_builder::Builder)]
#[builder(setter(into))]
pub(crate) struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    system: Option<String>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    top_p: Option<f32>,
}

impl AnthropicRequest {
    pub(crate) fn builder() -> AnthropicRequestBuilder {
        AnthropicRequestBuilder::default()
    }
}

/// Conversation turn; the API accepts only "user" and "assistant".
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub(crate) struct AnthropicMessage {
    pub role: &'static str,
    pub content: String,
}

/// Messages API response body.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub(crate) struct AnthropicResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Option<AnthropicUsage>,
}

/// One response content block.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub(crate) struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(default)]
pub(crate) struct AnthropicUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}
