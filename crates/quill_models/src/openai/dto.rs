//! Wire types for OpenAI-compatible chat completions.

use quill_core::Message;
use serde::{Deserialize, Serialize};

/// Chat completion request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub(crate) struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// Requested output format.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub(crate) struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: &'static str,
}

/// Chat completion response.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

/// A completion choice.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub(crate) struct Choice {
    pub message: ChoiceMessage,
}

/// Message in a choice.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub(crate) struct ChoiceMessage {
    pub content: Option<String>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(default)]
pub(crate) struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}
