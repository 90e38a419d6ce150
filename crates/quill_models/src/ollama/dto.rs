//! Wire types for the Ollama chat API.

use quill_core::Message;
use serde::{Deserialize, Serialize};

/// Chat request body.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
    pub options: ChatOptions,
}

/// Sampling options.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub(crate) struct ChatOptions {
    pub temperature: f32,
    pub num_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

/// Chat response body.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub(crate) struct ChatResponse {
    pub message: Option<ResponseMessage>,
    pub prompt_eval_count: Option<u32>,
    pub eval_count: Option<u32>,
    pub error: Option<String>,
}

/// Assistant message in a response.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub(crate) struct ResponseMessage {
    pub content: String,
}
