//! Provider call output.

use serde::{Deserialize, Serialize};

/// Text produced by one provider call, with its cost.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Generated text
    pub text: String,
    /// Tokens consumed by the prompt
    pub prompt_tokens: u32,
    /// Tokens produced in the completion
    pub completion_tokens: u32,
    /// Wall-clock duration of the call
    pub duration_ms: u64,
}

impl GenerationResult {
    /// Prompt plus completion tokens.
    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}
