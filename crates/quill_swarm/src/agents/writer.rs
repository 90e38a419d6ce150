//! Writer: drafts prose from the design.

use super::{token_budget, AgentBase};
use quill_core::{GenerateParams, GenerationResult, Message, SceneSpec};
use quill_error::ProviderResult;
use quill_models::AgentConfig;

const SYSTEM_PROMPT: &str = "You are the Writer of a novel-writing team. \
Write the scene described by the design as finished prose. \
Stay in the given point of view and output only the prose.";

/// What the Writer needs to draft a scene.
#[derive(Debug, Clone, Copy)]
pub struct DraftInput<'a> {
    /// Director design, possibly the zero value
    pub spec: &'a SceneSpec,
    /// Target length in words
    pub word_count: i64,
    /// Requested point of view
    pub pov_character: &'a str,
    /// Caller's intention, used when the design is empty
    pub intention: &'a str,
}

/// Drafts prose for a designed scene.
#[derive(Clone)]
pub struct WriterAgent {
    base: AgentBase,
}

impl WriterAgent {
    /// Bind the Writer to its configured provider.
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            base: AgentBase::from_config(config),
        }
    }

    /// Sampling parameters for a draft of `word_count` words.
    pub fn params(word_count: i64) -> GenerateParams {
        GenerateParams::new(0.8, token_budget(word_count.saturating_mul(2)))
    }

    /// Draft the scene.
    pub async fn draft(&self, input: DraftInput<'_>) -> ProviderResult<GenerationResult> {
        let messages = [
            Message::system(SYSTEM_PROMPT),
            Message::user(draft_prompt(&input)),
        ];
        self.base
            .generate(&messages, &Self::params(input.word_count))
            .await
    }
}

fn draft_prompt(input: &DraftInput<'_>) -> String {
    let pov = if input.pov_character.is_empty() {
        input.spec.constraints.pov_character.as_str()
    } else {
        input.pov_character
    };

    let mut prompt = format!("Write about {} words.\n", input.word_count);
    if !pov.is_empty() {
        prompt.push_str(&format!("Point of view: {pov}\n"));
    }

    if input.spec.is_empty() {
        prompt.push_str(&format!("\nScene intention:\n{}\n", input.intention));
    } else {
        // Serializing a plain data struct cannot fail; fall back to the intention if it somehow does.
        match serde_json::to_string_pretty(input.spec) {
            Ok(design) => prompt.push_str(&format!("\nScene design:\n{design}\n")),
            Err(_) => prompt.push_str(&format!("\nScene intention:\n{}\n", input.intention)),
        }
    }
    prompt
}
