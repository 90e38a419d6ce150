//! Director: designs the scene.

use super::AgentBase;
use quill_core::{GenerateParams, GenerationResult, Message, SceneRequest};
use quill_error::ProviderResult;
use quill_models::AgentConfig;

const SYSTEM_PROMPT: &str = "You are the Director of a novel-writing team. \
Design the next scene as a single JSON object with the keys \
\"scene\" {id, chapter, sequence_in_chapter, title}, \
\"narrative\" {objective, summary, key_events, revelations, hooks}, \
\"constraints\" {pov_character, location, mood, characters_present}, \
\"continuity\" {facts_to_reinforce, foreshadowing_to_resolve, foreshadowing_to_plant} \
and optionally \"style\" {pacing, dialogue_ratio}. Respond with JSON only.";

/// Turns a scene request into a structured design.
#[derive(Clone)]
pub struct DirectorAgent {
    base: AgentBase,
}

impl DirectorAgent {
    /// Bind the Director to its configured provider.
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            base: AgentBase::from_config(config),
        }
    }

    /// Sampling parameters for a design call.
    pub fn params() -> GenerateParams {
        GenerateParams::new(0.5, 2000).with_json_mode()
    }

    /// Ask the provider for a scene design.
    ///
    /// Returns the raw output; parsing is left to the caller so that an
    /// unparseable design never counts as a provider failure.
    pub async fn design(&self, request: &SceneRequest) -> ProviderResult<GenerationResult> {
        let messages = [
            Message::system(SYSTEM_PROMPT),
            Message::user(design_prompt(request)),
        ];
        self.base.generate(&messages, &Self::params()).await
    }
}

fn design_prompt(request: &SceneRequest) -> String {
    let mut prompt = format!(
        "Scene id: {}\nChapter {}, scene {}\nTarget length: {} words\n\nIntention:\n{}\n",
        request.id, request.chapter, request.scene, request.word_count, request.intention
    );
    if !request.pov_character.is_empty() {
        prompt.push_str(&format!("\nPoint of view: {}\n", request.pov_character));
    }
    if !request.mood.is_empty() {
        prompt.push_str(&format!("Mood: {}\n", request.mood));
    }
    if !request.required_events.is_empty() {
        prompt.push_str("\nEvents that must happen:\n");
        for event in &request.required_events {
            prompt.push_str(&format!("- {event}\n"));
        }
    }
    prompt
}
