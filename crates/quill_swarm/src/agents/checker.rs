//! Checker: reports continuity issues in a draft.

use super::{truncate_chars, AgentBase};
use crate::extraction::parse_issues;
use quill_core::{GenerateParams, GenerationResult, Issue, Message};
use quill_error::ProviderResult;
use quill_models::AgentConfig;
use tracing::warn;

/// Characters of draft text shown to the Checker.
pub const CHECKER_TEXT_LIMIT: usize = 2000;

const SYSTEM_PROMPT: &str = "You are the continuity Checker of a novel-writing team. \
Read the scene and list every continuity problem as a JSON array of objects with \
\"category\" (fact, character, world or pov), \"severity\" (error, warning or info), \
\"description\" and optionally \"location\" and \"suggestion\". \
Respond with [] when the scene is consistent.";

/// What the Checker needs to validate a draft.
#[derive(Debug, Clone, Copy)]
pub struct CheckInput<'a> {
    /// Draft prose, truncated before prompting
    pub text: &'a str,
    /// Chapter number
    pub chapter: i64,
    /// Scene number
    pub scene: i64,
    /// Expected point of view
    pub pov_character: &'a str,
}

/// Validates drafted prose.
#[derive(Clone)]
pub struct CheckerAgent {
    base: AgentBase,
}

impl CheckerAgent {
    /// Bind the Checker to its configured provider.
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            base: AgentBase::from_config(config),
        }
    }

    /// Sampling parameters for a check.
    pub fn params() -> GenerateParams {
        GenerateParams::new(0.2, 1000)
    }

    /// Check the draft.
    ///
    /// Output that holds no issue array is treated as "no issues".
    ///
    /// # Errors
    ///
    /// Only provider failures are returned.
    pub async fn check(
        &self,
        input: CheckInput<'_>,
    ) -> ProviderResult<(GenerationResult, Vec<Issue>)> {
        let messages = [
            Message::system(SYSTEM_PROMPT),
            Message::user(check_prompt(&input)),
        ];
        let result = self.base.generate(&messages, &Self::params()).await?;

        let issues = match parse_issues(&result.text) {
            Some(issues) => issues,
            None => {
                warn!(
                    agent = %self.base.role(),
                    response_length = result.text.len(),
                    "Checker output held no issue list, assuming no issues"
                );
                Vec::new()
            }
        };
        Ok((result, issues))
    }
}

fn check_prompt(input: &CheckInput<'_>) -> String {
    let mut prompt = format!("Chapter {}, scene {}\n", input.chapter, input.scene);
    if !input.pov_character.is_empty() {
        prompt.push_str(&format!("Expected point of view: {}\n", input.pov_character));
    }
    prompt.push_str("\nScene text:\n");
    prompt.push_str(truncate_chars(input.text, CHECKER_TEXT_LIMIT));
    prompt
}
