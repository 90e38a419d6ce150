//! Editor: revises a draft against Checker findings.

use super::{token_budget, AgentBase};
use quill_core::{GenerateParams, GenerationResult, Issue, Message};
use quill_error::ProviderResult;
use quill_models::AgentConfig;

const SYSTEM_PROMPT: &str = "You are the Editor of a novel-writing team. \
Revise the scene so that every listed problem is fixed while keeping \
voice, length and events intact. Output only the revised prose.";

/// What the Editor needs to revise a draft.
#[derive(Debug, Clone, Copy)]
pub struct ReviseInput<'a> {
    /// Current prose
    pub text: &'a str,
    /// All Checker findings; only actionable ones reach the prompt
    pub issues: &'a [Issue],
}

/// Produces a single revision of a draft.
#[derive(Clone)]
pub struct EditorAgent {
    base: AgentBase,
}

impl EditorAgent {
    /// Bind the Editor to its configured provider.
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            base: AgentBase::from_config(config),
        }
    }

    /// Sampling parameters for revising `text`.
    pub fn params(text: &str) -> GenerateParams {
        let chars = i64::try_from(text.chars().count()).unwrap_or(i64::MAX);
        GenerateParams::new(0.4, token_budget(chars.saturating_add(500)))
    }

    /// Revise the draft.
    pub async fn revise(&self, input: ReviseInput<'_>) -> ProviderResult<GenerationResult> {
        let messages = [
            Message::system(SYSTEM_PROMPT),
            Message::user(revise_prompt(&input)),
        ];
        self.base
            .generate(&messages, &Self::params(input.text))
            .await
    }
}

fn revise_prompt(input: &ReviseInput<'_>) -> String {
    let mut prompt = String::from("Problems to fix:\n");
    for issue in input.issues.iter().filter(|i| i.severity.is_actionable()) {
        prompt.push_str(&format!(
            "- [{}/{}] {}",
            issue.severity, issue.category, issue.description
        ));
        if let Some(location) = &issue.location {
            prompt.push_str(&format!(" (at {location})"));
        }
        if let Some(suggestion) = &issue.suggestion {
            prompt.push_str(&format!(" Suggestion: {suggestion}"));
        }
        prompt.push('\n');
    }
    prompt.push_str("\nScene text:\n");
    prompt.push_str(input.text);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::{IssueCategory, Severity};

    #[test]
    fn test_info_issues_are_suppressed() {
        let issues = vec![
            Issue::new(IssueCategory::Fact, Severity::Error, "Eye colour changed"),
            Issue::new(IssueCategory::World, Severity::Info, "Consider more rain"),
        ];
        let prompt = revise_prompt(&ReviseInput {
            text: "Her green eyes.",
            issues: &issues,
        });
        assert!(prompt.contains("[error/fact] Eye colour changed"));
        assert!(!prompt.contains("rain"));
    }

    #[test]
    fn test_params_scale_with_text() {
        assert_eq!(EditorAgent::params("abcd").max_tokens, 504);
    }
}
