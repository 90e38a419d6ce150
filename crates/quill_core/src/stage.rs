//! Pipeline stage trace entries.

use crate::{AgentRole, GenerationResult};
use serde::{Deserialize, Serialize};

/// A pipeline stage and the operation it performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Director designs the scene
    Design,
    /// Writer drafts prose
    Draft,
    /// Checker validates the draft
    Validate,
    /// Editor revises against issues
    Revise,
    /// Committer folds the result into memory
    Commit,
}

impl Stage {
    /// The agent that runs this stage.
    pub fn agent(self) -> AgentRole {
        match self {
            Stage::Design => AgentRole::Director,
            Stage::Draft => AgentRole::Writer,
            Stage::Validate => AgentRole::Checker,
            Stage::Revise => AgentRole::Editor,
            Stage::Commit => AgentRole::Committer,
        }
    }

    /// Operation label recorded in the trace.
    pub fn operation(self) -> &'static str {
        match self {
            Stage::Design => "design_scene",
            Stage::Draft => "generate_prose",
            Stage::Validate => "validate",
            Stage::Revise => "fix_issues",
            Stage::Commit => "commit_scene",
        }
    }
}

/// One executed stage in a pipeline run.
///
/// # Examples
///
/// ```
/// use quill_core::{GenerationResult, Stage, StageInfo, AgentRole};
///
/// let result = GenerationResult { prompt_tokens: 10, completion_tokens: 5, duration_ms: 42, ..Default::default() };
/// let info = StageInfo::completed(Stage::Draft, &result);
/// assert_eq!(info.agent, AgentRole::Writer);
/// assert_eq!(info.operation, "generate_prose");
/// assert_eq!((info.duration_ms, info.tokens), (42, 15));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageInfo {
    /// Agent that ran
    pub agent: AgentRole,
    /// Operation label
    pub operation: String,
    /// Stage duration
    pub duration_ms: u64,
    /// Tokens consumed
    pub tokens: u32,
}

impl StageInfo {
    /// Trace entry for a stage whose provider call succeeded.
    pub fn completed(stage: Stage, result: &GenerationResult) -> Self {
        Self::new(stage, result.duration_ms, result.total_tokens())
    }

    /// Trace entry for a stage whose provider call failed.
    pub fn attempted(stage: Stage, duration_ms: u64) -> Self {
        Self::new(stage, duration_ms, 0)
    }

    fn new(stage: Stage, duration_ms: u64, tokens: u32) -> Self {
        Self {
            agent: stage.agent(),
            operation: stage.operation().to_string(),
            duration_ms,
            tokens,
        }
    }
}
