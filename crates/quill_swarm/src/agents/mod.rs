//! Role-specialized agents.
//!
//! Each agent binds one provider, shapes the prompt for its stage and
//! interprets the output. Inputs are typed per stage.

mod checker;
mod committer;
mod director;
mod editor;
mod writer;

pub use checker::{CheckInput, CheckerAgent, CHECKER_TEXT_LIMIT};
pub use committer::{CommitterAgent, FACT_TEXT_LIMIT, MAX_EXTRACTED_FACTS};
pub use director::DirectorAgent;
pub use editor::{EditorAgent, ReviseInput};
pub use writer::{DraftInput, WriterAgent};

use quill_core::{AgentRole, GenerateParams, GenerationResult, Message};
use quill_error::ProviderResult;
use quill_interface::Provider;
use quill_models::{AgentConfig, LlmMetrics};
use std::sync::Arc;
use tracing::{debug, warn};

/// Provider binding shared by every agent.
#[derive(Clone)]
pub(crate) struct AgentBase {
    role: AgentRole,
    provider_name: String,
    provider: Arc<dyn Provider>,
}

impl AgentBase {
    pub(crate) fn from_config(config: &AgentConfig) -> Self {
        Self {
            role: *config.role(),
            provider_name: config.provider_name().clone(),
            provider: Arc::clone(config.provider()),
        }
    }

    pub(crate) fn role(&self) -> AgentRole {
        self.role
    }

    /// Call the provider and record metrics for the outcome.
    pub(crate) async fn generate(
        &self,
        messages: &[Message],
        params: &GenerateParams,
    ) -> ProviderResult<GenerationResult> {
        let backend = self.provider.name();
        let model = self.provider.model_name();
        debug!(
            agent = %self.role,
            provider = %self.provider_name,
            backend,
            model,
            max_tokens = params.max_tokens,
            json_mode = params.json_mode,
            "Calling provider"
        );

        match self.provider.generate(messages, params).await {
            Ok(result) => {
                LlmMetrics::get().record_success(backend, model, &result);
                debug!(
                    agent = %self.role,
                    duration_ms = result.duration_ms,
                    prompt_tokens = result.prompt_tokens,
                    completion_tokens = result.completion_tokens,
                    "Provider call completed"
                );
                Ok(result)
            }
            Err(e) => {
                LlmMetrics::get().record_error(backend, model, &e);
                warn!(agent = %self.role, provider = %self.provider_name, error = %e, "Provider call failed");
                Err(e)
            }
        }
    }
}

/// First `limit` characters of `text`.
pub(crate) fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Clamp a token budget into the provider parameter range.
pub(crate) fn token_budget(value: i64) -> u32 {
    u32::try_from(value.max(1)).unwrap_or(u32::MAX)
}
