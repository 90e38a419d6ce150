//! Trait definitions for backends and collaborators.

use crate::SceneRecord;
use async_trait::async_trait;
use quill_core::{GenerateParams, GenerationResult, Message, ProviderCapabilities};
use quill_error::{ProviderResult, QuillResult};

/// Uniform contract over a text-generation backend.
///
/// Construction must not touch the network; `health_check` is the only
/// liveness probe. Dropping a `generate` future cancels the call.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate a completion for the conversation.
    async fn generate(
        &self,
        messages: &[Message],
        params: &GenerateParams,
    ) -> ProviderResult<GenerationResult>;

    /// Declared backend properties.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Probe the backend for liveness.
    async fn health_check(&self) -> ProviderResult<()>;

    /// Provider type name (e.g., "ollama", "anthropic").
    fn name(&self) -> &'static str;

    /// Model identifier.
    fn model_name(&self) -> &str;
}

/// Durable narrative memory that committed scenes are folded into.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Persist one committed scene.
    async fn commit_scene(&self, record: SceneRecord) -> QuillResult<()>;
}
