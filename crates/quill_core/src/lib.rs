//! Core data types for the Quill scene generation service.
//!
//! This crate holds the types shared by the provider layer, the swarm
//! pipeline and the HTTP surface, plus telemetry initialisation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod agent;
mod capabilities;
mod generation;
mod issue;
mod message;
mod params;
mod response;
mod role;
mod scene;
mod stage;
mod telemetry;
mod token_counting;

pub use agent::AgentRole;
pub use capabilities::ProviderCapabilities;
pub use generation::GenerationResult;
pub use issue::{Issue, IssueCategory, Severity};
pub use message::Message;
pub use params::GenerateParams;
pub use response::SceneResponse;
pub use role::Role;
pub use scene::{
    Continuity, Narrative, SceneConstraints, SceneMeta, SceneRequest, SceneSpec, SceneStyle,
    DEFAULT_CHAPTER, DEFAULT_SCENE, DEFAULT_WORD_COUNT, MAX_EVENT_CHARS, MAX_INTENTION_CHARS,
    MAX_REQUIRED_EVENTS, MAX_WORD_COUNT,
};
pub use stage::{Stage, StageInfo};
pub use telemetry::{init_telemetry, TelemetryConfig, TelemetryGuard};
pub use token_counting::estimate_tokens;
