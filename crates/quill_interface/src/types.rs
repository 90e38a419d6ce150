//! Data types shared across trait implementations.

use derive_getters::Getters;
use quill_core::{AgentRole, ProviderCapabilities};
use serde::{Deserialize, Serialize};

/// Liveness of the provider behind one agent role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyHealth {
    /// Agent role the provider serves
    pub name: AgentRole,
    /// Configured provider name
    pub provider: String,
    /// Whether the probe succeeded in time
    pub healthy: bool,
    /// Probe failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Declared backend properties
    pub capabilities: ProviderCapabilities,
}

/// What the Committer writes into memory for one scene.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Getters)]
pub struct SceneRecord {
    /// Scene identifier
    scene_id: String,
    /// Chapter number
    chapter: i64,
    /// Scene number
    scene: i64,
    /// Short summary for episodic memory
    summary: String,
    /// Point-of-view character, if known
    pov_character: Option<String>,
    /// Key events from the scene design
    key_events: Vec<String>,
    /// Facts established by the scene
    facts: Vec<String>,
    /// Foreshadowing ids paid off
    foreshadowing_resolved: Vec<String>,
    /// Foreshadowing introduced
    foreshadowing_planted: Vec<String>,
}

impl SceneRecord {
    /// Start a record for the given scene.
    pub fn new(scene_id: impl Into<String>, chapter: i64, scene: i64) -> Self {
        Self {
            scene_id: scene_id.into(),
            chapter,
            scene,
            ..Self::default()
        }
    }

    /// Set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Set the point-of-view character.
    pub fn with_pov_character(mut self, pov: Option<String>) -> Self {
        self.pov_character = pov;
        self
    }

    /// Set the key events.
    pub fn with_key_events(mut self, events: Vec<String>) -> Self {
        self.key_events = events;
        self
    }

    /// Set the extracted facts.
    pub fn with_facts(mut self, facts: Vec<String>) -> Self {
        self.facts = facts;
        self
    }

    /// Set resolved and planted foreshadowing.
    pub fn with_foreshadowing(mut self, resolved: Vec<String>, planted: Vec<String>) -> Self {
        self.foreshadowing_resolved = resolved;
        self.foreshadowing_planted = planted;
        self
    }
}
