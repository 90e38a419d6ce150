//! Pipeline response.

use crate::{Issue, SceneSpec, StageInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of one pipeline run.
///
/// Created at orchestration start, filled in by each stage and returned once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneResponse {
    /// Scene identifier from the request
    pub request_id: String,
    /// When the run started
    pub timestamp: DateTime<Utc>,
    /// Executed stages in order
    pub stages: Vec<StageInfo>,
    /// Director design, possibly the zero value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenespec: Option<SceneSpec>,
    /// Checker findings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<Issue>,
    /// Whether the Editor replaced the text
    pub revision_made: bool,
    /// Final prose
    pub text: String,
    /// Wall-clock duration of the run
    pub total_duration_ms: u64,
}

impl SceneResponse {
    /// Empty response stamped with the current time.
    pub fn start(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            timestamp: Utc::now(),
            stages: Vec::new(),
            scenespec: None,
            issues: Vec::new(),
            revision_made: false,
            text: String::new(),
            total_duration_ms: 0,
        }
    }
}
