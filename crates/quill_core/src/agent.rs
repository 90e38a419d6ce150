//! Agent roles in the swarm pipeline.

use serde::{Deserialize, Serialize};

/// One of the five pipeline roles, in execution order.
///
/// # Examples
///
/// ```
/// use quill_core::AgentRole;
/// use strum::IntoEnumIterator;
///
/// let names: Vec<String> = AgentRole::iter().map(|r| r.to_string()).collect();
/// assert_eq!(names, ["director", "writer", "checker", "editor", "committer"]);
/// assert_eq!("Writer".parse::<AgentRole>().unwrap(), AgentRole::Writer);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AgentRole {
    /// Designs the scene
    Director,
    /// Drafts prose
    Writer,
    /// Finds continuity problems
    Checker,
    /// Revises prose against issues
    Editor,
    /// Folds the result into memory
    Committer,
}
