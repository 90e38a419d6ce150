//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Speaker of a chat message.
///
/// Serializes in the lowercase form every chat backend expects.
///
/// # Examples
///
/// ```
/// use quill_core::Role;
///
/// assert_eq!(Role::System.to_string(), "system");
/// assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
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
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the conversation
    #[display("system")]
    System,
    /// Content supplied by the caller
    #[display("user")]
    User,
    /// Content produced by the model
    #[display("assistant")]
    Assistant,
}
