//! Continuity issues reported by the Checker.
//!
//! Severity and category names are matched case-insensitively when read,
//! and always written in lowercase.

use serde::{Deserialize, Serialize};

/// How serious an issue is.
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
)]
#[serde(rename_all = "lowercase", try_from = "String")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Severity {
    /// Must be fixed
    Error,
    /// Should be fixed
    Warning,
    /// Informational only
    Info,
}

impl Severity {
    /// Whether the issue is surfaced to the Editor.
    pub fn is_actionable(self) -> bool {
        matches!(self, Severity::Error | Severity::Warning)
    }
}

impl TryFrom<String> for Severity {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, <Self as TryFrom<String>>::Error> {
        value.trim().parse()
    }
}

/// What kind of continuity an issue breaks.
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
)]
#[serde(rename_all = "lowercase", try_from = "String")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum IssueCategory {
    /// Contradicts an established fact
    Fact,
    /// Character acts out of profile
    Character,
    /// Breaks world rules
    World,
    /// Point-of-view slip
    Pov,
}

impl TryFrom<String> for IssueCategory {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.trim().parse()
    }
}

/// One detected problem in drafted prose.
///
/// # Examples
///
/// ```
/// use quill_core::{Issue, IssueCategory, Severity};
///
/// let issue: Issue = serde_json::from_str(
///     r#"{"category": "pov", "severity": "warning", "description": "Head hop"}"#,
/// )?;
/// assert_eq!(issue.category, IssueCategory::Pov);
/// assert!(issue.severity.is_actionable());
/// assert!(issue.suggestion.is_none());
///
/// let shouted: Issue = serde_json::from_str(r#"{"category": "FACT", "severity": "Error"}"#)?;
/// assert_eq!(shouted.severity, Severity::Error);
/// assert!(shouted.description.is_empty());
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Continuity category
    pub category: IssueCategory,
    /// Severity
    pub severity: Severity,
    /// What is wrong
    #[serde(default)]
    pub description: String,
    /// Where in the text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// How to fix it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Issue {
    /// Create an issue without location or suggestion.
    pub fn new(category: IssueCategory, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            category,
            severity,
            description: description.into(),
            location: None,
            suggestion: None,
        }
    }
}
