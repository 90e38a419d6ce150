//! Pipeline error types.

use crate::ProviderError;

/// Failure conditions of a swarm pipeline run.
///
/// Only `DirectorFailed` and `WriterFailed` abort a run. The remaining kinds
/// describe degradations that are logged and absorbed.
#[derive(Debug, Clone, derive_more::Display)]
pub enum SwarmErrorKind {
    /// Director backend call failed
    #[display("director failed: {}", _0)]
    DirectorFailed(ProviderError),
    /// Writer backend call failed
    #[display("writer failed: {}", _0)]
    WriterFailed(ProviderError),
    /// Checker failed; the run continues with no issues
    #[display("checker degraded: {}", _0)]
    CheckerDegraded(String),
    /// Editor failed; the run keeps the unrevised text
    #[display("editor degraded: {}", _0)]
    EditorDegraded(String),
    /// Memory commit failed or was dropped
    #[display("commit failed: {}", _0)]
    CommitFailed(String),
}

/// Swarm error with source location.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Swarm Error: {} at line {} in {}", kind, line, file)]
pub struct SwarmError {
    /// The specific error condition
    pub kind: SwarmErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl SwarmError {
    /// Create a new SwarmError at the current location.
    #[track_caller]
    pub fn new(kind: SwarmErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether a backend timeout caused this failure.
    pub fn is_timeout(&self) -> bool {
        match &self.kind {
            SwarmErrorKind::DirectorFailed(e) | SwarmErrorKind::WriterFailed(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Result type for pipeline runs.
pub type SwarmResult<T> = std::result::Result<T, SwarmError>;
