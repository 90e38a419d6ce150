//! Error types for admission control.

/// Why a request was not admitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RateLimitErrorKind {
    /// Fixed-window budget spent for this key
    #[display("rate limit of {} exceeded; window resets at {}", limit, reset_unix)]
    LimitExceeded {
        /// Requests allowed per window
        limit: u32,
        /// Unix time the window resets
        reset_unix: i64,
    },
    /// Every concurrency slot is taken
    #[display("all {} concurrency slots are in use", _0)]
    Saturated(usize),
}

/// Admission failure with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Rate Limit Error: {} at line {} in {}", kind, line, file)]
pub struct RateLimitError {
    kind: RateLimitErrorKind,
    line: u32,
    file: &'static str,
}

impl RateLimitError {
    /// Create a new admission error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RateLimitErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RateLimitErrorKind {
        &self.kind
    }
}
