//! Provider and registry error types.

/// Error conditions raised by text-generation backends and the provider registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ProviderErrorKind {
    /// Generation failed for a reason the backend did not classify
    #[display("{} generation failed: {}", provider, cause)]
    GenerationFailed {
        /// Provider type name
        provider: String,
        /// Underlying cause
        cause: String,
    },
    /// The call was cancelled or exceeded its deadline
    #[display("{} request timed out", _0)]
    Timeout(String),
    /// The backend answered with an error status
    #[display("{} rejected the request (status {}): {}", provider, status, message)]
    Rejected {
        /// Provider type name
        provider: String,
        /// HTTP status code
        status: u16,
        /// Error message from the backend
        message: String,
    },
    /// The backend response could not be decoded
    #[display("{} returned an unreadable response: {}", provider, message)]
    Decode {
        /// Provider type name
        provider: String,
        /// Decoder message
        message: String,
    },
    /// Liveness probe failed
    #[display("{} health check failed: {}", provider, message)]
    HealthCheckFailed {
        /// Provider type name
        provider: String,
        /// Failure description
        message: String,
    },
    /// No constructor is registered for the requested type
    #[display("provider type not registered: {}", _0)]
    UnregisteredProviderType(String),
    /// A named provider configuration carries no type
    #[display("provider {} has no type", _0)]
    MissingProviderType(String),
    /// Provider configuration is unusable
    #[display("invalid provider configuration: {}", _0)]
    InvalidConfiguration(String),
}

/// Provider error with source location.
///
/// # Examples
///
/// ```
/// use quill_error::{ProviderError, ProviderErrorKind};
///
/// let err = ProviderError::new(ProviderErrorKind::UnregisteredProviderType("bogus".into()));
/// assert!(err.to_string().contains("bogus"));
/// assert!(!err.is_timeout());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error: {} at line {} in {}", kind, line, file)]
pub struct ProviderError {
    /// The specific error condition
    pub kind: ProviderErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new ProviderError at the current location.
    #[track_caller]
    pub fn new(kind: ProviderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for an unclassified generation failure.
    #[track_caller]
    pub fn generation_failed(provider: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::GenerationFailed {
            provider: provider.into(),
            cause: cause.into(),
        })
    }

    /// Whether the failure was a timeout or cancellation rather than a backend rejection.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ProviderErrorKind::Timeout(_))
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
