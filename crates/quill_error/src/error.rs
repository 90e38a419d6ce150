//! Top-level error wrapper types.

use crate::{ConfigError, ProviderError, SwarmError, ValidationError};

/// Every error condition in the workspace.
///
/// # Examples
///
/// ```
/// use quill_error::{QuillError, ValidationError, ValidationErrorKind};
///
/// let err: QuillError = ValidationError::new(ValidationErrorKind::MissingIntention).into();
/// assert!(format!("{}", err).contains("intention is required"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum QuillErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Request validation error
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Provider or registry error
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Pipeline error
    #[from(SwarmError)]
    Swarm(SwarmError),
}

/// Quill error with kind discrimination.
///
/// # Examples
///
/// ```
/// use quill_error::{ConfigError, QuillErrorKind, QuillResult};
///
/// fn load() -> QuillResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// let err = load().unwrap_err();
/// assert!(matches!(err.kind(), QuillErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Quill Error: {}", _0)]
pub struct QuillError(Box<QuillErrorKind>);

impl QuillError {
    /// Create a new error from a kind.
    pub fn new(kind: QuillErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &QuillErrorKind {
        &self.0
    }
}

impl<T> From<T> for QuillError
where
    T: Into<QuillErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Quill operations.
pub type QuillResult<T> = std::result::Result<T, QuillError>;
