//! Request validation error types.

/// Specific reasons a scene request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ValidationErrorKind {
    /// Request body is not valid JSON for a scene request
    #[display("invalid request body: {}", _0)]
    MalformedBody(String),
    /// Intention is empty after trimming
    #[display("intention is required")]
    MissingIntention,
    /// Intention exceeds the character ceiling
    #[display("intention must be at most {} characters (got {})", max, actual)]
    IntentionTooLong {
        /// Maximum allowed characters
        max: usize,
        /// Characters supplied
        actual: usize,
    },
    /// Chapter number is negative
    #[display("chapter must not be negative (got {})", _0)]
    NegativeChapter(i64),
    /// Scene number is negative
    #[display("scene must not be negative (got {})", _0)]
    NegativeScene(i64),
    /// Word count is outside the accepted range
    #[display("word_count must be between 0 and {} (got {})", max, actual)]
    WordCountOutOfRange {
        /// Maximum allowed word count
        max: i64,
        /// Word count supplied
        actual: i64,
    },
    /// Too many required events
    #[display("required_events must have at most {} items (got {})", max, actual)]
    TooManyEvents {
        /// Maximum allowed entries
        max: usize,
        /// Entries supplied
        actual: usize,
    },
    /// A single required event is too long
    #[display("required_events[{}] must be at most {} characters", index, max)]
    EventTooLong {
        /// Position of the offending entry
        index: usize,
        /// Maximum allowed characters
        max: usize,
    },
}

/// Request validation failure.
///
/// # Examples
///
/// ```
/// use quill_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(ValidationErrorKind::MissingIntention);
/// assert_eq!(err.kind.to_string(), "intention is required");
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    /// The specific rule that failed
    pub kind: ValidationErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new ValidationError at the current location.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
