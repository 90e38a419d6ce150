//! Error types for the Quill workspace.
//!
//! Every error follows the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum names the specific condition
//! - `*Error` struct wraps the kind with the source location it was raised at
//! - constructors use `#[track_caller]` so the location is captured automatically
//!
//! # Examples
//!
//! ```
//! use quill_error::{QuillResult, ValidationError, ValidationErrorKind};
//!
//! fn check(intention: &str) -> QuillResult<()> {
//!     if intention.trim().is_empty() {
//!         return Err(ValidationError::new(ValidationErrorKind::MissingIntention).into());
//!     }
//!     Ok(())
//! }
//!
//! assert!(check("  ").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod provider;
mod swarm;
mod validation;

pub use config::ConfigError;
pub use error::{QuillError, QuillErrorKind, QuillResult};
pub use provider::{ProviderError, ProviderErrorKind, ProviderResult};
pub use swarm::{SwarmError, SwarmErrorKind, SwarmResult};
pub use validation::{ValidationError, ValidationErrorKind};
