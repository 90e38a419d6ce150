//! Admission-control limiters.
//!
//! Two independent process-local limiters guard the generation endpoint:
//! - [`FixedWindowRateLimiter`] counts requests per client key in
//!   discrete, non-overlapping windows
//! - [`ConcurrencyLimiter`] bounds in-flight requests and rejects rather
//!   than queues when saturated

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod concurrency;
mod error;
mod fixed_window;

pub use concurrency::{ConcurrencyLimiter, ConcurrencyPermit};
pub use error::{RateLimitError, RateLimitErrorKind};
pub use fixed_window::{FixedWindowRateLimiter, RateDecision, DEFAULT_SWEEP_THRESHOLD};
