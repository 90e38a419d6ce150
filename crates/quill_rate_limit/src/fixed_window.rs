//! Fixed-window request counting keyed by client.

use chrono::{DateTime, TimeDelta, Utc};
use derive_getters::Getters;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::{RateLimitError, RateLimitErrorKind};

/// Number of tracked keys above which expired windows are swept.
pub const DEFAULT_SWEEP_THRESHOLD: usize = 10_000;

/// Outcome of one rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct RateDecision {
    /// Whether the request may proceed
    allowed: bool,
    /// Configured requests per window
    limit: u32,
    /// Requests left in the current window
    remaining: u32,
    /// Unix time the current window resets
    reset_unix: i64,
}

impl RateDecision {
    /// Convert a denial into an error.
    ///
    /// # Errors
    ///
    /// Returns `LimitExceeded` when the request was not allowed.
    pub fn into_result(self) -> Result<Self, RateLimitError> {
        if self.allowed {
            Ok(self)
        } else {
            Err(RateLimitError::new(RateLimitErrorKind::LimitExceeded {
                limit: self.limit,
                reset_unix: self.reset_unix,
            }))
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Windows {
    entries: HashMap<String, Window>,
    next_sweep_at: Option<DateTime<Utc>>,
    sweeps: u64,
}

impl Windows {
    /// Drop expired windows, at most once per window length.
    fn sweep(&mut self, now: DateTime<Utc>, threshold: usize, window: TimeDelta) {
        if self.entries.len() <= threshold || self.next_sweep_at.is_some_and(|at| now < at) {
            return;
        }
        let before = self.entries.len();
        self.entries.retain(|_, w| now <= w.reset_at);
        self.next_sweep_at = Some(now + window);
        self.sweeps += 1;
        debug!(
            pruned = before - self.entries.len(),
            remaining = self.entries.len(),
            "Swept expired rate-limit windows"
        );
    }
}

/// Fixed-window rate limiter.
///
/// Windows are fixed, not sliding: up to twice the limit can pass across
/// the boundary of two adjacent windows.
///
/// Expired windows are swept once more than the sweep threshold of keys is
/// tracked, and no more than once per window length.
///
/// # Examples
///
/// ```
/// use chrono::{TimeDelta, Utc};
/// use quill_rate_limit::FixedWindowRateLimiter;
///
/// let limiter = FixedWindowRateLimiter::new(2, TimeDelta::seconds(60));
/// let now = Utc::now();
///
/// assert_eq!(*limiter.allow("10.0.0.1", now).remaining(), 1);
/// assert_eq!(*limiter.allow("10.0.0.1", now).remaining(), 0);
/// assert!(!*limiter.allow("10.0.0.1", now).allowed());
/// ```
#[derive(Debug)]
pub struct FixedWindowRateLimiter {
    limit: u32,
    window: TimeDelta,
    sweep_threshold: usize,
    windows: Mutex<Windows>,
}

impl FixedWindowRateLimiter {
    /// Create a limiter allowing `limit` requests per `window`.
    pub fn new(limit: u32, window: TimeDelta) -> Self {
        Self {
            limit,
            window,
            sweep_threshold: DEFAULT_SWEEP_THRESHOLD,
            windows: Mutex::new(Windows::default()),
        }
    }

    /// Set the number of tracked keys above which expired windows are swept.
    pub fn with_sweep_threshold(mut self, threshold: usize) -> Self {
        self.sweep_threshold = threshold;
        self
    }

    /// Keys currently holding a window, expired or not.
    pub fn tracked_keys(&self) -> usize {
        self.windows.lock().entries.len()
    }

    /// Expiry sweeps run so far.
    pub fn sweeps(&self) -> u64 {
        self.windows.lock().sweeps
    }

    /// Requests allowed per window.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Count a request from `key` at time `now`.
    ///
    /// A fresh window starts at `now` when the key has none or its window
    /// has passed its reset time. A denied request leaves the counter unchanged.
    pub fn allow(&self, key: &str, now: DateTime<Utc>) -> RateDecision {
        let mut windows = self.windows.lock();
        windows.sweep(now, self.sweep_threshold, self.window);

        let window = windows
            .entries
            .entry(key.to_string())
            .and_modify(|w| {
                if now > w.reset_at {
                    *w = Window {
                        count: 0,
                        reset_at: now + self.window,
                    };
                }
            })
            .or_insert_with(|| Window {
                count: 0,
                reset_at: now + self.window,
            });

        let reset_unix = window.reset_at.timestamp();
        if window.count >= self.limit {
            trace!(key, limit = self.limit, "Rate limit exceeded");
            return RateDecision {
                allowed: false,
                limit: self.limit,
                remaining: 0,
                reset_unix,
            };
        }

        window.count += 1;
        RateDecision {
            allowed: true,
            limit: self.limit,
            remaining: self.limit - window.count,
            reset_unix,
        }
    }
}
