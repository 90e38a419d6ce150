//! Admission configuration from the environment.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable for the body size ceiling in bytes.
pub const ENV_MAX_BODY_BYTES: &str = "QUILL_MAX_BODY_BYTES";
/// Environment variable for the request timeout in seconds.
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "QUILL_REQUEST_TIMEOUT_SECS";
/// Environment variable for the in-flight request ceiling.
pub const ENV_MAX_CONCURRENT: &str = "QUILL_MAX_CONCURRENT";
/// Environment variable for the per-client requests per minute.
pub const ENV_RATE_LIMIT_PER_MINUTE: &str = "QUILL_RATE_LIMIT_PER_MINUTE";

/// Default body size ceiling (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Default request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
/// Default in-flight request ceiling.
pub const DEFAULT_MAX_CONCURRENT: usize = 8;
/// Default per-client requests per window.
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 30;
/// Rate-limit window length.
pub const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Limits applied to the generation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionConfig {
    /// Largest accepted request body
    pub max_body_bytes: usize,
    /// Deadline for one generation request
    pub request_timeout: Duration,
    /// Generation requests allowed in flight at once
    pub max_concurrent: usize,
    /// Requests per client per window
    pub rate_limit_per_minute: u32,
    /// Fixed window length
    pub rate_window: Duration,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            rate_window: RATE_WINDOW,
        }
    }
}

impl AdmissionConfig {
    /// Read limits from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read limits through `lookup`.
    ///
    /// Missing, unparseable and zero values fall back to defaults; startup
    /// never fails here.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            max_body_bytes: positive(&lookup, ENV_MAX_BODY_BYTES, DEFAULT_MAX_BODY_BYTES),
            request_timeout: Duration::from_secs(positive(
                &lookup,
                ENV_REQUEST_TIMEOUT_SECS,
                DEFAULT_REQUEST_TIMEOUT.as_secs(),
            )),
            max_concurrent: positive(&lookup, ENV_MAX_CONCURRENT, DEFAULT_MAX_CONCURRENT),
            rate_limit_per_minute: positive(
                &lookup,
                ENV_RATE_LIMIT_PER_MINUTE,
                DEFAULT_RATE_LIMIT_PER_MINUTE,
            ),
            rate_window: RATE_WINDOW,
        };
        debug!(?config, "Admission configuration loaded");
        config
    }
}

fn positive<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Default + Display + Copy,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => value,
        _ => {
            warn!(key, value = %raw, default = %default, "Invalid admission setting, using default");
            default
        }
    }
}
