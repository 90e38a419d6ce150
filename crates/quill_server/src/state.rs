//! Shared application state.

use crate::{AdmissionConfig, StatsStore};
use chrono::TimeDelta;
use derive_getters::Getters;
use quill_rate_limit::{ConcurrencyLimiter, FixedWindowRateLimiter};
use quill_swarm::Swarm;
use std::sync::Arc;

/// Everything handlers and middleware share.
#[derive(Clone, Getters)]
pub struct AppState {
    /// Scene pipeline
    swarm: Arc<Swarm>,
    /// Request statistics
    stats: Arc<StatsStore>,
    /// Per-client fixed-window limiter
    rate_limiter: Arc<FixedWindowRateLimiter>,
    /// In-flight generation bound
    concurrency: ConcurrencyLimiter,
    /// Limits in force
    admission: AdmissionConfig,
}

impl AppState {
    /// Build state and limiters from `admission`.
    pub fn new(swarm: Arc<Swarm>, admission: AdmissionConfig) -> Self {
        let window = TimeDelta::from_std(admission.rate_window).unwrap_or(TimeDelta::minutes(1));
        Self {
            swarm,
            stats: Arc::new(StatsStore::new()),
            rate_limiter: Arc::new(FixedWindowRateLimiter::new(
                admission.rate_limit_per_minute,
                window,
            )),
            concurrency: ConcurrencyLimiter::new(admission.max_concurrent),
            admission,
        }
    }
}
