//! Request statistics for the stats endpoint.
//!
//! One lock guards counters and a bounded ring of recent latencies.
//! Snapshots copy the ring under the lock and sort outside it.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

/// Default number of latencies kept for percentiles.
pub const LATENCY_CAPACITY: usize = 4096;

/// Point-in-time view of request statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// When the process started counting
    pub started_at: DateTime<Utc>,
    /// Seconds since start
    pub uptime_seconds: f64,
    /// Completed requests
    pub requests_total: u64,
    /// Completed requests per minute of uptime
    pub requests_per_minute: f64,
    /// Requests currently being served
    pub in_flight: u64,
    /// Completed requests by HTTP status
    pub status_counts: BTreeMap<u16, u64>,
    /// Median latency of recent requests
    pub latency_ms_p50: f64,
    /// 95th percentile latency of recent requests
    pub latency_ms_p95: f64,
}

#[derive(Debug, Default)]
struct Counters {
    total: u64,
    in_flight: u64,
    status_counts: BTreeMap<u16, u64>,
    latencies: VecDeque<Duration>,
}

/// Thread-safe request statistics.
#[derive(Debug)]
pub struct StatsStore {
    started_at: DateTime<Utc>,
    started: Instant,
    capacity: usize,
    counters: Mutex<Counters>,
}

impl Default for StatsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsStore {
    /// Create a store with the default latency capacity.
    pub fn new() -> Self {
        Self::with_capacity(LATENCY_CAPACITY)
    }

    /// Create a store keeping at most `capacity` latencies.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            started_at: Utc::now(),
            started: Instant::now(),
            capacity,
            counters: Mutex::new(Counters {
                latencies: VecDeque::with_capacity(capacity),
                ..Counters::default()
            }),
        }
    }

    /// Mark a request as started.
    pub fn begin_request(&self) {
        self.counters.lock().in_flight += 1;
    }

    /// Record a finished request.
    pub fn end_request(&self, status: u16, latency: Duration) {
        let mut counters = self.counters.lock();
        counters.in_flight = counters.in_flight.saturating_sub(1);
        counters.total += 1;
        *counters.status_counts.entry(status).or_default() += 1;

        if counters.latencies.len() >= self.capacity {
            counters.latencies.pop_front();
        }
        counters.latencies.push_back(latency);
    }

    /// Current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        let (total, in_flight, status_counts, mut latencies) = {
            let counters = self.counters.lock();
            (
                counters.total,
                counters.in_flight,
                counters.status_counts.clone(),
                counters.latencies.iter().copied().collect::<Vec<_>>(),
            )
        };
        latencies.sort_unstable();

        let uptime = self.started.elapsed().as_secs_f64();
        let minutes = uptime / 60.0;
        let requests_per_minute = if minutes > 0.0 {
            total as f64 / minutes
        } else {
            0.0
        };

        StatsSnapshot {
            started_at: self.started_at,
            uptime_seconds: uptime,
            requests_total: total,
            requests_per_minute,
            in_flight,
            status_counts,
            latency_ms_p50: percentile_ms(&latencies, 0.50),
            latency_ms_p95: percentile_ms(&latencies, 0.95),
        }
    }
}

/// Nearest-rank percentile over sorted values, in milliseconds.
fn percentile_ms(sorted: &[Duration], percentile: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (percentile.clamp(0.0, 1.0) * sorted.len() as f64).ceil() as usize;
    let index = rank.saturating_sub(1).min(sorted.len() - 1);
    sorted[index].as_nanos() as f64 / 1_000_000.0
}
