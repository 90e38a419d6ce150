//! Pipeline metrics.

use opentelemetry::{
    global,
    metrics::{Counter, Histogram},
    KeyValue,
};
use std::sync::OnceLock;

static METRICS: OnceLock<SwarmMetrics> = OnceLock::new();

/// Metrics for swarm pipeline runs.
#[derive(Clone)]
pub struct SwarmMetrics {
    /// Pipeline runs by outcome
    pub runs: Counter<u64>,
    /// Pipeline duration in seconds
    pub run_duration: Histogram<f64>,
    /// Stage duration in seconds
    pub stage_duration: Histogram<f64>,
    /// Degraded Checker or Editor stages
    pub degraded: Counter<u64>,
    /// Editor revisions applied
    pub revisions: Counter<u64>,
    /// How Director designs were recovered
    pub design_source: Counter<u64>,
    /// Commit queue events by outcome
    pub commits: Counter<u64>,
}

impl SwarmMetrics {
    fn init() -> Self {
        let meter = global::meter("quill_swarm");

        Self {
            runs: meter
                .u64_counter("swarm.runs")
                .with_description("Pipeline runs by outcome")
                .build(),
            run_duration: meter
                .f64_histogram("swarm.duration")
                .with_unit("s")
                .with_description("Pipeline duration")
                .build(),
            stage_duration: meter
                .f64_histogram("swarm.stage.duration")
                .with_unit("s")
                .with_description("Stage duration")
                .build(),
            degraded: meter
                .u64_counter("swarm.stage.degraded")
                .with_description("Stages that fell back after a failure")
                .build(),
            revisions: meter
                .u64_counter("swarm.revisions")
                .with_description("Editor revisions applied")
                .build(),
            design_source: meter
                .u64_counter("swarm.design.source")
                .with_description("How scene designs were recovered")
                .build(),
            commits: meter
                .u64_counter("swarm.commits")
                .with_description("Commit queue events")
                .build(),
        }
    }

    /// Get the global instance.
    pub fn get() -> &'static Self {
        METRICS.get_or_init(Self::init)
    }

    /// Record a finished or aborted run.
    pub fn record_run(&self, outcome: &'static str, duration_ms: u64) {
        let labels = &[KeyValue::new("outcome", outcome)];
        self.runs.add(1, labels);
        self.run_duration.record(duration_ms as f64 / 1000.0, labels);
    }

    /// Record a stage duration.
    pub fn record_stage(&self, operation: &str, duration_ms: u64) {
        self.stage_duration.record(
            duration_ms as f64 / 1000.0,
            &[KeyValue::new("operation", operation.to_string())],
        );
    }

    /// Record a degraded stage.
    pub fn record_degraded(&self, operation: &'static str) {
        self.degraded.add(1, &[KeyValue::new("operation", operation)]);
    }

    /// Record an applied revision.
    pub fn record_revision(&self) {
        self.revisions.add(1, &[]);
    }

    /// Record how a design was recovered.
    pub fn record_design_source(&self, source: &'static str) {
        self.design_source.add(1, &[KeyValue::new("source", source)]);
    }

    /// Record a commit queue event.
    pub fn record_commit(&self, outcome: &'static str) {
        self.commits.add(1, &[KeyValue::new("outcome", outcome)]);
    }
}
