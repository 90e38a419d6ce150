//! Metrics for provider calls.
//!
//! OpenTelemetry instruments labelled by provider and model. They report
//! through the global meter provider and cost nothing when none is installed.

use opentelemetry::{
    global,
    metrics::{Counter, Histogram},
    KeyValue,
};
use quill_core::GenerationResult;
use quill_error::{ProviderError, ProviderErrorKind};
use std::sync::OnceLock;

static METRICS: OnceLock<LlmMetrics> = OnceLock::new();

/// Metrics for provider interactions.
#[derive(Clone)]
pub struct LlmMetrics {
    /// Successful provider calls
    pub requests: Counter<u64>,
    /// Failed provider calls
    pub errors: Counter<u64>,
    /// Call duration in seconds
    pub duration: Histogram<f64>,
    /// Prompt tokens used
    pub prompt_tokens: Counter<u64>,
    /// Completion tokens used
    pub completion_tokens: Counter<u64>,
}

impl LlmMetrics {
    fn init() -> Self {
        let meter = global::meter("quill_llm");

        Self {
            requests: meter
                .u64_counter("llm.requests")
                .with_description("Successful provider calls")
                .build(),
            errors: meter
                .u64_counter("llm.errors")
                .with_description("Failed provider calls")
                .build(),
            duration: meter
                .f64_histogram("llm.duration")
                .with_unit("s")
                .with_description("Provider call duration")
                .build(),
            prompt_tokens: meter
                .u64_counter("llm.tokens.prompt")
                .with_description("Prompt tokens used")
                .build(),
            completion_tokens: meter
                .u64_counter("llm.tokens.completion")
                .with_description("Completion tokens used")
                .build(),
        }
    }

    /// Get the global instance.
    pub fn get() -> &'static Self {
        METRICS.get_or_init(Self::init)
    }

    /// Record a successful call and its token usage.
    pub fn record_success(&self, provider: &str, model: &str, result: &GenerationResult) {
        let labels = &[
            KeyValue::new("provider", provider.to_string()),
            KeyValue::new("model", model.to_string()),
        ];
        self.requests.add(1, labels);
        self.duration.record(result.duration_ms as f64 / 1000.0, labels);
        self.prompt_tokens.add(u64::from(result.prompt_tokens), labels);
        self.completion_tokens
            .add(u64::from(result.completion_tokens), labels);
    }

    /// Record a failed call.
    pub fn record_error(&self, provider: &str, model: &str, error: &ProviderError) {
        let labels = &[
            KeyValue::new("provider", provider.to_string()),
            KeyValue::new("model", model.to_string()),
            KeyValue::new("error_type", classify_error(error)),
        ];
        self.errors.add(1, labels);
    }
}

/// Classify a provider error for metrics labelling.
///
/// Returns one of: "rate_limit", "auth", "timeout", "invalid_request",
/// "server", "decode", "network", "config", "unknown".
pub fn classify_error(error: &ProviderError) -> &'static str {
    match &error.kind {
        ProviderErrorKind::Timeout(_) => "timeout",
        ProviderErrorKind::Rejected { status, .. } => match status {
            429 => "rate_limit",
            401 | 403 => "auth",
            400..=499 => "invalid_request",
            500..=599 => "server",
            _ => "unknown",
        },
        ProviderErrorKind::Decode { .. } => "decode",
        ProviderErrorKind::GenerationFailed { cause, .. } => {
            let cause = cause.to_lowercase();
            if cause.contains("connect") || cause.contains("dns") || cause.contains("network") {
                "network"
            } else {
                "unknown"
            }
        }
        ProviderErrorKind::HealthCheckFailed { .. } => "network",
        ProviderErrorKind::UnregisteredProviderType(_)
        | ProviderErrorKind::MissingProviderType(_)
        | ProviderErrorKind::InvalidConfiguration(_) => "config",
    }
}
