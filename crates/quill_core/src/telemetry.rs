//! Tracing and OpenTelemetry initialisation.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::{trace::SdkTracerProvider, Resource};
use opentelemetry_stdout::SpanExporter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging and tracing options.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to exported spans
    pub service_name: String,
    /// Filter used when `RUST_LOG` is unset
    pub default_filter: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
    /// Export spans to stdout through OpenTelemetry
    pub otel_stdout: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "quill".to_string(),
            default_filter: "info".to_string(),
            json_logs: false,
            otel_stdout: false,
        }
    }
}

/// Keeps the tracer provider alive until shutdown.
#[derive(Debug)]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    /// Flush and stop span export.
    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(e) = provider.shutdown() {
                tracing::warn!(error = %e, "Failed to shut down tracer provider");
            }
        }
    }
}

/// Install the global tracing subscriber.
///
/// Respects `RUST_LOG`, falling back to `config.default_filter`.
///
/// # Errors
///
/// Returns error if a global subscriber is already installed.
pub fn init_telemetry(
    config: &TelemetryConfig,
) -> Result<TelemetryGuard, Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let provider = config.otel_stdout.then(|| {
        SdkTracerProvider::builder()
            .with_simple_exporter(SpanExporter::default())
            .with_resource(
                Resource::builder()
                    .with_service_name(config.service_name.clone())
                    .build(),
            )
            .build()
    });
    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("quill")));

    let text_layer = (!config.json_logs).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
    });
    let json_layer = config
        .json_logs
        .then(|| tracing_subscriber::fmt::layer().json().with_current_span(true));

    tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .with(text_layer)
        .with(json_layer)
        .try_init()?;

    Ok(TelemetryGuard { provider })
}
