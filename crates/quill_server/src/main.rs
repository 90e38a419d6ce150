//! Quill scene generation server.

use anyhow::Result;
use clap::Parser;
use quill_core::{init_telemetry, TelemetryConfig};
use quill_models::{ProviderRegistry, QuillConfig};
use quill_server::{create_router, AdmissionConfig, AppState};
use quill_swarm::{InMemoryStore, Swarm, SwarmOptions, DEFAULT_COMMIT_QUEUE_CAPACITY};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// How long queued memory commits may take after the listener closes.
const COMMIT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(author, version, about = "Quill scene generation server", long_about = None)]
struct Args {
    /// Address to bind
    #[arg(long, env = "QUILL_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "QUILL_PORT", default_value_t = 8080)]
    port: u16,

    /// Provider configuration file (default: ./quill.toml, then ~/.config/quill/quill.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Export trace spans to stdout through OpenTelemetry
    #[arg(long)]
    otel_stdout: bool,

    /// Ask the Committer's provider to extract facts instead of copying them from the design
    #[arg(long, env = "QUILL_LLM_FACT_EXTRACTION")]
    llm_fact_extraction: bool,

    /// Memory commits that may wait before new ones are dropped
    #[arg(long, env = "QUILL_COMMIT_QUEUE_CAPACITY", default_value_t = DEFAULT_COMMIT_QUEUE_CAPACITY)]
    commit_queue_capacity: usize,
}

impl Args {
    fn swarm_options(&self) -> SwarmOptions {
        SwarmOptions {
            commit_queue_capacity: self.commit_queue_capacity,
            llm_fact_extraction: self.llm_fact_extraction,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let telemetry = init_telemetry(&TelemetryConfig {
        json_logs: args.json_logs,
        otel_stdout: args.otel_stdout,
        ..TelemetryConfig::default()
    })
    .map_err(|e| anyhow::anyhow!("Failed to initialise telemetry: {e}"))?;

    let config = QuillConfig::load_from(args.config.as_deref())?;
    let registry = ProviderRegistry::with_defaults();
    let agents = registry.build_agent_configs(&config.provider)?;
    let options = args.swarm_options();
    info!(
        llm_fact_extraction = options.llm_fact_extraction,
        commit_queue_capacity = options.commit_queue_capacity,
        "Pipeline configured"
    );
    let swarm = Arc::new(Swarm::new(agents, Arc::new(InMemoryStore::new()), options));

    let admission = AdmissionConfig::from_env();
    info!(
        max_body_bytes = admission.max_body_bytes,
        request_timeout_secs = admission.request_timeout.as_secs(),
        max_concurrent = admission.max_concurrent,
        rate_limit_per_minute = admission.rate_limit_per_minute,
        "Admission control configured"
    );
    let app = create_router(AppState::new(Arc::clone(&swarm), admission));

    let listener = TcpListener::bind((args.host.as_str(), args.port)).await?;
    info!(addr = %listener.local_addr()?, "Server started");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Shutting down server");
    if !swarm.shutdown(COMMIT_DRAIN_TIMEOUT).await {
        warn!("Memory commits were abandoned during shutdown");
    }
    telemetry.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_extraction_flag_reaches_swarm_options() -> anyhow::Result<()> {
        let args = Args::try_parse_from([
            "quill-server",
            "--llm-fact-extraction",
            "--commit-queue-capacity",
            "8",
        ])?;
        let options = args.swarm_options();
        assert!(options.llm_fact_extraction);
        assert_eq!(options.commit_queue_capacity, 8);
        Ok(())
    }

    #[test]
    fn test_swarm_options_default() -> anyhow::Result<()> {
        let args = Args::try_parse_from(["quill-server", "--port", "9000"])?;
        assert_eq!(args.port, 9000);
        assert_eq!(args.swarm_options().commit_queue_capacity, DEFAULT_COMMIT_QUEUE_CAPACITY);
        Ok(())
    }
}
