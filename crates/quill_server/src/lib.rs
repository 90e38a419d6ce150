//! HTTP surface for Quill scene generation.
//!
//! Routes, all under `/api/v1`:
//! - `POST /scenes` runs the pipeline behind the admission chain
//! - `GET /health` probes every provider, always 200
//! - `GET /ready` probes every provider, 503 unless all are healthy
//! - `GET /stats` returns request statistics

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod handlers;
mod middleware;
mod state;
mod stats;

pub use config::{
    AdmissionConfig, DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_CONCURRENT, DEFAULT_RATE_LIMIT_PER_MINUTE,
    DEFAULT_REQUEST_TIMEOUT, ENV_MAX_BODY_BYTES, ENV_MAX_CONCURRENT, ENV_RATE_LIMIT_PER_MINUTE,
    ENV_REQUEST_TIMEOUT_SECS, RATE_WINDOW,
};
pub use error::{ApiError, ErrorBody, ErrorCategory};
pub use handlers::{HealthResponse, ReadyResponse, HEALTH_PROBE_TIMEOUT};
pub use middleware::{client_key, RequestId, REQUEST_ID_HEADER};
pub use state::AppState;
pub use stats::{StatsSnapshot, StatsStore, LATENCY_CAPACITY};

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    // Layers wrap outward: the last one added runs first.
    let scenes = Router::new()
        .route("/scenes", post(handlers::create_scene))
        .layer(DefaultBodyLimit::disable())
        .layer(from_fn_with_state(state.clone(), middleware::deadline))
        .layer(from_fn_with_state(state.clone(), middleware::concurrency))
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit))
        .layer(from_fn_with_state(state.clone(), middleware::body_limit));

    let api = Router::new()
        .merge(scenes)
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .route("/stats", get(handlers::stats));

    Router::new()
        .nest("/api/v1", api)
        .layer(from_fn_with_state(state.clone(), middleware::access_log))
        .layer(from_fn(middleware::request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
