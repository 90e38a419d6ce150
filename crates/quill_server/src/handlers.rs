//! Route handlers.

use crate::{ApiError, AppState, RequestId, StatsSnapshot};
use axum::{body::Bytes, extract::State, http::StatusCode, Extension, Json};
use quill_core::{SceneRequest, SceneResponse};
use quill_error::{ValidationError, ValidationErrorKind};
use quill_interface::DependencyHealth;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// Deadline for each dependency probe.
pub const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Body of `GET /api/v1/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,
    /// Service version
    pub version: String,
    /// One entry per agent role
    pub dependencies: Vec<DependencyHealth>,
}

/// Body of `GET /api/v1/ready`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyResponse {
    /// `ready` or `not_ready`
    pub status: String,
    /// Whether every dependency is healthy
    pub ready: bool,
    /// One entry per agent role
    pub dependencies: Vec<DependencyHealth>,
}

/// `POST /api/v1/scenes`
#[instrument(skip_all)]
pub async fn create_scene(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    body: Bytes,
) -> Result<Json<SceneResponse>, ApiError> {
    let request: SceneRequest = serde_json::from_slice(&body)
        .map_err(|e| ValidationError::new(ValidationErrorKind::MalformedBody(e.to_string())))?;

    let request = request.validate(|| match request_id {
        Some(Extension(RequestId(id))) => id,
        None => Uuid::new_v4().to_string(),
    })?;

    info!(
        request_id = %request.id,
        chapter = request.chapter,
        scene = request.scene,
        word_count = request.word_count,
        "Generating scene"
    );

    let response = state.swarm().generate_scene(&request).await.map_err(|e| {
        error!(request_id = %request.id, error = %e, "Scene generation failed");
        ApiError::from(e)
    })?;

    Ok(Json(response))
}

/// `GET /api/v1/health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let dependencies = state.swarm().provider_health(HEALTH_PROBE_TIMEOUT).await;
    let healthy = dependencies.iter().all(|d| d.healthy);

    Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        dependencies,
    })
}

/// `GET /api/v1/ready`
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let dependencies = state.swarm().provider_health(HEALTH_PROBE_TIMEOUT).await;
    let ready = dependencies.iter().all(|d| d.healthy);

    let (status, label) = if ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };
    (
        status,
        Json(ReadyResponse {
            status: label.to_string(),
            ready,
            dependencies,
        }),
    )
}

/// `GET /api/v1/stats`
pub async fn stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.stats().snapshot())
}
