//! Test utilities for router tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use http_body_util::BodyExt;
use quill_core::{GenerateParams, GenerationResult, Message, ProviderCapabilities};
use quill_error::{ProviderError, ProviderErrorKind, ProviderResult};
use quill_interface::Provider;
use quill_models::{AgentConfigs, MockProvider};
use quill_server::{create_router, AdmissionConfig, AppState};
use quill_swarm::{InMemoryStore, Swarm, SwarmOptions};
use std::sync::Arc;
use std::time::Duration;

/// Provider with configurable latency, failure and health.
#[derive(Debug, Clone, Default)]
pub struct TestProvider {
    pub delay: Duration,
    pub fail: bool,
    pub unhealthy: bool,
}

impl TestProvider {
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            unhealthy: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Provider for TestProvider {
    async fn generate(
        &self,
        _messages: &[Message],
        params: &GenerateParams,
    ) -> ProviderResult<GenerationResult> {
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(ProviderError::generation_failed("test", "backend unavailable"));
        }
        let text = if params.json_mode { "{}" } else { "Prose." };
        Ok(GenerationResult {
            text: text.to_string(),
            prompt_tokens: 1,
            completion_tokens: 1,
            duration_ms: 1,
        })
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::new(1024)
    }

    async fn health_check(&self) -> ProviderResult<()> {
        if self.unhealthy {
            return Err(ProviderError::new(ProviderErrorKind::HealthCheckFailed {
                provider: "test".into(),
                message: "connection refused".into(),
            }));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "test"
    }

    fn model_name(&self) -> &str {
        "test-model"
    }
}

/// Router backed by `provider` for every role.
pub fn app(provider: Arc<dyn Provider>, admission: AdmissionConfig) -> Router {
    let swarm = Swarm::new(
        AgentConfigs::uniform("test", provider),
        Arc::new(InMemoryStore::new()),
        SwarmOptions::default(),
    );
    create_router(AppState::new(Arc::new(swarm), admission))
}

/// Router backed by the deterministic mock provider.
pub fn mock_app(admission: AdmissionConfig) -> Router {
    app(Arc::new(MockProvider::default()), admission)
}

pub fn post_scene(body: impl Into<Body>) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri("/api/v1/scenes")
        .header("content-type", "application/json")
        .body(body.into())?)
}

pub fn get(uri: &str) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder().uri(uri).body(Body::empty())?)
}

pub async fn json_body(response: Response) -> anyhow::Result<serde_json::Value> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

pub const VALID_SCENE: &str = r#"{"intention": "Two rivals share a lift", "word_count": 300}"#;
