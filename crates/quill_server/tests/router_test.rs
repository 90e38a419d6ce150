mod test_utils;

use axum::http::StatusCode;
use quill_server::AdmissionConfig;
use std::sync::Arc;
use std::time::Duration;
use test_utils::{
    app, get, header, json_body, mock_app, post_scene, TestProvider, VALID_SCENE,
};
use tower::ServiceExt;

#[tokio::test]
async fn test_generate_scene_with_mock() -> anyhow::Result<()> {
    let app = mock_app(AdmissionConfig::default());

    let response = app.oneshot(post_scene(VALID_SCENE)?).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let request_id = header(&response, "x-request-id")
        .map(str::to_string)
        .expect("request id echoed");
    assert_eq!(header(&response, "x-ratelimit-limit"), Some("30"));
    assert_eq!(header(&response, "x-ratelimit-remaining"), Some("29"));
    assert!(header(&response, "x-ratelimit-reset").is_some());

    let body = json_body(response).await?;
    assert_eq!(body["text"], "Mock response.");
    assert_eq!(body["request_id"], request_id.as_str());
    assert_eq!(body["revision_made"], false);
    assert_eq!(body["stages"].as_array().map(Vec::len), Some(3));
    assert_eq!(body["stages"][0]["agent"], "director");
    assert_eq!(body["stages"][0]["operation"], "design_scene");
    assert_eq!(body["scenespec"]["scene"]["title"], "Mock Scene");
    Ok(())
}

#[tokio::test]
async fn test_request_id_header_honoured() -> anyhow::Result<()> {
    let app = mock_app(AdmissionConfig::default());
    let mut request = post_scene(VALID_SCENE)?;
    request
        .headers_mut()
        .insert("x-request-id", "trace-123".parse()?);

    let response = app.oneshot(request).await?;

    assert_eq!(header(&response, "x-request-id"), Some("trace-123"));
    let body = json_body(response).await?;
    assert_eq!(body["request_id"], "trace-123");
    Ok(())
}

#[tokio::test]
async fn test_body_id_wins_over_header() -> anyhow::Result<()> {
    let app = mock_app(AdmissionConfig::default());
    let response = app
        .oneshot(post_scene(r#"{"id": "scene-9", "intention": "x"}"#)?)
        .await?;

    let body = json_body(response).await?;
    assert_eq!(body["request_id"], "scene-9");
    Ok(())
}

#[tokio::test]
async fn test_malformed_json_is_invalid_request() -> anyhow::Result<()> {
    let app = mock_app(AdmissionConfig::default());
    let response = app.oneshot(post_scene("{not json")?).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await?;
    assert_eq!(body["code"], "invalid_request");
    Ok(())
}

#[tokio::test]
async fn test_validation_boundaries() -> anyhow::Result<()> {
    let app = mock_app(AdmissionConfig::default());

    let cases = [
        (serde_json::json!({"intention": "   "}), StatusCode::BAD_REQUEST),
        (serde_json::json!({"intention": "a".repeat(4001)}), StatusCode::BAD_REQUEST),
        (serde_json::json!({"intention": "a".repeat(4000)}), StatusCode::OK),
        (serde_json::json!({"intention": "x", "word_count": 5001}), StatusCode::BAD_REQUEST),
        (serde_json::json!({"intention": "x", "word_count": 5000}), StatusCode::OK),
        (serde_json::json!({"intention": "x", "chapter": -1}), StatusCode::BAD_REQUEST),
        (
            serde_json::json!({"intention": "x", "required_events": vec!["e"; 21]}),
            StatusCode::BAD_REQUEST,
        ),
        (
            serde_json::json!({"intention": "x", "required_events": vec!["e"; 20]}),
            StatusCode::OK,
        ),
    ];

    for (body, expected) in cases {
        let response = app
            .clone()
            .oneshot(post_scene(serde_json::to_vec(&body)?)?)
            .await?;
        assert_eq!(response.status(), expected, "body: {body}");
        if expected == StatusCode::BAD_REQUEST {
            assert_eq!(json_body(response).await?["code"], "invalid_request");
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_oversized_body_rejected() -> anyhow::Result<()> {
    let app = mock_app(AdmissionConfig {
        max_body_bytes: 64,
        ..AdmissionConfig::default()
    });
    let oversized = format!(r#"{{"intention": "{}"}}"#, "a".repeat(200));

    // No Content-Length: the limit trips while reading.
    let response = app.clone().oneshot(post_scene(oversized.clone())?).await?;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json_body(response).await?["code"], "payload_too_large");

    // Declared Content-Length: rejected before reading.
    let mut request = post_scene(oversized.clone())?;
    request
        .headers_mut()
        .insert("content-length", oversized.len().to_string().parse()?);
    let response = app.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let response = app.oneshot(post_scene(r#"{"intention": "short"}"#)?).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_oversized_body_skips_rate_limiter() -> anyhow::Result<()> {
    let app = mock_app(AdmissionConfig {
        max_body_bytes: 64,
        rate_limit_per_minute: 1,
        ..AdmissionConfig::default()
    });
    let oversized = format!(r#"{{"intention": "{}"}}"#, "a".repeat(200));

    let rejected = app.clone().oneshot(post_scene(oversized)?).await?;
    assert_eq!(rejected.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(header(&rejected, "x-request-id").is_some());
    assert!(header(&rejected, "x-ratelimit-limit").is_none());
    assert!(header(&rejected, "x-ratelimit-remaining").is_none());

    // The rejected body did not spend the single request in the window.
    let admitted = app.oneshot(post_scene(VALID_SCENE)?).await?;
    assert_eq!(admitted.status(), StatusCode::OK);
    assert_eq!(header(&admitted, "x-ratelimit-remaining"), Some("0"));
    Ok(())
}

#[tokio::test]
async fn test_rate_limit_per_client() -> anyhow::Result<()> {
    let app = mock_app(AdmissionConfig {
        rate_limit_per_minute: 2,
        ..AdmissionConfig::default()
    });

    let from = |ip: &str| -> anyhow::Result<_> {
        let mut request = post_scene(VALID_SCENE)?;
        request.headers_mut().insert("x-forwarded-for", ip.parse()?);
        Ok(request)
    };

    let first = app.clone().oneshot(from("203.0.113.1")?).await?;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(header(&first, "x-ratelimit-remaining"), Some("1"));

    let second = app.clone().oneshot(from("203.0.113.1")?).await?;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(header(&second, "x-ratelimit-remaining"), Some("0"));

    let third = app.clone().oneshot(from("203.0.113.1")?).await?;
    assert_eq!(third.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&third, "x-ratelimit-limit"), Some("2"));
    assert_eq!(header(&third, "x-ratelimit-remaining"), Some("0"));
    assert_eq!(json_body(third).await?["code"], "rate_limit_exceeded");

    // Another client has its own window.
    let other = app.oneshot(from("203.0.113.2")?).await?;
    assert_eq!(other.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_concurrency_limit_rejects_second_request() -> anyhow::Result<()> {
    let provider = Arc::new(TestProvider::slow(Duration::from_millis(300)));
    let app = app(
        provider,
        AdmissionConfig {
            max_concurrent: 1,
            ..AdmissionConfig::default()
        },
    );

    let first = tokio::spawn(app.clone().oneshot(post_scene(VALID_SCENE)?));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = app.clone().oneshot(post_scene(VALID_SCENE)?).await?;
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json_body(second).await?["code"], "too_many_requests");

    let first = first.await??;
    assert_eq!(first.status(), StatusCode::OK);

    // The slot is free again.
    let third = app.oneshot(post_scene(VALID_SCENE)?).await?;
    assert_eq!(third.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_deadline_returns_408() -> anyhow::Result<()> {
    let provider = Arc::new(TestProvider::slow(Duration::from_secs(5)));
    let app = app(
        provider,
        AdmissionConfig {
            request_timeout: Duration::from_millis(100),
            ..AdmissionConfig::default()
        },
    );

    let response = app.oneshot(post_scene(VALID_SCENE)?).await?;

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert!(header(&response, "x-ratelimit-limit").is_some());
    assert_eq!(json_body(response).await?["code"], "request_timeout");
    Ok(())
}

#[tokio::test]
async fn test_provider_failure_is_500() -> anyhow::Result<()> {
    let app = app(Arc::new(TestProvider::failing()), AdmissionConfig::default());

    let response = app.oneshot(post_scene(VALID_SCENE)?).await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await?;
    assert_eq!(body["code"], "generation_failed");
    assert!(body["error"].as_str().unwrap_or_default().contains("director"));
    Ok(())
}

#[tokio::test]
async fn test_health_and_ready_when_healthy() -> anyhow::Result<()> {
    let app = mock_app(AdmissionConfig::default());

    let health = app.clone().oneshot(get("/api/v1/health")?).await?;
    assert_eq!(health.status(), StatusCode::OK);
    assert!(header(&health, "x-request-id").is_some());
    assert!(header(&health, "x-ratelimit-limit").is_none());
    let body = json_body(health).await?;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    let deps = body["dependencies"].as_array().cloned().unwrap_or_default();
    assert_eq!(deps.len(), 5);
    assert_eq!(deps[0]["name"], "director");
    assert_eq!(deps[0]["provider"], "test");
    assert_eq!(deps[0]["healthy"], true);

    let ready = app.oneshot(get("/api/v1/ready")?).await?;
    assert_eq!(ready.status(), StatusCode::OK);
    let body = json_body(ready).await?;
    assert_eq!(body["ready"], true);
    assert_eq!(body["status"], "ready");
    Ok(())
}

#[tokio::test]
async fn test_health_degraded_and_not_ready() -> anyhow::Result<()> {
    let app = app(Arc::new(TestProvider::unhealthy()), AdmissionConfig::default());

    let health = app.clone().oneshot(get("/api/v1/health")?).await?;
    assert_eq!(health.status(), StatusCode::OK);
    let body = json_body(health).await?;
    assert_eq!(body["status"], "degraded");
    assert!(body["dependencies"][0]["error"]
        .as_str()
        .unwrap_or_default()
        .contains("connection refused"));

    let ready = app.oneshot(get("/api/v1/ready")?).await?;
    assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(ready).await?;
    assert_eq!(body["ready"], false);
    assert_eq!(body["status"], "not_ready");
    Ok(())
}

#[tokio::test]
async fn test_read_routes_bypass_rate_limit() -> anyhow::Result<()> {
    let app = mock_app(AdmissionConfig {
        rate_limit_per_minute: 1,
        ..AdmissionConfig::default()
    });

    for _ in 0..3 {
        let response = app.clone().oneshot(get("/api/v1/stats")?).await?;
        assert_eq!(response.status(), StatusCode::OK);
    }
    Ok(())
}

#[tokio::test]
async fn test_stats_count_requests() -> anyhow::Result<()> {
    let app = mock_app(AdmissionConfig::default());

    app.clone().oneshot(post_scene(VALID_SCENE)?).await?;
    app.clone().oneshot(post_scene("{}")?).await?;

    let response = app.oneshot(get("/api/v1/stats")?).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    assert_eq!(body["requests_total"], 2);
    assert_eq!(body["in_flight"], 1);
    assert_eq!(body["status_counts"]["200"], 1);
    assert_eq!(body["status_counts"]["400"], 1);
    assert!(body["latency_ms_p95"].as_f64().is_some());
    assert!(body["uptime_seconds"].as_f64().is_some());
    Ok(())
}
