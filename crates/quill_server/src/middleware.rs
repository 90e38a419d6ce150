//! Request identification and admission control.
//!
//! Order on the generation route, outermost first:
//! request id, access log, body limit, rate limit, concurrency, deadline.
//! The read-only routes only get the first two.

use crate::{ApiError, AppState};
use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use http_body_util::LengthLimitError;
use quill_rate_limit::RateDecision;
use std::error::Error as _;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Header carrying the request identifier.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Status recorded when the client goes away before a response exists.
const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Identifier of the current request, stored as a request extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

/// Honour `X-Request-ID` or mint one, and echo it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Context captured before the request moves into the next layer.
#[derive(Debug, Clone)]
struct RequestContext {
    method: Method,
    uri: Uri,
    client: String,
    request_id: String,
}

impl RequestContext {
    fn from_request(req: &Request) -> Self {
        Self {
            method: req.method().clone(),
            uri: req.uri().clone(),
            client: client_key(req),
            request_id: req
                .extensions()
                .get::<RequestId>()
                .map(|id| id.0.clone())
                .unwrap_or_default(),
        }
    }

    fn log(&self, status: StatusCode, latency_ms: u64) {
        if status.is_server_error() {
            error!(
                method = %self.method,
                path = %self.uri.path(),
                status = status.as_u16(),
                latency_ms,
                client = %self.client,
                request_id = %self.request_id,
                "Request failed"
            );
        } else if status.is_client_error() {
            warn!(
                method = %self.method,
                path = %self.uri.path(),
                status = status.as_u16(),
                latency_ms,
                client = %self.client,
                request_id = %self.request_id,
                "Request rejected"
            );
        } else {
            info!(
                method = %self.method,
                path = %self.uri.path(),
                status = status.as_u16(),
                latency_ms,
                client = %self.client,
                request_id = %self.request_id,
                "Request completed"
            );
        }
    }
}

/// Closes the in-flight count even if the request future is dropped.
struct InFlight {
    stats: Arc<crate::StatsStore>,
    started: Instant,
    finished: bool,
}

impl InFlight {
    fn begin(stats: Arc<crate::StatsStore>) -> Self {
        stats.begin_request();
        Self {
            stats,
            started: Instant::now(),
            finished: false,
        }
    }

    fn finish(&mut self, status: StatusCode) -> u64 {
        self.finished = true;
        let latency = self.started.elapsed();
        self.stats.end_request(status.as_u16(), latency);
        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.finished {
            self.stats
                .end_request(CLIENT_CLOSED_REQUEST, self.started.elapsed());
            warn!("Client disconnected before a response was written");
        }
    }
}

/// Log every request and feed the stats store.
pub async fn access_log(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let ctx = RequestContext::from_request(&req);
    let mut in_flight = InFlight::begin(Arc::clone(state.stats()));

    let response = next.run(req).await;

    let latency_ms = in_flight.finish(response.status());
    ctx.log(response.status(), latency_ms);
    response
}

/// Reject bodies above the configured ceiling before any parsing.
///
/// Runs ahead of the rate limiter, so a rejected body spends no budget.
pub async fn body_limit(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let max = state.admission().max_body_bytes;

    if let Some(declared) = content_length(req.headers()) {
        if declared > max as u64 {
            return Err(ApiError::payload_too_large(max));
        }
    }

    let (parts, body) = req.into_parts();
    let bytes: Bytes = axum::body::to_bytes(body, max).await.map_err(|e| {
        if is_length_limit(&e) {
            ApiError::payload_too_large(max)
        } else {
            ApiError::invalid_request(format!("failed to read request body: {e}"))
        }
    })?;

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

/// Fixed-window limit per client, with `X-RateLimit-*` headers.
pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let client = client_key(&req);
    let decision = state.rate_limiter().allow(&client, Utc::now());

    let mut response = match decision.into_result() {
        Ok(_) => next.run(req).await,
        Err(e) => {
            warn!(client = %client, error = %e.kind(), "Rate limit exceeded");
            ApiError::from(e).into_response()
        }
    };
    insert_rate_headers(response.headers_mut(), &decision);
    response
}

/// Admit or reject against the in-flight bound; never queues.
pub async fn concurrency(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let _permit = state.concurrency().try_acquire().map_err(|e| {
        warn!(error = %e.kind(), "Concurrency limit reached");
        ApiError::from(e)
    })?;
    Ok(next.run(req).await)
}

/// Bind a deadline to the rest of the chain.
///
/// On expiry the inner future is dropped, which cancels any provider call
/// in flight, and a 408 is written in its place.
pub async fn deadline(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let timeout = state.admission().request_timeout;
    match tokio::time::timeout(timeout, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "Request deadline exceeded");
            ApiError::request_timeout().into_response()
        }
    }
}

/// Rate-limit key for a request.
///
/// First `X-Forwarded-For` entry, then `X-Real-IP`, then the socket address.
pub fn client_key(req: &Request) -> String {
    let headers = req.headers();
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = real_ip {
        return ip.to_string();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source = err.source();
    while let Some(inner) = source {
        if inner.is::<LengthLimitError>() {
            return true;
        }
        source = inner.source();
    }
    false
}

fn insert_rate_headers(headers: &mut HeaderMap, decision: &RateDecision) {
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(*decision.limit()));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(*decision.remaining()));
    headers.insert(RATE_LIMIT_RESET, HeaderValue::from(*decision.reset_unix()));
}
