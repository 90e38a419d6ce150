//! JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quill_error::{SwarmError, ValidationError};
use quill_rate_limit::{RateLimitError, RateLimitErrorKind};
use serde::{Deserialize, Serialize};

/// Where in the error taxonomy a response falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ErrorCategory {
    /// Malformed, oversized or invalid request
    #[display("client")]
    Client,
    /// Rate or concurrency limit hit
    #[display("capacity")]
    Capacity,
    /// Deadline exceeded mid-pipeline
    #[display("timeout")]
    Timeout,
    /// Director or Writer provider failed
    #[display("upstream_generation")]
    UpstreamGeneration,
}

/// Wire shape of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human readable message
    pub error: String,
    /// Machine readable code
    pub code: String,
}

/// An error returned to HTTP callers.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{} ({}): {}", code, status, message)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    category: ErrorCategory,
}

impl ApiError {
    fn new(
        status: StatusCode,
        code: &'static str,
        message: impl Into<String>,
        category: ErrorCategory,
    ) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            category,
        }
    }

    /// 400 `invalid_request`.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message, ErrorCategory::Client)
    }

    /// 413 `payload_too_large`.
    pub fn payload_too_large(max_bytes: usize) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "payload_too_large",
            format!("request body exceeds {max_bytes} bytes"),
            ErrorCategory::Client,
        )
    }

    /// 429 `rate_limit_exceeded`.
    pub fn rate_limit_exceeded() -> Self {
        Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limit_exceeded",
            "rate limit exceeded",
            ErrorCategory::Capacity,
        )
    }

    /// 429 `too_many_requests`.
    pub fn too_many_requests() -> Self {
        Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "too_many_requests",
            "too many in-flight requests",
            ErrorCategory::Capacity,
        )
    }

    /// 408 `request_timeout`.
    pub fn request_timeout() -> Self {
        Self::new(
            StatusCode::REQUEST_TIMEOUT,
            "request_timeout",
            "request timeout",
            ErrorCategory::Timeout,
        )
    }

    /// 500 `generation_failed`.
    pub fn generation_failed(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "generation_failed",
            message,
            ErrorCategory::UpstreamGeneration,
        )
    }

    /// HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine readable code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Taxonomy category.
    pub fn category(&self) -> ErrorCategory {
        self.category
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::invalid_request(err.kind.to_string())
    }
}

impl From<RateLimitError> for ApiError {
    fn from(err: RateLimitError) -> Self {
        match err.kind() {
            RateLimitErrorKind::LimitExceeded { .. } => Self::rate_limit_exceeded(),
            RateLimitErrorKind::Saturated(_) => Self::too_many_requests(),
        }
    }
}

impl From<SwarmError> for ApiError {
    fn from(err: SwarmError) -> Self {
        if err.is_timeout() {
            Self::request_timeout()
        } else {
            Self::generation_failed(err.kind.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            code: self.code.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_error::{ProviderError, ProviderErrorKind, SwarmErrorKind, ValidationErrorKind};

    #[test]
    fn test_swarm_timeout_maps_to_408() {
        let err = SwarmError::new(SwarmErrorKind::WriterFailed(ProviderError::new(
            ProviderErrorKind::Timeout("ollama".into()),
        )));
        let api = ApiError::from(err);
        assert_eq!(api.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(api.category(), ErrorCategory::Timeout);
    }

    #[test]
    fn test_swarm_failure_maps_to_500() {
        let err = SwarmError::new(SwarmErrorKind::DirectorFailed(ProviderError::generation_failed(
            "openai", "boom",
        )));
        let api = ApiError::from(err);
        assert_eq!(api.code(), "generation_failed");
        assert_eq!(api.category(), ErrorCategory::UpstreamGeneration);
    }

    #[test]
    fn test_validation_message_is_plain() {
        let api = ApiError::from(ValidationError::new(ValidationErrorKind::MissingIntention));
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
        assert!(api.to_string().ends_with("intention is required"));
    }

    #[test]
    fn test_saturation_maps_to_too_many_requests() {
        let api = ApiError::from(RateLimitError::new(RateLimitErrorKind::Saturated(4)));
        assert_eq!(api.code(), "too_many_requests");
    }
}
