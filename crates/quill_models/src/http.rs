//! Shared HTTP plumbing for the networked backends.

use quill_error::{ProviderError, ProviderErrorKind, ProviderResult};
use std::time::Duration;
use tracing::error;

/// Build a client with the backend's request timeout.
pub(crate) fn build_client(provider: &'static str, timeout: Duration) -> ProviderResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| {
            ProviderError::new(ProviderErrorKind::InvalidConfiguration(format!(
                "{provider}: failed to build HTTP client: {e}"
            )))
        })
}

/// Classify a transport failure.
#[track_caller]
pub(crate) fn send_error(provider: &'static str, e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        error!(provider, error = %e, "Request timed out");
        ProviderError::new(ProviderErrorKind::Timeout(provider.to_string()))
    } else {
        error!(provider, error = %e, "Request failed");
        ProviderError::generation_failed(provider, e.to_string())
    }
}

/// Turn a non-success response into a rejection carrying the body text.
pub(crate) async fn rejection(provider: &'static str, response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    error!(provider, status, body = %message, "Backend returned error");
    ProviderError::new(ProviderErrorKind::Rejected {
        provider: provider.to_string(),
        status,
        message,
    })
}

/// Classify a body that could not be decoded.
#[track_caller]
pub(crate) fn decode_error(provider: &'static str, e: impl std::fmt::Display) -> ProviderError {
    error!(provider, error = %e, "Failed to parse backend response");
    ProviderError::new(ProviderErrorKind::Decode {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}

/// Strip a trailing slash so paths can be appended.
pub(crate) fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
