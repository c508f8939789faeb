//! Shared HTTP plumbing for the remote provider adapters.

use reqwest::{RequestBuilder, Response, StatusCode};
use synod_application::ports::provider::{InvokeRequest, ProviderError};
use tracing::debug;

/// Send `builder`, honouring the invocation's deadline and cancellation.
///
/// Non-success statuses are read and classified; the caller only sees
/// successful responses.
pub(crate) async fn send(
    builder: RequestBuilder,
    request: &InvokeRequest,
) -> Result<Response, ProviderError> {
    let remaining = request.remaining();
    if remaining.is_zero() {
        return Err(ProviderError::transient("deadline already elapsed"));
    }

    let response = tokio::select! {
        biased;
        _ = request.cancel.cancelled() => {
            return Err(ProviderError::transient("cancelled"));
        }
        result = builder.timeout(remaining).send() => result.map_err(transport_error)?,
    };

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    debug!(model = %request.model, %status, "provider returned an error status");
    Err(classify_status(status, &body))
}

/// 429, 408 and 5xx are transient; every other client error is permanent.
pub(crate) fn classify_status(status: StatusCode, body: &str) -> ProviderError {
    let message = format!("HTTP {}: {}", status.as_u16(), summarize(body));
    if status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
    {
        ProviderError::transient(message)
    } else {
        ProviderError::permanent(message)
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_builder() {
        ProviderError::permanent(format!("invalid request: {}", e))
    } else {
        ProviderError::transient(format!("transport error: {}", e))
    }
}

pub(crate) fn decode_error(e: reqwest::Error) -> ProviderError {
    ProviderError::transient(format!("malformed response: {}", e))
}

fn summarize(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(200) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
