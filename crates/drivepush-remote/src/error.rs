//! HTTP failure mapping
//!
//! Translates non-success responses and transport failures into
//! [`RemoteError`] so the engine can classify them.

use drivepush_core::ports::RemoteError;
use reqwest::{Response, StatusCode};
use tracing::debug;

use crate::wire::ErrorEnvelope;

/// 403 reasons that mean "slow down" rather than "forbidden"
const RATE_LIMIT_REASONS: &[&str] = &[
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "sharingRateLimitExceeded",
];

/// Pass a successful response through, map anything else to a `RemoteError`
pub(crate) async fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(map_status(status, &body))
}

/// Map an error status and its body to a `RemoteError`
pub fn map_status(status: StatusCode, body: &str) -> RemoteError {
    let (message, reason) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let reason = envelope
                .error
                .errors
                .into_iter()
                .map(|detail| detail.reason)
                .find(|reason| !reason.is_empty());
            (envelope.error.message, reason)
        }
        Err(_) => (body.trim().to_string(), None),
    };
    let message = if message.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    } else {
        message
    };
    debug!(status = status.as_u16(), reason = ?reason, %message, "Request failed");

    match status.as_u16() {
        429 => RemoteError::RateLimited(reason.unwrap_or(message)),
        403 => match reason {
            Some(reason) if RATE_LIMIT_REASONS.contains(&reason.as_str()) => {
                RemoteError::RateLimited(reason)
            }
            _ => RemoteError::PermissionDenied(message),
        },
        400 => RemoteError::InvalidRequest(message),
        401 => RemoteError::Unauthorized(message),
        404 => RemoteError::NotFound(message),
        500 | 502 | 503 | 504 => RemoteError::Backend {
            status: status.as_u16(),
            message,
        },
        code => RemoteError::Rejected {
            status: code,
            message,
        },
    }
}

/// Map a reqwest failure to a `RemoteError`
pub fn map_transport(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout(err.to_string())
    } else if err.is_decode() {
        RemoteError::InvalidResponse(err.to_string())
    } else {
        RemoteError::Transport(err.to_string())
    }
}
