//! Error types surfaced by the connector's operations.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Failure of an OAuth or item-loading operation.
///
/// Every variant maps to an HTTP status; nothing is retried internally.
#[derive(Error, Debug)]
pub enum IntegrationError {
    /// Missing or malformed code, state, or access token
    #[error("{0}")]
    BadRequest(String),

    /// CSRF check failed: no stored state, or its secret differs
    #[error("State does not match.")]
    StateMismatch,

    /// Provider answered with a non-success status (message carries the raw body)
    #[error("{0}")]
    Upstream(String),

    /// Credential absent or already consumed
    #[error("{0}")]
    NotFound(String),

    /// Key-value store unavailable or holding a corrupt value
    #[error("Store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

pub type IntegrationResult<T> = Result<T, IntegrationError>;

impl IntegrationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IntegrationError::BadRequest(_) => StatusCode::BAD_REQUEST,
            IntegrationError::StateMismatch => StatusCode::BAD_REQUEST,
            // Provider failures are 502 and missing credentials 404 rather
            // than a blanket 400; see "Status codes" in DESIGN.md
            IntegrationError::Upstream(_) => StatusCode::BAD_GATEWAY,
            IntegrationError::NotFound(_) => StatusCode::NOT_FOUND,
            IntegrationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error body; `detail` is the field the integrations UI reads.
#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for IntegrationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            detail: self.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            IntegrationError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            IntegrationError::StateMismatch.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            IntegrationError::Upstream("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            IntegrationError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            IntegrationError::Store(anyhow::anyhow!("down")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            IntegrationError::StateMismatch.to_string(),
            "State does not match."
        );
        assert_eq!(
            IntegrationError::Upstream("Failed to get HubSpot token: nope".into()).to_string(),
            "Failed to get HubSpot token: nope"
        );
        let err = IntegrationError::Store(
            anyhow::anyhow!("connection refused").context("Failed to reach redis"),
        );
        assert_eq!(
            err.to_string(),
            "Store error: Failed to reach redis: connection refused"
        );
    }

    #[tokio::test]
    async fn test_into_response_body() {
        let response = IntegrationError::NotFound("No credentials found.".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["detail"], "No credentials found.");
    }
}
