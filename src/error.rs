// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Relay error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Non-2xx answer from the Polar API, relayed with its status and body.
    #[error("{operation} failed: {status}")]
    Upstream {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("Upstream request failed: {0}")]
    Network(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: msg.clone(),
                    details: None,
                    message: None,
                },
            ),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorResponse {
                    error: "Method not allowed".to_string(),
                    details: None,
                    message: None,
                },
            ),
            AppError::Upstream { status, body, .. } => {
                tracing::warn!(status, error = %self, "Relaying upstream failure");
                (
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                    ErrorResponse {
                        error: self.to_string(),
                        details: Some(body.clone()),
                        message: None,
                    },
                )
            }
            AppError::Network(msg) => {
                tracing::error!(error = %msg, "Upstream network failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Internal server error".to_string(),
                        details: None,
                        message: Some(msg.clone()),
                    },
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Internal server error".to_string(),
                        details: None,
                        message: Some(err.to_string()),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

/// Errors seen by the front-end side: the OAuth flow, the relay client and
/// the local stores.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The provider redirected back with an `error` parameter.
    #[error("OAuth error: {error} - {description}")]
    Authorization { error: String, description: String },

    #[error("Invalid state parameter - possible CSRF attack")]
    CsrfMismatch,

    #[error("Relay request failed with status {status}: {body}")]
    Relay { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("No valid Polar credentials found. Please configure your credentials first.")]
    NotConfigured,

    #[error("Random generator failure")]
    Random,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_keeps_status() {
        let err = AppError::Upstream {
            operation: "Token exchange",
            status: 401,
            body: "invalid_client".to_string(),
        };
        assert_eq!(err.to_string(), "Token exchange failed: 401");
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_network_error_is_500() {
        let err = AppError::Network("connection refused".to_string());
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_bogus_upstream_status_maps_to_bad_gateway() {
        let err = AppError::Upstream {
            operation: "User registration",
            status: 42,
            body: String::new(),
        };
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
