//! Error types for the CRM backend
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == API Error Enum ==
/// Unified error type surfaced to HTTP clients.
///
/// Cache/store failures never appear here: they are swallowed at the
/// cache service boundary and degrade to a miss or a no-op.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or invalid credential, or identity verification failed.
    ///
    /// The client always receives the same generic message; the underlying
    /// failure detail is logged server-side only.
    #[error("Invalid authentication credentials")]
    Unauthenticated,

    /// Authenticated identity lacks the required role or permission,
    /// or has no profile record (invite-only provisioning).
    #[error("{0}")]
    Forbidden(String),

    /// Request quota exceeded for the client's route class.
    #[error("Too Many Requests")]
    RateLimited { limit: u64, window_seconds: u64 },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthenticated => {
                let body = Json(json!({ "error": self.to_string() }));
                let mut response = (StatusCode::UNAUTHORIZED, body).into_response();
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static("Bearer"),
                );
                response
            }
            ApiError::Forbidden(reason) => {
                let body = Json(json!({ "error": reason }));
                (StatusCode::FORBIDDEN, body).into_response()
            }
            ApiError::RateLimited {
                limit,
                window_seconds,
            } => {
                let body = Json(json!({ "error": "Too Many Requests" }));
                let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
                let headers = response.headers_mut();
                headers.insert("X-RateLimit-Limit", header_value(limit));
                headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));
                headers.insert("Retry-After", header_value(window_seconds));
                response
            }
            ApiError::Internal(msg) => {
                let body = Json(json!({ "error": msg }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

fn header_value(n: u64) -> HeaderValue {
    // Digits are always a valid header value
    HeaderValue::from_str(&n.to_string()).expect("numeric header value")
}

// == Result Type Alias ==
/// Convenience Result type for handlers and auth helpers.
pub type Result<T> = std::result::Result<T, ApiError>;
