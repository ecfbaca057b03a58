//! Error types for the request adapter.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use agora_engine::EngineError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the request adapter.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A user, subreddit, or post named by the request does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request was malformed or rejected by a membership rule.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The engine rejected a reference the adapter had already resolved.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        if err.is_precondition_violation() {
            Self::Internal(err.to_string())
        } else {
            Self::BadRequest(err.to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
