//! Error types for the rewards API server.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use praxis_engine::EngineError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body failed validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// An engine operation failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::InvalidRequest(errors.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Engine(err) => match err {
                EngineError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                EngineError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
                EngineError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
                EngineError::Consistency(_) | EngineError::Store(_) => {
                    // Storage detail stays in the logs, not the response.
                    tracing::error!(error = %err, "internal error serving request");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        String::from("internal error"),
                    )
                }
            },
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
