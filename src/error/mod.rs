//! Error types: HTTP-facing application errors and per-concern failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level errors surfaced by the dev server.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Generator(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Io(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("I/O error: {}", e),
            ),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Caller errors when building a service worker. Never raised at worker runtime.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid generator config: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("malformed generator config: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Failure reported by a browser capability behind [`crate::bridge::Platform`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct PlatformError(pub String);

impl PlatformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Why a fetch inside the worker model produced no response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("precache of {url} failed with status {status}")]
    Precache { url: String, status: u16 },
}
