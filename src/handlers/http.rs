//! HTTP handlers: generated worker script, on-demand generation and health.

use axum::{
    extract::State,
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::error::{AppResult, GeneratorError};
use crate::services::generator::{generate, GeneratorConfig};

const SERVICE_WORKER_ALLOWED: HeaderName = HeaderName::from_static("service-worker-allowed");

/// Shared state: the worker generated once at startup.
#[derive(Clone)]
pub struct AppState {
    pub generator_config: Arc<GeneratorConfig>,
    pub service_worker: Arc<str>,
    /// Path the worker is served at (e.g. `/sw.js`).
    pub sw_path: String,
}

impl AppState {
    pub fn new(config: GeneratorConfig, sw_path: impl Into<String>) -> Result<Self, GeneratorError> {
        let script = generate(&config)?;
        Ok(Self {
            generator_config: Arc::new(config),
            service_worker: Arc::from(script),
            sw_path: sw_path.into(),
        })
    }

    pub fn cache_name(&self) -> &str {
        &self.generator_config.cache_name
    }
}

/// Worker scripts must never be served stale, or updates are never detected.
fn script_response(script: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            (SERVICE_WORKER_ALLOWED, "/"),
        ],
        script,
    )
        .into_response()
}

/// GET {sw_path} — the generated service worker.
pub async fn service_worker(State(state): State<AppState>) -> Response {
    script_response(state.service_worker.to_string())
}

/// POST /api/service-worker — generate a worker from a posted `GeneratorConfig`.
pub async fn generate_worker(Json(body): Json<serde_json::Value>) -> AppResult<Response> {
    let config = GeneratorConfig::from_value(body)?;
    let script = generate(&config)?;
    info!(cache_name = %config.cache_name, bytes = script.len(), "generated worker on demand");
    Ok(script_response(script))
}

/// GET /health — liveness check.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "pwa-kit", "cacheName": state.cache_name() })),
    )
}
