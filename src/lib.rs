//! PWA integration kit built with Rust.
//!
//! Generates service worker scripts from a small configuration, bridges
//! browser PWA events and application commands over a tagged two-channel
//! protocol, and serves a built PWA with its generated worker.

pub mod bridge;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod worker;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;
pub use services::generator::{generate, GeneratorConfig};

use axum::routing::{get, post};
use handlers::http;

/// Build the router (worker script, on-demand generation, health). Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let sw_path = state.sw_path.clone();
    axum::Router::new()
        .route(&sw_path, get(http::service_worker))
        .route("/api/service-worker", post(http::generate_worker))
        .route("/health", get(http::health))
        .with_state(state)
}
