//! Entry point: load config, generate the service worker, and serve the PWA.

use pwa_kit::config::Config;
use pwa_kit::services::versioning::asset_path;
use pwa_kit::{create_app, AppState};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let generator_config = config.generator_config()?;
    let state = AppState::new(generator_config, config.sw_path.clone())?;
    tracing::info!(cache_name = %state.cache_name(), sw_path = %state.sw_path, "service worker generated");

    if let Some(output) = &config.sw_output {
        tokio::fs::write(output, state.service_worker.as_bytes()).await?;
        tracing::info!(path = %output.display(), "service worker written");
    }

    // Unknown paths get the app shell, same as the worker's navigation tier.
    let shell = asset_path(&config.static_dir, &state.generator_config.navigation_fallback)
        .unwrap_or_else(|| config.static_dir.join("index.html"));
    let static_files = ServeDir::new(&config.static_dir).not_found_service(ServeFile::new(shell));

    let app = create_app(state)
        .fallback_service(static_files)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!(addr = %config.server_addr, static_dir = %config.static_dir.display(), "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
