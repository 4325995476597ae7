//! Outreach - content API for a non-profit website
//!
//! Serves campaigns, sponsors, blog posts, stories, projects, team members
//! and the gallery to the public site, plus the JWT-protected admin API.

use std::net::SocketAddr;

use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use outreach::config::{self, LogFormat};
use outreach::{api, middleware, AppState, Error, Result};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "outreach=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    match LogFormat::from_env() {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    // Load configuration
    let config = config::init();
    tracing::info!(
        "Starting Outreach server on {}:{}",
        config.server.host,
        config.server.port
    );

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| Error::Internal(format!("Failed to install metrics recorder: {}", e)))?;

    // Initialize application state
    let state = AppState::new(config.clone()).await?.with_metrics(metrics);
    tracing::info!("Application state initialized");

    api::status::init_startup_time();

    tokio::fs::create_dir_all(&config.storage.public_path).await?;

    // Build router
    let mut app = Router::new().merge(api::routes(state.clone()));

    // Serve public storage when it is mounted on this host
    let public_url = config.storage.public_url.trim_end_matches('/');
    if public_url.starts_with('/') && public_url.len() > 1 {
        app = app.nest_service(public_url, ServeDir::new(&config.storage.public_path));
    } else {
        tracing::info!("STORAGE_URL is external, not serving {}", config.storage.public_path.display());
    }

    let app = app
        .layer(axum::middleware::from_fn(middleware::track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| Error::Internal(format!("Invalid listen address: {}", e)))?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
