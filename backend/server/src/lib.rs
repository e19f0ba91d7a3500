//! Proxy in front of the Korean food safety product registry.
//!
//! # General Infrastructure
//! - Tracker (or any other front-end) calls `GET /api/search` on this server
//! - Server injects the registry key into the upstream path and forwards the window
//! - Upstream JSON comes back untouched, errors get mapped (see [`search`])
//! - No caching, no retries, no timeouts, every failure is terminal for that request
//!
//!
//!
//! # Configuration
//!
//! | Variable | Default | Notes |
//! |---|---|---|
//! | `RUST_PORT` | `1111` | Listen port |
//! | `FOOD_API_URL` | `https://openapi.foodsafetykorea.go.kr/api` | Registry base |
//! | `FOOD_API_KEY_NAME` | `FOOD_API_KEY` | Which variable/secret holds the key |
//! | `FOOD_API_KEY` | none | Read per request, falls back to `/run/secrets/FOOD_API_KEY` |
//!
//! A missing key does not stop the server from booting. Requests fail with a
//! `500` until it shows up.
//!
//!
//!
//! # Setup
//!
//! Run locally.
//! ```sh
//! FOOD_API_KEY=... RUST_LOG=info cargo run -p food
//! ```
use std::{future::pending, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::get,
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod routes;
pub mod search;
pub mod state;

use config::Config;
use routes::search_handler;
use state::AppState;

pub async fn start_server() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;
    let port = config.port;

    let state = AppState::new(config);

    info!("Starting server...");

    let address = format!("0.0.0.0:{port}");
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");

    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/search", get(search_handler))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
