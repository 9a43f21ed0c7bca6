//! HTTP server: Axum router for the forecast API.
//!
//! Serves `/api/forecast` and `/api/health`. CORS is restricted to the
//! configured origin allow-list, with credentials.

pub mod error;
pub mod middleware;
pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

pub use routes::{AppState, ProxyState};

/// Bind and serve until Ctrl+C.
pub async fn serve(state: AppState, allowed_origins: &[String]) -> Result<()> {
    let port = state.port;
    let app = build_router(state, allowed_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!(port, "Server running on http://localhost:{port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down cleanly");
    Ok(())
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/api/forecast", get(routes::get_forecast))
        .route("/api/health", get(routes::health))
        .layer(cors_layer(allowed_origins))
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .with_state(state)
}

/// Allow-list CORS. Requests without an `Origin` header (curl, server
/// to server) are unaffected; unknown origins get no CORS headers and
/// the browser blocks them.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
