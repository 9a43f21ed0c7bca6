//! Forecast proxy entry point.
//!
//! Loads `.env` and configuration, initialises structured logging,
//! builds the upstream gateway and serves the HTTP API until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use forecast_proxy::config::AppConfig;
use forecast_proxy::gateway::weatherapi::WeatherApiGateway;
use forecast_proxy::server::{self, ProxyState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let AppConfig { server: server_cfg, upstream } = AppConfig::resolve()?;

    let api_key_configured = upstream.api_key_configured();
    info!(
        port = server_cfg.port,
        upstream = %upstream.base_url,
        timeout_secs = upstream.timeout_secs,
        allowed_origins = server_cfg.allowed_origins.len(),
        api_key_configured,
        "Forecast proxy starting up"
    );
    if !api_key_configured {
        warn!("WEATHER_API_KEY is not set; forecast requests will fail until it is");
    }

    let gateway = WeatherApiGateway::new(upstream)?;
    let state = Arc::new(ProxyState::new(Arc::new(gateway), server_cfg.port));

    server::serve(state, &server_cfg.allowed_origins).await
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("forecast_proxy=info,tower_http=info"));

    let json_logging = std::env::var("FORECAST_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
