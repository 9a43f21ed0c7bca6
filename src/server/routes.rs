//! API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<ProxyState>` and
//! is read-only: nothing carries over from one request to the next.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::ApiError;
use crate::gateway::ForecastGateway;
use crate::types::ForecastResult;
use crate::validator::{self, ForecastParams};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Everything a handler needs, fixed at startup.
pub struct ProxyState {
    pub gateway: Arc<dyn ForecastGateway>,
    /// Listen port, echoed by the health endpoint.
    pub port: u16,
}

impl ProxyState {
    pub fn new(gateway: Arc<dyn ForecastGateway>, port: u16) -> Self {
        Self { gateway, port }
    }
}

pub type AppState = Arc<ProxyState>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub port: u16,
    pub api_key_configured: bool,
    /// RFC 3339, UTC.
    pub timestamp: String,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/forecast
pub async fn get_forecast(
    State(state): State<AppState>,
    params: Result<Query<ForecastParams>, QueryRejection>,
) -> Result<Json<ForecastResult>, ApiError> {
    let Query(params) = params?;
    let query = validator::validate(&params, state.gateway.has_credentials())?;
    let forecast = state.gateway.fetch(&query).await?;
    Ok(Json(forecast))
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Server is running".to_string(),
        port: state.port,
        api_key_configured: state.gateway.has_credentials(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
