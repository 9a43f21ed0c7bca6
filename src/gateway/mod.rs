//! Forecast gateway.
//!
//! Defines the `ForecastGateway` trait the HTTP layer talks to, and the
//! WeatherAPI.com implementation used in production.

pub mod weatherapi;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::types::{ForecastQuery, ForecastResult, GatewayError};

/// Abstraction over the upstream forecast provider.
///
/// One call per request, no retries: a failed call is returned as-is
/// and the caller turns it into a client-facing error.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ForecastGateway: Send + Sync {
    /// Whether an upstream credential is configured. Pure config read.
    fn has_credentials(&self) -> bool;

    /// Fetch and project a forecast for an already-validated query.
    async fn fetch(&self, query: &ForecastQuery) -> Result<ForecastResult, GatewayError>;
}
