//! Core domain types for the forecast proxy.
//!
//! Everything here lives for the duration of a single request: the
//! validated query coming in, the projected result going out, and the
//! error taxonomy that decides what the client sees.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

/// Number of forecast days requested when the client omits `days`.
pub const DEFAULT_FORECAST_DAYS: u32 = 3;

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Where the client wants a forecast for.
///
/// Exactly one form is ever present, so the "city xor coordinates"
/// invariant is carried by the type rather than checked downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationQuery {
    /// Free-form place name, e.g. "New York" or "São Paulo".
    City(String),
    /// Coordinates as the client sent them. Both values are known to
    /// parse as finite numbers; the client's text is kept so it can be
    /// forwarded without reformatting.
    Coordinates { lat: String, lon: String },
}

impl LocationQuery {
    /// Render the upstream `q` parameter.
    ///
    /// City names are percent-encoded; coordinates are joined as
    /// `lat,lon` and left untouched.
    pub fn to_query_param(&self) -> String {
        match self {
            LocationQuery::City(city) => urlencoding::encode(city).into_owned(),
            LocationQuery::Coordinates { lat, lon } => format!("{lat},{lon}"),
        }
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::City(city) => write!(f, "city={city}"),
            LocationQuery::Coordinates { lat, lon } => write!(f, "coords={lat},{lon}"),
        }
    }
}

/// A validated forecast request, ready to be sent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastQuery {
    pub location: LocationQuery,
    /// Number of days to forecast. Always >= 1; the upper bound is
    /// left to the upstream provider.
    pub days: u32,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Reshaped forecast returned to the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub current: CurrentConditions,
    /// One entry per upstream forecast day, in upstream order.
    pub forecast: Vec<DailyForecast>,
    /// Upstream `location` object, passed through as-is.
    pub location: serde_json::Value,
}

/// Conditions "right now" at the resolved location.
///
/// Every field is optional: if the upstream stops sending one, it is
/// omitted from the output instead of failing the request. Numbers are
/// kept as the upstream wrote them (`76` stays `76`, never `76.0`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// °C
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Protocol-relative icon URL as served by the upstream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<Number>,
    /// kph
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<Number>,
    /// °C
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// One day of the multi-day forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    /// `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_temp: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_temp: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Average humidity over the day.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<Number>,
    /// Maximum wind over the day, kph.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunset: Option<String>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

pub const MSG_MISSING_LOCATION: &str = "Either city name or coordinates (lat, lon) are required";
pub const MSG_NON_NUMERIC_COORDINATES: &str = "Coordinates (lat, lon) must be numeric";
pub const MSG_INVALID_DAYS: &str = "days must be a positive integer";
pub const MSG_MALFORMED_QUERY: &str = "Malformed query string";
pub const MSG_CONFIGURATION: &str = "Server configuration error";
pub const MSG_LOCATION_NOT_FOUND: &str = "Location not found";
pub const MSG_INVALID_API_KEY: &str = "Invalid API key";
pub const MSG_API_KEY_UNAUTHORIZED: &str = "API key unauthorized or exceeded quota";
pub const MSG_FETCH_FAILED: &str = "Failed to fetch forecast data";

/// Rejections raised before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The client sent something we can't forward.
    #[error("{0}")]
    InvalidRequest(String),

    /// The upstream credential is missing on this server.
    #[error("upstream API key is not configured")]
    Configuration,
}

/// Failures talking to the upstream provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Upstream could not resolve the location (upstream 400).
    #[error("Location not found")]
    NotFound,

    /// Upstream rejected the key outright (upstream 401).
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Key is disabled or out of quota (upstream 403).
    #[error("API key unauthorized or exceeded quota")]
    Unauthorized,

    /// Anything else: transport failure, timeout, 5xx, undecodable body.
    #[error("Failed to fetch forecast data: {details}")]
    Unavailable { details: String },
}

impl GatewayError {
    /// Credential problems are operational, not user error.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, GatewayError::InvalidApiKey | GatewayError::Unauthorized)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
