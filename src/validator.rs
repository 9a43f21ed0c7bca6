//! Request validation.
//!
//! Turns the raw `/api/forecast` query string into a [`ForecastQuery`]
//! or a [`RequestError`]. Pure: no I/O, no logging. Runs before any
//! upstream call is attempted.

use serde::Deserialize;

use crate::types::{
    ForecastQuery, LocationQuery, RequestError, DEFAULT_FORECAST_DAYS, MSG_INVALID_DAYS,
    MSG_MISSING_LOCATION, MSG_NON_NUMERIC_COORDINATES,
};

/// Query parameters exactly as the client sent them.
///
/// Everything is kept as text so that malformed values reach
/// [`validate`] and get our error body instead of a framework
/// rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastParams {
    pub city: Option<String>,
    pub days: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

/// Validate raw parameters.
///
/// `api_key_configured` is checked after the client input, so a bad
/// request is reported as a 400 even on a misconfigured server.
pub fn validate(
    params: &ForecastParams,
    api_key_configured: bool,
) -> Result<ForecastQuery, RequestError> {
    let location = parse_location(params)?;
    let days = parse_days(params.days.as_deref())?;

    if !api_key_configured {
        return Err(RequestError::Configuration);
    }

    Ok(ForecastQuery { location, days })
}

fn parse_location(params: &ForecastParams) -> Result<LocationQuery, RequestError> {
    // City wins when both forms are present.
    if let Some(city) = present(&params.city) {
        return Ok(LocationQuery::City(city.to_string()));
    }

    match (present(&params.lat), present(&params.lon)) {
        (Some(lat), Some(lon)) => {
            if !is_finite_number(lat) || !is_finite_number(lon) {
                return Err(RequestError::InvalidRequest(
                    MSG_NON_NUMERIC_COORDINATES.to_string(),
                ));
            }
            Ok(LocationQuery::Coordinates {
                lat: strip_plus(lat).to_string(),
                lon: strip_plus(lon).to_string(),
            })
        }
        _ => Err(RequestError::InvalidRequest(MSG_MISSING_LOCATION.to_string())),
    }
}

fn parse_days(raw: Option<&str>) -> Result<u32, RequestError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_FORECAST_DAYS);
    };

    match raw.parse::<u32>() {
        Ok(days) if days >= 1 => Ok(days),
        _ => Err(RequestError::InvalidRequest(MSG_INVALID_DAYS.to_string())),
    }
}

/// Empty strings count as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// A leading `+` would reach the upstream unencoded and be read back
/// as a space.
fn strip_plus(s: &str) -> &str {
    s.strip_prefix('+').unwrap_or(s)
}

fn is_finite_number(s: &str) -> bool {
    s.parse::<f64>().is_ok_and(f64::is_finite)
}
