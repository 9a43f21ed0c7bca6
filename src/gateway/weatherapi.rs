//! WeatherAPI.com forecast client.
//!
//! API: `GET {base}/forecast.json?key=..&q=..&days=..&aqi=no`
//! Auth: API key as a query parameter.
//! Errors: JSON body `{"error":{"code":N,"message":".."}}` with
//! 400 (bad location), 401 (bad key) or 403 (disabled key / quota).

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Number;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::ForecastGateway;
use crate::config::UpstreamConfig;
use crate::types::{
    CurrentConditions, DailyForecast, ForecastQuery, ForecastResult, GatewayError,
};

const USER_AGENT: &str = concat!("forecast-proxy/", env!("CARGO_PKG_VERSION"));

/// Longest upstream body excerpt carried into diagnostics.
const MAX_BODY_EXCERPT: usize = 200;

// ---------------------------------------------------------------------------
// API response types (WeatherAPI JSON → Rust)
// ---------------------------------------------------------------------------

// Every field is optional. A field the provider stops sending becomes
// an absent field in our output rather than a failed request.

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WaForecastResponse {
    #[serde(default)]
    location: Option<serde_json::Value>,
    #[serde(default)]
    current: Option<WaCurrent>,
    #[serde(default)]
    forecast: Option<WaForecast>,
}

#[derive(Debug, Default, Deserialize)]
struct WaLocation {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WaCondition {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WaCurrent {
    #[serde(default)]
    temp_c: Option<Number>,
    #[serde(default)]
    condition: Option<WaCondition>,
    #[serde(default)]
    humidity: Option<Number>,
    #[serde(default)]
    wind_kph: Option<Number>,
    #[serde(default)]
    feelslike_c: Option<Number>,
    #[serde(default)]
    last_updated: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WaForecast {
    #[serde(default)]
    forecastday: Option<Vec<WaForecastDay>>,
}

#[derive(Debug, Default, Deserialize)]
struct WaForecastDay {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    day: Option<WaDay>,
    #[serde(default)]
    astro: Option<WaAstro>,
}

#[derive(Debug, Default, Deserialize)]
struct WaDay {
    #[serde(default)]
    maxtemp_c: Option<Number>,
    #[serde(default)]
    mintemp_c: Option<Number>,
    #[serde(default)]
    avghumidity: Option<Number>,
    #[serde(default)]
    maxwind_kph: Option<Number>,
    #[serde(default)]
    condition: Option<WaCondition>,
}

#[derive(Debug, Default, Deserialize)]
struct WaAstro {
    #[serde(default)]
    sunrise: Option<String>,
    #[serde(default)]
    sunset: Option<String>,
}

/// Error envelope, e.g. `{"error":{"code":1006,"message":"No matching location found."}}`.
#[derive(Debug, Deserialize)]
struct WaErrorEnvelope {
    error: WaErrorBody,
}

#[derive(Debug, Deserialize)]
struct WaErrorBody {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// WeatherAPI.com gateway.
pub struct WeatherApiGateway {
    http: Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl WeatherApiGateway {
    /// Build the gateway from upstream config.
    ///
    /// The HTTP client carries the configured timeout; a timed-out call
    /// surfaces as [`GatewayError::Unavailable`].
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client for WeatherAPI")?;

        let api_key = config
            .api_key
            .filter(|k| !k.expose_secret().is_empty());

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Full request URL. Contains the API key: never log it.
    ///
    /// Built by hand so `q` is exactly the percent-encoded city or the
    /// raw `lat,lon` pair.
    fn forecast_url(&self, query: &ForecastQuery) -> String {
        let key = self
            .api_key
            .as_ref()
            .map(|k| k.expose_secret().as_str())
            .unwrap_or_default();

        format!(
            "{}/forecast.json?key={}&q={}&days={}&aqi=no",
            self.base_url,
            urlencoding::encode(key),
            query.location.to_query_param(),
            query.days,
        )
    }
}

#[async_trait]
impl ForecastGateway for WeatherApiGateway {
    fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch(&self, query: &ForecastQuery) -> Result<ForecastResult, GatewayError> {
        let url = self.forecast_url(query);
        debug!(location = %query.location, days = query.days, "Fetching WeatherAPI forecast");

        let resp = self.http.get(&url).send().await.map_err(|e| {
            let details = describe_transport_error(e);
            error!(location = %query.location, error = %details, "Forecast API request failed");
            GatewayError::Unavailable { details }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let err = classify_failure(status, &body);
            log_failure(query, status, &body, &err);
            return Err(err);
        }

        let data: WaForecastResponse = resp.json().await.map_err(|e| {
            let details = format!("Failed to parse WeatherAPI response: {}", without_url(e));
            error!(location = %query.location, error = %details, "Forecast API returned an unreadable body");
            GatewayError::Unavailable { details }
        })?;

        let result = project(data);
        debug!(
            location = %query.location,
            days_returned = result.forecast.len(),
            "Forecast projected"
        );
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Reshape the upstream document into the client schema.
pub(crate) fn project(data: WaForecastResponse) -> ForecastResult {
    let raw_location = data.location.unwrap_or(serde_json::Value::Null);
    let location: WaLocation = serde_json::from_value(raw_location.clone()).unwrap_or_default();

    let current = data.current.unwrap_or_default();
    let current_condition = current.condition.unwrap_or_default();

    let current = CurrentConditions {
        location: location.name,
        country: location.country,
        temperature: current.temp_c,
        condition: current_condition.text,
        icon: current_condition.icon,
        humidity: current.humidity,
        wind_speed: current.wind_kph,
        feels_like: current.feelslike_c,
        last_updated: current.last_updated,
    };

    let forecast = data
        .forecast
        .and_then(|f| f.forecastday)
        .unwrap_or_default()
        .into_iter()
        .map(project_day)
        .collect();

    ForecastResult {
        current,
        forecast,
        location: raw_location,
    }
}

fn project_day(entry: WaForecastDay) -> DailyForecast {
    let day = entry.day.unwrap_or_default();
    let condition = day.condition.unwrap_or_default();
    let astro = entry.astro.unwrap_or_default();

    DailyForecast {
        date: entry.date,
        max_temp: day.maxtemp_c,
        min_temp: day.mintemp_c,
        condition: condition.text,
        icon: condition.icon,
        humidity: day.avghumidity,
        wind_speed: day.maxwind_kph,
        sunrise: astro.sunrise,
        sunset: astro.sunset,
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Map a non-2xx upstream response to a gateway error.
pub(crate) fn classify_failure(status: StatusCode, body: &str) -> GatewayError {
    match status {
        StatusCode::BAD_REQUEST => GatewayError::NotFound,
        StatusCode::UNAUTHORIZED => GatewayError::InvalidApiKey,
        StatusCode::FORBIDDEN => GatewayError::Unauthorized,
        _ => {
            let details = match upstream_message(body) {
                Some(msg) => format!("WeatherAPI error {status}: {msg}"),
                None => format!("WeatherAPI error {status}"),
            };
            GatewayError::Unavailable { details }
        }
    }
}

fn upstream_message(body: &str) -> Option<String> {
    let envelope: WaErrorEnvelope = serde_json::from_str(body).ok()?;
    let message = envelope.error.message?;
    Some(match envelope.error.code {
        Some(code) => format!("{message} (code {code})"),
        None => message,
    })
}

fn log_failure(query: &ForecastQuery, status: StatusCode, body: &str, err: &GatewayError) {
    let upstream = upstream_message(body).unwrap_or_else(|| excerpt(body));
    match err {
        GatewayError::NotFound => {
            warn!(location = %query.location, %status, upstream = %upstream, "Forecast location not found");
        }
        e if e.is_auth_failure() => {
            error!(%status, upstream = %upstream, "WeatherAPI rejected the API key");
        }
        _ => {
            error!(location = %query.location, %status, upstream = %upstream, "Forecast API error");
        }
    }
}

/// Transport errors print the request URL, which carries the key.
fn describe_transport_error(e: reqwest::Error) -> String {
    if e.is_timeout() {
        "WeatherAPI request timed out".to_string()
    } else if e.is_connect() {
        format!("Could not connect to WeatherAPI: {}", without_url(e))
    } else {
        format!("WeatherAPI request failed: {}", without_url(e))
    }
}

fn without_url(e: reqwest::Error) -> String {
    e.without_url().to_string()
}

fn excerpt(body: &str) -> String {
    if body.len() <= MAX_BODY_EXCERPT {
        return body.to_string();
    }
    let mut end = MAX_BODY_EXCERPT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
