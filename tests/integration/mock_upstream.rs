//! Mock upstream for integration testing.
//!
//! Provides a `wiremock` server that speaks enough of the WeatherAPI
//! forecast endpoint for deterministic tests, plus helpers to wire the
//! real gateway and router to it.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use forecast_proxy::config::UpstreamConfig;
use forecast_proxy::gateway::weatherapi::WeatherApiGateway;
use forecast_proxy::server::{build_router, ProxyState};

pub const TEST_KEY: &str = "test-key";
pub const FORECAST_PATH: &str = "/v1/forecast.json";

const FIXTURE: &str = include_str!("../fixtures/forecast_london.json");

/// The London fixture as sent by the upstream.
pub fn fixture() -> Value {
    serde_json::from_str(FIXTURE).expect("fixture is valid JSON")
}

/// The fixture with the location renamed, for telling responses apart.
pub fn fixture_named(name: &str) -> Value {
    let mut doc = fixture();
    doc["location"]["name"] = json!(name);
    doc
}

/// WeatherAPI's error envelope.
pub fn upstream_error(code: i64, message: &str) -> Value {
    json!({ "error": { "code": code, "message": message } })
}

/// Upstream config pointing at the mock server.
pub fn upstream_config(server: &MockServer, key: Option<&str>, timeout_secs: u64) -> UpstreamConfig {
    UpstreamConfig {
        base_url: format!("{}/v1", server.uri()),
        timeout_secs,
        api_key: key.map(|k| SecretString::new(k.to_string())),
    }
}

pub fn gateway_for(server: &MockServer) -> WeatherApiGateway {
    WeatherApiGateway::new(upstream_config(server, Some(TEST_KEY), 5)).expect("gateway builds")
}

/// Full router wired to a real gateway pointed at `server`.
pub fn app_for(server: &MockServer) -> Router {
    app_with_gateway(gateway_for(server))
}

pub fn app_with_gateway(gateway: WeatherApiGateway) -> Router {
    let state = Arc::new(ProxyState::new(Arc::new(gateway), 5000));
    build_router(state, &["http://localhost:3000".to_string()])
}

/// Mount a 200 response for `q=<city>` (decoded form).
pub async fn mount_city(server: &MockServer, city: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .and(query_param("q", city))
        .and(query_param("key", TEST_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount a fixed status + body for every forecast request.
pub async fn mount_status(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path(FORECAST_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

/// Send a GET through the router and decode the JSON body.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

/// Raw query strings the upstream received, in arrival order.
pub async fn received_queries(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.url.query().unwrap_or_default().to_string())
        .collect()
}
