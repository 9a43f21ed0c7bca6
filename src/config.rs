//! Configuration loading from TOML with environment variable overrides.
//!
//! Built-in defaults, then an optional `config.toml`, then the process
//! environment. The upstream API key is only ever read from the
//! environment and is held as a `SecretString` so it never shows up in
//! `Debug` output or logs.

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Top-level application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Browser origins allowed to call the API with credentials.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// WeatherAPI base, without the trailing `/forecast.json`.
    pub base_url: String,
    pub timeout_secs: u64,
    /// `WEATHER_API_KEY`. Never read from the TOML file.
    #[serde(skip)]
    pub api_key: Option<SecretString>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key: None,
        }
    }
}

impl UpstreamConfig {
    pub fn api_key_configured(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }
}

impl AppConfig {
    /// Full startup resolution: TOML file (from `FORECAST_CONFIG` or
    /// `config.toml`), then environment overrides.
    pub fn resolve() -> Result<Self> {
        let path = std::env::var("FORECAST_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load(&path)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults; a file that exists but does
    /// not parse is an error.
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            info!(path, "No config file found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        debug!(path, "Config file loaded");
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Overlay environment variables on top of the current values.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map so
    /// the process environment is never mutated.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(port) = non_empty("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {port}"))?;
        }

        if let Some(origins) = non_empty("ALLOWED_ORIGINS") {
            self.server.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(url) = non_empty("WEATHER_API_BASE_URL") {
            self.upstream.base_url = url.trim().to_string();
        }

        if let Some(secs) = non_empty("UPSTREAM_TIMEOUT_SECS") {
            self.upstream.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid UPSTREAM_TIMEOUT_SECS value: {secs}"))?;
        }

        if let Some(key) = non_empty("WEATHER_API_KEY") {
            self.upstream.api_key = Some(SecretString::new(key.trim().to_string()));
        }

        Ok(())
    }
}
