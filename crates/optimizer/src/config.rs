//! Service configuration

use anyhow::Result;
use optimizer_lib::config::{EngineConfig, DEFAULT_API_BASE_URL};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Variable consulted for the provider credential when `CARBON_API_KEY` is unset
pub const LEGACY_API_KEY_VAR: &str = "EL_MAPS_API_KEY";

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Port for the HTTP API
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Electricity Maps credential
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_intensity_ttl")]
    pub intensity_ttl_secs: u64,

    #[serde(default = "default_forecast_ttl")]
    pub forecast_ttl_secs: u64,

    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_api_port() -> u16 {
    8080
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    5
}

fn default_intensity_ttl() -> u64 {
    300
}

fn default_forecast_ttl() -> u64 {
    1800
}

fn default_cache_capacity() -> usize {
    100
}

/// Prefer the configured key, then the legacy variable. Blank keys count as unset.
fn resolve_api_key(configured: Option<String>, legacy: Option<String>) -> Option<String> {
    configured
        .into_iter()
        .chain(legacy)
        .find(|k| !k.trim().is_empty())
}

impl ServiceConfig {
    /// Load from an optional `carbon-optimizer.{toml,json,yaml}` in the
    /// working directory, then `CARBON_*` environment variables
    pub fn load() -> Result<Self> {
        Self::load_from(config::File::with_name("carbon-optimizer").required(false))
    }

    /// Load with an explicit config file
    pub fn load_file(path: &Path) -> Result<Self> {
        Self::load_from(config::File::from(path))
    }

    fn load_from(file: config::File<config::FileSourceFile, config::FileFormat>) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix("CARBON").try_parsing(true))
            .build()?;

        let mut service: ServiceConfig = config.try_deserialize()?;
        service.api_key = resolve_api_key(
            service.api_key.take(),
            std::env::var(LEGACY_API_KEY_VAR).ok(),
        );
        Ok(service)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            api_key: self.api_key.clone(),
            api_base_url: self.api_base_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            intensity_ttl: Duration::from_secs(self.intensity_ttl_secs),
            forecast_ttl: Duration::from_secs(self.forecast_ttl_secs),
            cache_capacity: self.cache_capacity,
        }
    }
}
