//! Engine configuration

use std::time::Duration;

/// Default Electricity Maps API root
pub const DEFAULT_API_BASE_URL: &str = "https://api.electricitymap.org/v3/";

/// Configuration for the telemetry client and caches
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Provider credential; without one the engine serves fallback estimates only
    pub api_key: Option<String>,
    /// Provider API root
    pub api_base_url: String,
    /// Upper bound on a single telemetry call
    pub request_timeout: Duration,
    /// Lifetime of a cached current-intensity reading
    pub intensity_ttl: Duration,
    /// Lifetime of a cached forecast
    pub forecast_ttl: Duration,
    /// Maximum entries held per cache
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(5),
            intensity_ttl: Duration::from_secs(5 * 60),
            forecast_ttl: Duration::from_secs(30 * 60),
            cache_capacity: 100,
        }
    }
}

impl EngineConfig {
    /// True when live telemetry can be attempted
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}
