//! Pull-through TTL cache over the telemetry provider
//!
//! Two independent caches (current intensity, forecast) keyed by zone.
//! Expiry is checked lazily on read. Concurrent misses for the same zone may
//! both reach the provider; the last write wins with the same TTL.

use super::{Clock, TelemetrySource};
use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::error::TelemetryError;
use crate::health::{components, HealthRegistry};
use crate::models::{CarbonReading, ForecastSeries, Zone};
use crate::observability::{caches, EngineMetrics, StructuredLogger};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    expires_at: DateTime<Utc>,
}

/// Where a current-intensity reading came from
#[derive(Debug)]
pub enum IntensityLookup {
    Cached(CarbonReading),
    Live(CarbonReading),
    /// Static estimate served because the live source failed; never cached
    Fallback {
        reading: CarbonReading,
        reason: TelemetryError,
    },
}

impl IntensityLookup {
    pub fn reading(&self) -> &CarbonReading {
        match self {
            IntensityLookup::Cached(r) | IntensityLookup::Live(r) => r,
            IntensityLookup::Fallback { reading, .. } => reading,
        }
    }

    pub fn into_reading(self) -> CarbonReading {
        match self {
            IntensityLookup::Cached(r) | IntensityLookup::Live(r) => r,
            IntensityLookup::Fallback { reading, .. } => reading,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, IntensityLookup::Fallback { .. })
    }
}

/// Shared telemetry cache with fallback to static estimates
pub struct TelemetryCache {
    source: Arc<dyn TelemetrySource>,
    catalog: Arc<Catalog>,
    clock: Arc<dyn Clock>,
    intensity_ttl: chrono::Duration,
    forecast_ttl: chrono::Duration,
    fetch_timeout: Duration,
    capacity: usize,
    intensity: DashMap<Zone, CacheEntry<CarbonReading>>,
    forecast: DashMap<Zone, CacheEntry<ForecastSeries>>,
    metrics: EngineMetrics,
    logger: StructuredLogger,
    health: Option<HealthRegistry>,
}

fn to_chrono(ttl: Duration) -> chrono::Duration {
    chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(365))
}

impl TelemetryCache {
    pub fn new(
        source: Arc<dyn TelemetrySource>,
        catalog: Arc<Catalog>,
        clock: Arc<dyn Clock>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            source,
            catalog,
            clock,
            intensity_ttl: to_chrono(config.intensity_ttl),
            forecast_ttl: to_chrono(config.forecast_ttl),
            fetch_timeout: config.request_timeout,
            capacity: config.cache_capacity,
            intensity: DashMap::new(),
            forecast: DashMap::new(),
            metrics: EngineMetrics::new(),
            logger: StructuredLogger::new("carbon-optimizer"),
            health: None,
        }
    }

    /// Report telemetry health transitions to a registry
    pub fn with_health(mut self, health: HealthRegistry) -> Self {
        self.health = Some(health);
        self
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Current intensity for a zone; never fails
    pub async fn get_intensity(&self, zone: &str) -> CarbonReading {
        self.lookup_intensity(zone).await.into_reading()
    }

    /// Current intensity for a zone, tagged with its provenance
    pub async fn lookup_intensity(&self, zone: &str) -> IntensityLookup {
        let now = self.clock.now();
        if let Some(reading) = cached(&self.intensity, zone, now) {
            self.metrics.observe_cache_lookup(caches::INTENSITY, true);
            debug!(zone = %zone, "Using cached carbon intensity");
            return IntensityLookup::Cached(reading);
        }
        self.metrics.observe_cache_lookup(caches::INTENSITY, false);

        match self.fetch("latest", self.source.latest(zone)).await {
            Ok(reading) => {
                let entry = CacheEntry {
                    value: reading.clone(),
                    expires_at: self.clock.now() + self.intensity_ttl,
                };
                insert_bounded(&self.intensity, self.capacity, now, zone, entry);
                self.metrics
                    .set_cache_entries(caches::INTENSITY, self.intensity.len());
                self.report_live().await;
                debug!(
                    zone = %zone,
                    intensity = reading.intensity_g_per_kwh,
                    "Fetched carbon intensity"
                );
                IntensityLookup::Live(reading)
            }
            Err(reason) => {
                let reading = self.fallback_reading(zone);
                self.metrics.inc_fallback(&reason);
                self.logger
                    .log_telemetry_fallback(zone, &reason, reading.intensity_g_per_kwh);
                self.report_fallback(&reason).await;
                IntensityLookup::Fallback { reading, reason }
            }
        }
    }

    /// Forecast for a zone; `None` when the provider cannot supply one
    pub async fn get_forecast(&self, zone: &str) -> Option<ForecastSeries> {
        let now = self.clock.now();
        if let Some(series) = cached(&self.forecast, zone, now) {
            self.metrics.observe_cache_lookup(caches::FORECAST, true);
            debug!(zone = %zone, "Using cached forecast");
            return Some(series);
        }
        self.metrics.observe_cache_lookup(caches::FORECAST, false);

        match self.fetch("forecast", self.source.forecast(zone)).await {
            Ok(series) => {
                debug!(zone = %zone, points = series.len(), "Fetched forecast");
                let entry = CacheEntry {
                    value: series.clone(),
                    expires_at: self.clock.now() + self.forecast_ttl,
                };
                insert_bounded(&self.forecast, self.capacity, now, zone, entry);
                self.metrics
                    .set_cache_entries(caches::FORECAST, self.forecast.len());
                Some(series)
            }
            Err(reason) => {
                debug!(zone = %zone, error = %reason, "Forecast unavailable");
                None
            }
        }
    }

    pub fn cached_intensities(&self) -> usize {
        self.intensity.len()
    }

    pub fn cached_forecasts(&self) -> usize {
        self.forecast.len()
    }

    async fn fetch<T>(
        &self,
        endpoint: &str,
        call: impl Future<Output = Result<T, TelemetryError>>,
    ) -> Result<T, TelemetryError> {
        let start = Instant::now();
        let result = tokio::time::timeout(self.fetch_timeout, call)
            .await
            .unwrap_or(Err(TelemetryError::Timeout(self.fetch_timeout)));
        self.metrics
            .observe_fetch_latency(endpoint, start.elapsed().as_secs_f64());
        result
    }

    fn fallback_reading(&self, zone: &str) -> CarbonReading {
        CarbonReading {
            zone: zone.to_string(),
            intensity_g_per_kwh: self.catalog.fallback_intensity(zone),
            renewable_pct: None,
            fossil_free_pct: None,
            observed_at: self.clock.now(),
            is_estimate: true,
        }
    }

    async fn report_live(&self) {
        if let Some(health) = &self.health {
            health.set_healthy(components::TELEMETRY).await;
        }
    }

    async fn report_fallback(&self, reason: &TelemetryError) {
        if let Some(health) = &self.health {
            health
                .set_degraded(
                    components::TELEMETRY,
                    format!("serving fallback estimates: {}", reason),
                )
                .await;
        }
    }
}

/// Non-expired value for a key. Drops the entry if it has expired.
fn cached<T: Clone>(map: &DashMap<Zone, CacheEntry<T>>, zone: &str, now: DateTime<Utc>) -> Option<T> {
    let hit = map
        .get(zone)
        .filter(|entry| now < entry.expires_at)
        .map(|entry| entry.value.clone());
    if hit.is_none() {
        map.remove_if(zone, |_, entry| entry.expires_at <= now);
    }
    hit
}

/// Insert, making room first when the cache is at capacity: expired entries
/// go, then the entry closest to expiry.
fn insert_bounded<T>(
    map: &DashMap<Zone, CacheEntry<T>>,
    capacity: usize,
    now: DateTime<Utc>,
    zone: &str,
    entry: CacheEntry<T>,
) {
    if capacity == 0 {
        return;
    }
    if !map.contains_key(zone) && map.len() >= capacity {
        map.retain(|_, e| e.expires_at > now);
        if map.len() >= capacity {
            let victim = map
                .iter()
                .min_by_key(|e| e.value().expires_at)
                .map(|e| e.key().clone());
            if let Some(key) = victim {
                map.remove(&key);
            }
        }
    }
    map.insert(zone.to_string(), entry);
}
