//! Observability for the optimization engine
//!
//! Provides:
//! - Prometheus metrics (cache hit ratio, telemetry latency, fallbacks, recommendations)
//! - Structured JSON logging with tracing

use crate::error::TelemetryError;
use crate::models::{Priority, Recommendation, ScheduleWindow, Workload};
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec, HistogramVec,
    IntCounterVec, IntGaugeVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for telemetry round-trips (in seconds)
const FETCH_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Cache label values
pub mod caches {
    pub const INTENSITY: &str = "intensity";
    pub const FORECAST: &str = "forecast";
}

static GLOBAL_METRICS: OnceLock<EngineMetricsInner> = OnceLock::new();

struct EngineMetricsInner {
    cache_requests: IntCounterVec,
    cache_entries: IntGaugeVec,
    telemetry_fetch_seconds: HistogramVec,
    telemetry_fallbacks: IntCounterVec,
    recommendations: IntCounterVec,
    comparisons: IntCounterVec,
}

impl EngineMetricsInner {
    fn new() -> Self {
        Self {
            cache_requests: register_int_counter_vec!(
                "carbon_optimizer_cache_requests_total",
                "Telemetry cache lookups by cache and outcome",
                &["cache", "outcome"]
            )
            .expect("Failed to register cache_requests_total"),

            cache_entries: register_int_gauge_vec!(
                "carbon_optimizer_cache_entries",
                "Entries currently held per telemetry cache",
                &["cache"]
            )
            .expect("Failed to register cache_entries"),

            telemetry_fetch_seconds: register_histogram_vec!(
                "carbon_optimizer_telemetry_fetch_seconds",
                "Round-trip time of telemetry provider calls",
                &["endpoint"],
                FETCH_BUCKETS.to_vec()
            )
            .expect("Failed to register telemetry_fetch_seconds"),

            telemetry_fallbacks: register_int_counter_vec!(
                "carbon_optimizer_telemetry_fallbacks_total",
                "Readings served from static estimates, by failure kind",
                &["reason"]
            )
            .expect("Failed to register telemetry_fallbacks_total"),

            recommendations: register_int_counter_vec!(
                "carbon_optimizer_recommendations_total",
                "Recommendation sets generated, by priority",
                &["priority"]
            )
            .expect("Failed to register recommendations_total"),

            comparisons: register_int_counter_vec!(
                "carbon_optimizer_comparisons_total",
                "Comparison requests served, by whether any option resolved",
                &["resolved"]
            )
            .expect("Failed to register comparisons_total"),
        }
    }
}

/// Handle to the process-wide engine metrics.
///
/// Clones share the same underlying Prometheus collectors.
#[derive(Clone)]
pub struct EngineMetrics {
    _private: (),
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &EngineMetricsInner {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new)
    }

    pub fn observe_cache_lookup(&self, cache: &str, hit: bool) {
        let outcome = if hit { "hit" } else { "miss" };
        self.inner()
            .cache_requests
            .with_label_values(&[cache, outcome])
            .inc();
    }

    pub fn set_cache_entries(&self, cache: &str, entries: usize) {
        self.inner()
            .cache_entries
            .with_label_values(&[cache])
            .set(entries as i64);
    }

    pub fn observe_fetch_latency(&self, endpoint: &str, duration_secs: f64) {
        self.inner()
            .telemetry_fetch_seconds
            .with_label_values(&[endpoint])
            .observe(duration_secs);
    }

    pub fn inc_fallback(&self, reason: &TelemetryError) {
        self.inner()
            .telemetry_fallbacks
            .with_label_values(&[reason.kind()])
            .inc();
    }

    pub fn inc_recommendations(&self, priority: Priority) {
        self.inner()
            .recommendations
            .with_label_values(&[priority.as_str()])
            .inc();
    }

    pub fn inc_comparisons(&self, any_resolved: bool) {
        let resolved = if any_resolved { "true" } else { "false" };
        self.inner()
            .comparisons
            .with_label_values(&[resolved])
            .inc();
    }
}

/// Structured logger for engine events
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn log_startup(&self, version: &str, api_configured: bool, regions: usize) {
        info!(
            event = "service_started",
            service = %self.service,
            version = %version,
            api_configured = api_configured,
            regions = regions,
            "Carbon optimizer started"
        );
        if !api_configured {
            warn!(
                event = "telemetry_unconfigured",
                service = %self.service,
                "No telemetry credential set - serving fallback estimates"
            );
        }
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service,
            reason = %reason,
            "Carbon optimizer shutting down"
        );
    }

    /// Live telemetry failed and a static estimate was served instead
    pub fn log_telemetry_fallback(&self, zone: &str, reason: &TelemetryError, intensity: f64) {
        match reason {
            // Expected in credential-less deployments, keep it quiet
            TelemetryError::Unconfigured => {
                tracing::debug!(
                    event = "telemetry_fallback",
                    service = %self.service,
                    zone = %zone,
                    reason = reason.kind(),
                    intensity = intensity,
                    "Using fallback intensity"
                );
            }
            _ => {
                warn!(
                    event = "telemetry_fallback",
                    service = %self.service,
                    zone = %zone,
                    reason = reason.kind(),
                    error = %reason,
                    intensity = intensity,
                    "Live telemetry unavailable, using fallback intensity"
                );
            }
        }
    }

    pub fn log_recommendation(
        &self,
        workload: Workload,
        priority: Priority,
        count: usize,
        best: Option<&Recommendation>,
        savings_pct: f64,
    ) {
        info!(
            event = "recommendation_generated",
            service = %self.service,
            workload = %workload,
            priority = %priority,
            count = count,
            best_region = best.map(|r| r.region.as_str()).unwrap_or("none"),
            best_instance = best.map(|r| r.instance_class.as_str()).unwrap_or("none"),
            savings_pct = savings_pct,
            "Generated recommendations"
        );
    }

    pub fn log_comparison(&self, requested: usize, resolved: usize, difference_pct: f64) {
        info!(
            event = "comparison_completed",
            service = %self.service,
            requested = requested,
            resolved = resolved,
            difference_pct = difference_pct,
            "Compared options"
        );
    }

    pub fn log_window(&self, zone: &str, duration_h: u32, window: Option<&ScheduleWindow>) {
        match window {
            Some(w) => info!(
                event = "window_found",
                service = %self.service,
                zone = %zone,
                duration_h = duration_h,
                start = %w.start,
                avg_intensity = w.avg_intensity,
                "Found optimal window"
            ),
            None => info!(
                event = "window_unavailable",
                service = %self.service,
                zone = %zone,
                duration_h = duration_h,
                "No forecast long enough for requested duration"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_metrics_record() {
        let metrics = EngineMetrics::new();
        metrics.observe_cache_lookup(caches::INTENSITY, true);
        metrics.observe_cache_lookup(caches::FORECAST, false);
        metrics.set_cache_entries(caches::INTENSITY, 3);
        metrics.observe_fetch_latency("latest", 0.12);
        metrics.inc_fallback(&TelemetryError::Status(503));
        metrics.inc_recommendations(Priority::Balanced);
        metrics.inc_comparisons(true);

        let families = prometheus::gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "carbon_optimizer_cache_requests_total"));
        assert!(families
            .iter()
            .any(|f| f.get_name() == "carbon_optimizer_telemetry_fallbacks_total"));
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("carbon-optimizer");
        assert_eq!(logger.service, "carbon-optimizer");
    }
}
