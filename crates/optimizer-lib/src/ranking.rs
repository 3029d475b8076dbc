//! Region ranking by current carbon intensity

use crate::catalog::Catalog;
use crate::emissions::round_to;
use crate::error::{EngineError, EngineResult};
use crate::models::{ForecastAggregate, ForecastSeries, RegionDetails, RegionSummary};
use crate::telemetry::TelemetryCache;
use std::sync::Arc;
use tracing::warn;

/// 24h average/min/max over a forecast, rounded to 2 decimals
pub fn forecast_aggregate(series: Option<&ForecastSeries>) -> ForecastAggregate {
    let Some(series) = series.filter(|s| !s.is_empty()) else {
        return ForecastAggregate::default();
    };

    let (sum, min, max) = series.intensities().fold(
        (0.0, f64::INFINITY, f64::NEG_INFINITY),
        |(sum, min, max), g| (sum + g, min.min(g), max.max(g)),
    );
    ForecastAggregate {
        average: Some(round_to(sum / series.len() as f64, 2)),
        minimum: Some(round_to(min, 2)),
        maximum: Some(round_to(max, 2)),
    }
}

#[derive(Clone)]
pub struct RegionRanker {
    catalog: Arc<Catalog>,
    cache: Arc<TelemetryCache>,
}

impl RegionRanker {
    pub fn new(catalog: Arc<Catalog>, cache: Arc<TelemetryCache>) -> Self {
        Self { catalog, cache }
    }

    /// Every mapped region, lowest intensity first. Ties keep map order.
    pub async fn rank_regions(&self) -> Vec<RegionSummary> {
        let lookups: Vec<_> = self
            .catalog
            .regions()
            .map(|(region, zone)| {
                let cache = self.cache.clone();
                let region = region.to_string();
                let zone = zone.to_string();
                tokio::spawn(async move {
                    let reading = cache.get_intensity(&zone).await;
                    RegionSummary {
                        region,
                        zone,
                        intensity: reading.intensity_g_per_kwh,
                        renewable_pct: reading.renewable_pct,
                        is_estimate: reading.is_estimate,
                    }
                })
            })
            .collect();

        let mut ranked = Vec::with_capacity(lookups.len());
        for handle in lookups {
            match handle.await {
                Ok(summary) => ranked.push(summary),
                Err(e) => warn!(error = %e, "Region lookup failed, skipping"),
            }
        }

        ranked.sort_by(|a, b| a.intensity.total_cmp(&b.intensity));
        ranked
    }

    pub async fn region_details(&self, region: &str) -> EngineResult<RegionDetails> {
        let zone = self
            .catalog
            .zone_for(region)
            .ok_or_else(|| EngineError::UnknownRegion(region.to_string()))?;

        let (reading, forecast) =
            tokio::join!(self.cache.get_intensity(zone), self.cache.get_forecast(zone));

        Ok(RegionDetails {
            region: region.to_string(),
            zone: zone.to_string(),
            current_intensity: reading.intensity_g_per_kwh,
            renewable_pct: reading.renewable_pct,
            fossil_free_pct: reading.fossil_free_pct,
            forecast_24h: forecast_aggregate(forecast.as_ref()),
            optimal_hours_utc: self.catalog.low_carbon_hours(region),
            observed_at: reading.observed_at,
            is_estimate: reading.is_estimate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ForecastPoint;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_aggregate_absent_without_forecast() {
        assert_eq!(forecast_aggregate(None), ForecastAggregate::default());
        let empty = ForecastSeries::default();
        assert_eq!(forecast_aggregate(Some(&empty)).average, None);
    }

    #[test]
    fn test_aggregate_over_points() {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let series = ForecastSeries::new(
            "DE",
            [300.0, 100.0, 201.0]
                .iter()
                .enumerate()
                .map(|(i, &g)| ForecastPoint {
                    intensity: g,
                    timestamp: base + Duration::hours(i as i64),
                })
                .collect(),
        );
        let agg = forecast_aggregate(Some(&series));
        assert_eq!(agg.average, Some(200.33));
        assert_eq!(agg.minimum, Some(100.0));
        assert_eq!(agg.maximum, Some(300.0));
    }
}
