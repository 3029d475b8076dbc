//! Lowest-carbon scheduling window search

use crate::emissions::round_to;
use crate::models::{ForecastSeries, ScheduleWindow};
use crate::telemetry::TelemetryCache;
use std::sync::Arc;

/// Contiguous run of `duration_h` forecast points with the lowest mean
/// intensity. The earliest window wins ties. `None` when the series is
/// shorter than the requested duration or the duration is zero.
pub fn best_window(series: &ForecastSeries, duration_h: u32) -> Option<ScheduleWindow> {
    let width = duration_h as usize;
    if width == 0 || series.len() < width {
        return None;
    }

    let points = &series.points;
    let mean = |start: usize| {
        points[start..start + width]
            .iter()
            .map(|p| p.intensity)
            .sum::<f64>()
            / width as f64
    };

    let mut best_start = 0;
    let mut best_avg = mean(0);
    for start in 1..=points.len() - width {
        let avg = mean(start);
        if avg < best_avg {
            best_avg = avg;
            best_start = start;
        }
    }

    Some(ScheduleWindow {
        start: points[best_start].timestamp,
        end: points[best_start + width - 1].timestamp,
        avg_intensity: round_to(best_avg, 2),
        duration_h,
    })
}

/// Finds windows against the cached forecast of a zone
#[derive(Clone)]
pub struct WindowOptimizer {
    cache: Arc<TelemetryCache>,
}

impl WindowOptimizer {
    pub fn new(cache: Arc<TelemetryCache>) -> Self {
        Self { cache }
    }

    pub async fn find_best_window(&self, zone: &str, duration_h: u32) -> Option<ScheduleWindow> {
        let series = self.cache.get_forecast(zone).await?;
        best_window(&series, duration_h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ForecastPoint;
    use chrono::{Duration, TimeZone, Utc};

    fn series(values: &[f64]) -> ForecastSeries {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        ForecastSeries::new(
            "FR",
            values
                .iter()
                .enumerate()
                .map(|(i, &intensity)| ForecastPoint {
                    intensity,
                    timestamp: base + Duration::hours(i as i64),
                })
                .collect(),
        )
    }

    #[test]
    fn test_finds_lowest_mean_window() {
        let s = series(&[10.0, 20.0, 5.0, 5.0, 30.0]);
        let window = best_window(&s, 2).unwrap();
        assert_eq!(window.start, s.points[2].timestamp);
        assert_eq!(window.end, s.points[3].timestamp);
        assert_eq!(window.avg_intensity, 5.0);
        assert_eq!(window.duration_h, 2);
    }

    #[test]
    fn test_first_occurrence_wins_ties() {
        let s = series(&[7.0, 3.0, 9.0, 3.0, 8.0]);
        let window = best_window(&s, 1).unwrap();
        assert_eq!(window.start, s.points[1].timestamp);
    }

    #[test]
    fn test_series_shorter_than_duration() {
        let s = series(&[10.0, 20.0]);
        assert!(best_window(&s, 3).is_none());
        assert!(best_window(&ForecastSeries::default(), 1).is_none());
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        assert!(best_window(&series(&[1.0]), 0).is_none());
    }

    #[test]
    fn test_whole_series_window() {
        let s = series(&[10.0, 20.0, 30.0]);
        let window = best_window(&s, 3).unwrap();
        assert_eq!(window.start, s.points[0].timestamp);
        assert_eq!(window.end, s.points[2].timestamp);
        assert_eq!(window.avg_intensity, 20.0);
    }

    #[test]
    fn test_average_is_rounded_for_presentation() {
        let s = series(&[10.0, 10.0, 11.0, 50.0]);
        let window = best_window(&s, 3).unwrap();
        assert_eq!(window.avg_intensity, 10.33);
    }
}
