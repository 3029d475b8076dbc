//! Core data models for the carbon optimization engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grid-carbon reporting area identifier (e.g. "FR", "US-NW-PACW")
pub type Zone = String;

/// Point-in-time carbon intensity for a zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonReading {
    pub zone: Zone,
    /// gCO2eq per kWh, always > 0
    pub intensity_g_per_kwh: f64,
    pub renewable_pct: Option<f64>,
    pub fossil_free_pct: Option<f64>,
    pub observed_at: DateTime<Utc>,
    /// True when the reading comes from the static fallback table
    pub is_estimate: bool,
}

/// A single forecast sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub intensity: f64,
    pub timestamp: DateTime<Utc>,
}

/// Chronological forecast for one zone
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub zone: Zone,
    pub points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    /// Build a series, ordering points chronologically and dropping
    /// duplicate timestamps (first sample wins).
    pub fn new(zone: impl Into<Zone>, mut points: Vec<ForecastPoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);
        points.dedup_by_key(|p| p.timestamp);
        Self {
            zone: zone.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn intensities(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.intensity)
    }
}

/// Workload category driving instance-candidate selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Workload {
    Training,
    Inference,
    General,
    Database,
    Containers,
    Serverless,
}

impl Workload {
    pub const ALL: [Workload; 6] = [
        Workload::Training,
        Workload::Inference,
        Workload::General,
        Workload::Database,
        Workload::Containers,
        Workload::Serverless,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Workload::Training => "training",
            Workload::Inference => "inference",
            Workload::General => "general",
            Workload::Database => "database",
            Workload::Containers => "containers",
            Workload::Serverless => "serverless",
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Workload {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Workload::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Invalid workload. Must be one of: {}",
                    Workload::ALL.map(|w| w.as_str()).join(", ")
                )
            })
    }
}

/// Optimization priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Carbon,
    Performance,
    Balanced,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Carbon, Priority::Performance, Priority::Balanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Carbon => "carbon",
            Priority::Performance => "performance",
            Priority::Balanced => "balanced",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Invalid priority. Must be one of: {}",
                    Priority::ALL.map(|p| p.as_str()).join(", ")
                )
            })
    }
}

/// Power and CO2 figures for running an instance class for a duration.
///
/// Public figures are rounded for presentation; ordering uses
/// [`EmissionEstimate::exact_co2_kg`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionEstimate {
    pub instance_class: String,
    pub power_kwh: f64,
    pub co2_g: f64,
    pub co2_kg: f64,
    pub duration_h: f64,
    pub intensity_used: f64,
    #[serde(skip)]
    pub(crate) raw_co2_kg: f64,
}

impl EmissionEstimate {
    /// Unrounded CO2 in kilograms
    pub fn exact_co2_kg(&self) -> f64 {
        self.raw_co2_kg
    }
}

/// Lowest-carbon contiguous slice of a forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub avg_intensity: f64,
    pub duration_h: u32,
}

/// One entry of the region ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub region: String,
    pub zone: Zone,
    pub intensity: f64,
    pub renewable_pct: Option<f64>,
    pub is_estimate: bool,
}

/// Aggregates over the forecast horizon; all absent without a forecast
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastAggregate {
    pub average: Option<f64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

/// Detailed carbon picture for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDetails {
    pub region: String,
    pub zone: Zone,
    pub current_intensity: f64,
    pub renewable_pct: Option<f64>,
    pub fossil_free_pct: Option<f64>,
    pub forecast_24h: ForecastAggregate,
    pub optimal_hours_utc: Vec<u8>,
    pub observed_at: DateTime<Utc>,
    pub is_estimate: bool,
}

/// A scored (region, instance class) pairing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub region: String,
    pub zone: Zone,
    pub instance_class: String,
    pub intensity: f64,
    pub renewable_pct: Option<f64>,
    pub emissions: EmissionEstimate,
    pub optimal_window: Option<ScheduleWindow>,
    pub is_estimate: bool,
}

/// Difference between the best and worst option of a result list
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SavingsDelta {
    pub difference_kg: f64,
    pub difference_percentage: f64,
}

impl SavingsDelta {
    /// Delta between unrounded best and worst CO2 figures.
    ///
    /// Zero when there is nothing to compare or the worst option emits nothing.
    pub fn between(best_kg: f64, worst_kg: f64, options: usize) -> Self {
        if options <= 1 || worst_kg <= 0.0 {
            return Self::default();
        }
        let difference = worst_kg - best_kg;
        Self {
            difference_kg: crate::emissions::round_to(difference, 4),
            difference_percentage: crate::emissions::round_to(difference / worst_kg * 100.0, 2),
        }
    }
}

/// Savings block attached to a recommendation set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonSavings {
    pub potential_savings_kg: f64,
    pub potential_savings_percentage: f64,
    pub comparison: String,
}

/// Whether recommendation figures are backed by live telemetry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFreshness {
    Live,
    Estimated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationMetadata {
    pub total_regions_analyzed: usize,
    pub duration_h: f64,
    pub data_freshness: DataFreshness,
}

/// Result of [`crate::CarbonEngine::suggest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub workload: Workload,
    pub priority: Priority,
    pub generated_at: DateTime<Utc>,
    pub recommendations: Vec<Recommendation>,
    pub carbon_savings: CarbonSavings,
    pub service_optimizations: Vec<String>,
    pub metadata: RecommendationMetadata,
}

/// Emission estimate resolved against a region's current intensity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    pub region: String,
    pub zone: Zone,
    pub is_estimate: bool,
    #[serde(flatten)]
    pub estimate: EmissionEstimate,
}

/// One option submitted to [`crate::CarbonEngine::compare`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareOption {
    pub region: String,
    #[serde(alias = "instance_type")]
    pub instance_class: String,
}

impl CompareOption {
    pub fn new(region: impl Into<String>, instance_class: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            instance_class: instance_class.into(),
        }
    }
}

/// A resolved comparison option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub region: String,
    pub zone: Zone,
    pub renewable_pct: Option<f64>,
    pub is_estimate: bool,
    #[serde(flatten)]
    pub estimate: EmissionEstimate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonAnalysis {
    pub best_option: Option<ComparisonEntry>,
    pub worst_option: Option<ComparisonEntry>,
    #[serde(flatten)]
    pub delta: SavingsDelta,
    pub total_options_compared: usize,
}

/// Result of [`crate::CarbonEngine::compare`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSet {
    pub comparisons: Vec<ComparisonEntry>,
    pub analysis: ComparisonAnalysis,
}

/// Optimal window for a region together with the gain over running now
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePlan {
    pub region: String,
    pub zone: Zone,
    pub window: ScheduleWindow,
    pub current_intensity: f64,
    pub savings_vs_current_g_per_kwh: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_workload_parse_and_display() {
        assert_eq!("training".parse::<Workload>().unwrap(), Workload::Training);
        assert_eq!(Workload::Serverless.to_string(), "serverless");
        let err = "storage".parse::<Workload>().unwrap_err();
        assert!(err.contains("training, inference, general"));
    }

    #[test]
    fn test_priority_serde_lowercase() {
        let json = serde_json::to_string(&Priority::Balanced).unwrap();
        assert_eq!(json, "\"balanced\"");
        let parsed: Priority = serde_json::from_str("\"performance\"").unwrap();
        assert_eq!(parsed, Priority::Performance);
        assert!("fast".parse::<Priority>().is_err());
    }

    #[test]
    fn test_forecast_series_orders_and_dedups() {
        let t = |h| Utc.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap();
        let series = ForecastSeries::new(
            "FR",
            vec![
                ForecastPoint { intensity: 30.0, timestamp: t(2) },
                ForecastPoint { intensity: 10.0, timestamp: t(0) },
                ForecastPoint { intensity: 20.0, timestamp: t(1) },
                ForecastPoint { intensity: 99.0, timestamp: t(1) },
            ],
        );
        assert_eq!(series.intensities().collect::<Vec<_>>(), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_savings_delta() {
        let delta = SavingsDelta::between(3.1, 9.0, 3);
        assert!((delta.difference_kg - 5.9).abs() < 1e-9);
        assert!((delta.difference_percentage - 65.56).abs() < 1e-9);

        assert_eq!(SavingsDelta::between(3.1, 3.1, 1), SavingsDelta::default());
        assert_eq!(SavingsDelta::between(0.0, 0.0, 4), SavingsDelta::default());
    }

    #[test]
    fn test_compare_option_accepts_instance_type_alias() {
        let opt: CompareOption =
            serde_json::from_str(r#"{"region":"eu-west-3","instance_type":"g5.xlarge"}"#).unwrap();
        assert_eq!(opt.instance_class, "g5.xlarge");
    }
}
