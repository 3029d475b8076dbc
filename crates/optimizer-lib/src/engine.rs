//! Recommendation engine
//!
//! Composes the telemetry cache, region ranker, emissions calculator and
//! window optimizer into the operations the service exposes.

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::emissions::{round_to, EmissionsCalculator};
use crate::error::{EngineError, EngineResult};
use crate::health::HealthRegistry;
use crate::models::{
    Calculation, CarbonSavings, CompareOption, ComparisonAnalysis, ComparisonEntry,
    ComparisonSet, DataFreshness, Priority, Recommendation, RecommendationMetadata,
    RecommendationSet, RegionDetails, RegionSummary, SavingsDelta, SchedulePlan, ScheduleWindow,
    Workload,
};
use crate::observability::{EngineMetrics, StructuredLogger};
use crate::ranking::RegionRanker;
use crate::telemetry::{Clock, ElectricityMapsClient, SystemClock, TelemetryCache, TelemetrySource};
use crate::window::WindowOptimizer;
use std::sync::Arc;
use tracing::{debug, warn};

/// Longest accepted workload duration (one year)
pub const MAX_DURATION_H: f64 = 8760.0;
/// Most options accepted by a single comparison
pub const MAX_COMPARE_OPTIONS: usize = 20;

const CARBON_REGION_POOL: usize = 5;
const BALANCED_REGION_POOL: usize = 10;
const REGIONS_PER_SUGGESTION: usize = 3;
const INSTANCES_PER_REGION: usize = 5;
const MAX_RECOMMENDATIONS: usize = 10;

const BALANCED_CO2_WEIGHT: f64 = 0.6;
const BALANCED_EFFICIENCY_WEIGHT: f64 = 0.4;

fn validate_duration(duration_h: f64) -> EngineResult<()> {
    if !duration_h.is_finite() || duration_h <= 0.0 || duration_h > MAX_DURATION_H {
        return Err(EngineError::Validation(format!(
            "duration_hours must be between 0 and {}",
            MAX_DURATION_H
        )));
    }
    Ok(())
}

/// Whole forecast slots needed to cover a duration
fn window_slots(duration_h: f64) -> u32 {
    duration_h.ceil().max(1.0) as u32
}

/// Builder for [`CarbonEngine`]
#[derive(Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    catalog: Option<Catalog>,
    source: Option<Arc<dyn TelemetrySource>>,
    clock: Option<Arc<dyn Clock>>,
    health: Option<HealthRegistry>,
    logger: Option<StructuredLogger>,
}

impl EngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Telemetry provider; defaults to the Electricity Maps client
    pub fn source(mut self, source: Arc<dyn TelemetrySource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn health(mut self, health: HealthRegistry) -> Self {
        self.health = Some(health);
        self
    }

    pub fn logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Validate the catalog and wire the components together
    pub fn build(self) -> EngineResult<CarbonEngine> {
        let catalog = Arc::new(self.catalog.unwrap_or_default());
        catalog.validate()?;

        let source = match self.source {
            Some(source) => source,
            None => Arc::new(ElectricityMapsClient::new(&self.config)?),
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let logger = self
            .logger
            .unwrap_or_else(|| StructuredLogger::new("carbon-optimizer"));

        let mut cache = TelemetryCache::new(source, catalog.clone(), clock, &self.config)
            .with_logger(logger.clone());
        if let Some(health) = self.health {
            cache = cache.with_health(health);
        }
        let cache = Arc::new(cache);

        Ok(CarbonEngine {
            calculator: EmissionsCalculator::new(catalog.clone()),
            ranker: RegionRanker::new(catalog.clone(), cache.clone()),
            windows: WindowOptimizer::new(cache.clone()),
            catalog,
            cache,
            metrics: EngineMetrics::new(),
            logger,
        })
    }
}

/// Carbon-aware optimization engine
pub struct CarbonEngine {
    catalog: Arc<Catalog>,
    cache: Arc<TelemetryCache>,
    calculator: EmissionsCalculator,
    ranker: RegionRanker,
    windows: WindowOptimizer,
    metrics: EngineMetrics,
    logger: StructuredLogger,
}

impl CarbonEngine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cache(&self) -> &TelemetryCache {
        &self.cache
    }

    /// All regions, lowest current intensity first
    pub async fn rank_regions(&self) -> Vec<RegionSummary> {
        self.ranker.rank_regions().await
    }

    pub async fn get_region_details(&self, region: &str) -> EngineResult<RegionDetails> {
        self.ranker.region_details(region).await
    }

    /// Emissions of one instance class in one region at current intensity
    pub async fn calculate(
        &self,
        region: &str,
        instance_class: &str,
        duration_h: f64,
    ) -> EngineResult<Calculation> {
        validate_duration(duration_h)?;
        if instance_class.trim().is_empty() {
            return Err(EngineError::Validation(
                "region and instance_type are required".into(),
            ));
        }

        let details = self.ranker.region_details(region).await?;
        Ok(Calculation {
            estimate: self
                .calculator
                .estimate(instance_class, details.current_intensity, duration_h),
            region: details.region,
            zone: details.zone,
            is_estimate: details.is_estimate,
        })
    }

    /// Lowest-carbon window of `duration_h` hours in a region's forecast
    pub async fn find_window(
        &self,
        region: &str,
        duration_h: u32,
    ) -> EngineResult<Option<ScheduleWindow>> {
        if duration_h == 0 {
            return Err(EngineError::Validation(
                "duration_hours must be a positive integer".into(),
            ));
        }
        let zone = self
            .catalog
            .zone_for(region)
            .ok_or_else(|| EngineError::UnknownRegion(region.to_string()))?;

        let window = self.windows.find_best_window(zone, duration_h).await;
        self.logger.log_window(zone, duration_h, window.as_ref());
        Ok(window)
    }

    /// Best window plus how much it improves on running immediately
    pub async fn schedule(&self, region: &str, duration_h: u32) -> EngineResult<Option<SchedulePlan>> {
        let Some(window) = self.find_window(region, duration_h).await? else {
            return Ok(None);
        };
        let details = self.ranker.region_details(region).await?;

        Ok(Some(SchedulePlan {
            savings_vs_current_g_per_kwh: round_to(
                details.current_intensity - window.avg_intensity,
                2,
            ),
            region: details.region,
            zone: details.zone,
            current_intensity: details.current_intensity,
            window,
        }))
    }

    /// Rank region × instance pairings for a workload
    pub async fn suggest(
        &self,
        workload: Workload,
        priority: Priority,
        region_preference: Option<&str>,
        duration_h: f64,
    ) -> EngineResult<RecommendationSet> {
        validate_duration(duration_h)?;
        debug!(workload = %workload, priority = %priority, "Generating recommendation");

        let mut ranked = self.rank_regions().await;
        if let Some(preferred) = region_preference {
            ranked.retain(|r| r.region == preferred);
            if ranked.is_empty() {
                return Err(EngineError::UnknownRegion(preferred.to_string()));
            }
        }
        let total_regions = ranked.len();

        let pool = match priority {
            Priority::Carbon => CARBON_REGION_POOL,
            Priority::Performance => ranked.len(),
            Priority::Balanced => BALANCED_REGION_POOL,
        };
        let instances = self.catalog.candidates(workload, priority);
        let slots = window_slots(duration_h);

        let mut recommendations = Vec::new();
        for region in ranked
            .into_iter()
            .take(pool)
            .take(REGIONS_PER_SUGGESTION)
        {
            let window = self.windows.find_best_window(&region.zone, slots).await;
            for instance in instances.iter().take(INSTANCES_PER_REGION) {
                recommendations.push(Recommendation {
                    region: region.region.clone(),
                    zone: region.zone.clone(),
                    instance_class: instance.clone(),
                    intensity: region.intensity,
                    renewable_pct: region.renewable_pct,
                    emissions: self.calculator.estimate(instance, region.intensity, duration_h),
                    optimal_window: window.clone(),
                    is_estimate: region.is_estimate,
                });
            }
        }

        if recommendations.is_empty() {
            return Err(EngineError::NoCandidates(format!(
                "no region/instance pairing for workload {}",
                workload
            )));
        }

        match priority {
            Priority::Carbon => recommendations
                .sort_by(|a, b| a.emissions.exact_co2_kg().total_cmp(&b.emissions.exact_co2_kg())),
            // Catalog order already carries the performance ranking
            Priority::Performance => {}
            Priority::Balanced => recommendations.sort_by(|a, b| {
                self.balanced_score(a).total_cmp(&self.balanced_score(b))
            }),
        }
        recommendations.truncate(MAX_RECOMMENDATIONS);

        let (best, worst) = recommendations.iter().map(|r| r.emissions.exact_co2_kg()).fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), kg| (lo.min(kg), hi.max(kg)),
        );
        let delta = SavingsDelta::between(best, worst, recommendations.len());
        let data_freshness = if recommendations[0].is_estimate {
            DataFreshness::Estimated
        } else {
            DataFreshness::Live
        };

        self.metrics.inc_recommendations(priority);
        self.logger.log_recommendation(
            workload,
            priority,
            recommendations.len(),
            recommendations.first(),
            delta.difference_percentage,
        );

        Ok(RecommendationSet {
            workload,
            priority,
            generated_at: chrono::Utc::now(),
            carbon_savings: CarbonSavings {
                comparison: format!(
                    "Best option emits {:.1}% less CO2 than worst option",
                    delta.difference_percentage
                ),
                potential_savings_kg: delta.difference_kg,
                potential_savings_percentage: delta.difference_percentage,
            },
            service_optimizations: self.catalog.service_optimizations(workload),
            metadata: RecommendationMetadata {
                total_regions_analyzed: total_regions,
                duration_h,
                data_freshness,
            },
            recommendations,
        })
    }

    /// Compare explicit region/instance options. Unresolvable options are
    /// dropped rather than failing the batch.
    pub async fn compare(
        &self,
        options: &[CompareOption],
        duration_h: f64,
    ) -> EngineResult<ComparisonSet> {
        if options.is_empty() || options.len() > MAX_COMPARE_OPTIONS {
            return Err(EngineError::Validation(format!(
                "Provide 1-{} options to compare",
                MAX_COMPARE_OPTIONS
            )));
        }
        validate_duration(duration_h)?;

        let mut comparisons = Vec::with_capacity(options.len());
        for option in options {
            if option.region.trim().is_empty() || option.instance_class.trim().is_empty() {
                continue;
            }
            match self.ranker.region_details(&option.region).await {
                Ok(details) => comparisons.push(ComparisonEntry {
                    estimate: self.calculator.estimate(
                        &option.instance_class,
                        details.current_intensity,
                        duration_h,
                    ),
                    region: details.region,
                    zone: details.zone,
                    renewable_pct: details.renewable_pct,
                    is_estimate: details.is_estimate,
                }),
                Err(e) => warn!(
                    region = %option.region,
                    instance_class = %option.instance_class,
                    error = %e,
                    "Skipping comparison option"
                ),
            }
        }

        comparisons.sort_by(|a, b| a.estimate.exact_co2_kg().total_cmp(&b.estimate.exact_co2_kg()));

        let delta = match (comparisons.first(), comparisons.last()) {
            (Some(best), Some(worst)) => SavingsDelta::between(
                best.estimate.exact_co2_kg(),
                worst.estimate.exact_co2_kg(),
                comparisons.len(),
            ),
            _ => SavingsDelta::default(),
        };

        self.metrics.inc_comparisons(!comparisons.is_empty());
        self.logger
            .log_comparison(options.len(), comparisons.len(), delta.difference_percentage);

        Ok(ComparisonSet {
            analysis: ComparisonAnalysis {
                best_option: comparisons.first().cloned(),
                worst_option: comparisons.last().cloned(),
                delta,
                total_options_compared: comparisons.len(),
            },
            comparisons,
        })
    }

    fn balanced_score(&self, recommendation: &Recommendation) -> f64 {
        let inefficiency = if self.catalog.is_energy_efficient(&recommendation.instance_class) {
            0.0
        } else {
            1.0
        };
        BALANCED_CO2_WEIGHT * recommendation.emissions.exact_co2_kg()
            + BALANCED_EFFICIENCY_WEIGHT * inefficiency
    }
}
