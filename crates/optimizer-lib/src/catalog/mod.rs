//! Static lookup tables: region → zone map, fallback intensities,
//! instance power profiles and the workload catalog.
//!
//! A [`Catalog`] is built once and never mutated afterwards. Missing keys
//! resolve to documented defaults rather than errors.

mod instances;
mod regions;

pub use instances::{
    DEFAULT_POWER_FACTOR, FALLBACK_INSTANCE_CLASS, MAX_CANDIDATES,
};
pub use regions::DEFAULT_FALLBACK_INTENSITY;

use crate::error::{EngineError, EngineResult};
use crate::models::{Priority, Workload, Zone};
use std::collections::{HashMap, HashSet};

/// Strip the size suffix from an instance class (`p4d.24xlarge` → `p4d`)
pub fn instance_family(instance_class: &str) -> &str {
    instance_class
        .split_once('.')
        .map_or(instance_class, |(family, _)| family)
}

/// Immutable lookup tables consulted by every engine component
#[derive(Debug, Clone)]
pub struct Catalog {
    regions: Vec<(String, Zone)>,
    region_index: HashMap<String, usize>,
    fallback_intensities: HashMap<Zone, f64>,
    default_fallback_intensity: f64,
    power_factors: HashMap<String, f64>,
    default_power_factor: f64,
    efficient_families: HashSet<String>,
    workloads: HashMap<Workload, Vec<(String, Vec<String>)>>,
    low_carbon_hours: HashMap<String, Vec<u8>>,
    service_tips: HashMap<String, Vec<String>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// Catalog with the built-in AWS region and instance tables
    pub fn builtin() -> Self {
        let mut catalog = Self {
            regions: Vec::new(),
            region_index: HashMap::new(),
            fallback_intensities: regions::FALLBACK_INTENSITIES
                .iter()
                .map(|(zone, g)| (zone.to_string(), *g))
                .collect(),
            default_fallback_intensity: DEFAULT_FALLBACK_INTENSITY,
            power_factors: instances::POWER_FACTORS
                .iter()
                .map(|(family, f)| (family.to_string(), *f))
                .collect(),
            default_power_factor: DEFAULT_POWER_FACTOR,
            efficient_families: instances::ENERGY_EFFICIENT_FAMILIES
                .iter()
                .map(|f| f.to_string())
                .collect(),
            workloads: instances::WORKLOAD_CATEGORIES
                .iter()
                .map(|(workload, categories)| {
                    let categories = categories
                        .iter()
                        .map(|(name, classes)| {
                            (
                                name.to_string(),
                                classes.iter().map(|c| c.to_string()).collect(),
                            )
                        })
                        .collect();
                    (*workload, categories)
                })
                .collect(),
            low_carbon_hours: regions::LOW_CARBON_HOURS
                .iter()
                .map(|(region, hours)| (region.to_string(), hours.to_vec()))
                .collect(),
            service_tips: instances::SERVICE_OPTIMIZATIONS
                .iter()
                .map(|(service, tips)| {
                    (
                        service.to_string(),
                        tips.iter().map(|t| t.to_string()).collect(),
                    )
                })
                .collect(),
        };
        catalog.set_regions(
            regions::REGION_ZONES
                .iter()
                .map(|(region, zone)| (region.to_string(), zone.to_string())),
        );
        catalog
    }

    /// Replace the region map; iteration order is the given order
    pub fn with_regions<I, R, Z>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = (R, Z)>,
        R: Into<String>,
        Z: Into<Zone>,
    {
        self.set_regions(regions.into_iter().map(|(r, z)| (r.into(), z.into())));
        self
    }

    /// Add or override a zone's fallback intensity
    pub fn with_fallback_intensity(mut self, zone: impl Into<Zone>, intensity: f64) -> Self {
        self.fallback_intensities.insert(zone.into(), intensity);
        self
    }

    fn set_regions(&mut self, regions: impl Iterator<Item = (String, Zone)>) {
        self.regions = regions.collect();
        self.region_index = self
            .regions
            .iter()
            .enumerate()
            .map(|(i, (region, _))| (region.clone(), i))
            .collect();
    }

    /// Check the tables are consistent enough to serve requests
    pub fn validate(&self) -> EngineResult<()> {
        if self.regions.is_empty() {
            return Err(EngineError::InvalidCatalog("region map is empty".into()));
        }
        if self.region_index.len() != self.regions.len() {
            return Err(EngineError::InvalidCatalog(
                "region map contains duplicate regions".into(),
            ));
        }
        for (region, zone) in &self.regions {
            if zone.is_empty() {
                return Err(EngineError::InvalidCatalog(format!(
                    "region {} has no zone",
                    region
                )));
            }
            if !self.fallback_intensities.contains_key(zone) {
                return Err(EngineError::InvalidCatalog(format!(
                    "zone {} has no fallback intensity",
                    zone
                )));
            }
        }
        let positive = |g: f64| g.is_finite() && g > 0.0;
        if let Some((zone, _)) = self
            .fallback_intensities
            .iter()
            .find(|(_, g)| !positive(**g))
        {
            return Err(EngineError::InvalidCatalog(format!(
                "fallback intensity for {} must be positive",
                zone
            )));
        }
        if !positive(self.default_fallback_intensity) {
            return Err(EngineError::InvalidCatalog(
                "default fallback intensity must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Regions with their zones, in map order
    pub fn regions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.regions
            .iter()
            .map(|(region, zone)| (region.as_str(), zone.as_str()))
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn zone_for(&self, region: &str) -> Option<&str> {
        self.region_index
            .get(region)
            .map(|&i| self.regions[i].1.as_str())
    }

    /// Static estimate for a zone, or the global default
    pub fn fallback_intensity(&self, zone: &str) -> f64 {
        self.fallback_intensities
            .get(zone)
            .copied()
            .unwrap_or(self.default_fallback_intensity)
    }

    /// Power factor for an instance class, or the default factor
    pub fn power_factor(&self, instance_class: &str) -> f64 {
        self.power_factors
            .get(instance_family(instance_class))
            .copied()
            .unwrap_or(self.default_power_factor)
    }

    pub fn is_energy_efficient(&self, instance_class: &str) -> bool {
        self.efficient_families
            .contains(instance_family(instance_class))
    }

    /// Ordered instance candidates for a workload/priority pair
    pub fn candidates(&self, workload: Workload, priority: Priority) -> Vec<String> {
        let Some(categories) = self.workloads.get(&workload) else {
            return vec![FALLBACK_INSTANCE_CLASS.to_string()];
        };

        let mut classes: Vec<String> = match priority {
            Priority::Balanced => categories
                .iter()
                .flat_map(|(_, classes)| classes.iter().cloned())
                .collect(),
            _ => instances::priority_categories(workload, priority)
                .iter()
                .filter_map(|wanted| categories.iter().find(|(name, _)| name == wanted))
                .flat_map(|(_, classes)| classes.iter().cloned())
                .collect(),
        };

        if classes.is_empty() {
            return vec![FALLBACK_INSTANCE_CLASS.to_string()];
        }
        classes.truncate(MAX_CANDIDATES);
        classes
    }

    pub fn low_carbon_hours(&self, region: &str) -> Vec<u8> {
        self.low_carbon_hours
            .get(region)
            .cloned()
            .unwrap_or_default()
    }

    /// Optimization tips for the service family running a workload
    pub fn service_optimizations(&self, workload: Workload) -> Vec<String> {
        self.service_tips
            .get(instances::service_for(workload))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin();
        catalog.validate().unwrap();
        assert_eq!(catalog.region_count(), 28);
        assert_eq!(catalog.zone_for("eu-west-3"), Some("FR"));
        assert_eq!(catalog.zone_for("not-a-region"), None);
    }

    #[test]
    fn test_region_order_is_preserved() {
        let catalog = Catalog::builtin();
        let first: Vec<_> = catalog.regions().take(3).map(|(r, _)| r).collect();
        assert_eq!(first, vec!["us-east-1", "us-east-2", "us-west-1"]);
    }

    #[test]
    fn test_instance_family() {
        assert_eq!(instance_family("p4d.24xlarge"), "p4d");
        assert_eq!(instance_family("lambda-arm64"), "lambda-arm64");
        assert_eq!(instance_family(""), "");
    }

    #[test]
    fn test_power_factor_defaults_for_unknown_family() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.power_factor("p4d.24xlarge"), 2.2);
        assert_eq!(catalog.power_factor("z9.mega"), DEFAULT_POWER_FACTOR);
    }

    #[test]
    fn test_fallback_intensity_defaults_for_unknown_zone() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.fallback_intensity("CA-QC"), 30.0);
        assert_eq!(catalog.fallback_intensity("XX"), DEFAULT_FALLBACK_INTENSITY);
    }

    #[test]
    fn test_carbon_candidates_for_training() {
        let catalog = Catalog::builtin();
        let classes = catalog.candidates(Workload::Training, Priority::Carbon);
        assert_eq!(classes[0], "g5.48xlarge");
        assert_eq!(classes.len(), 9);
        assert!(classes.iter().all(|c| !c.starts_with("p5")));
    }

    #[test]
    fn test_performance_candidates_for_general() {
        let catalog = Catalog::builtin();
        let classes = catalog.candidates(Workload::General, Priority::Performance);
        assert_eq!(classes[0], "t3.micro");
        assert_eq!(classes.len(), 13);
    }

    #[test]
    fn test_balanced_candidates_flatten_and_truncate() {
        let catalog = Catalog::builtin();
        let classes = catalog.candidates(Workload::Inference, Priority::Balanced);
        assert_eq!(classes.len(), MAX_CANDIDATES - 1);
        assert_eq!(classes[0], "inf2.48xlarge");

        let training = catalog.candidates(Workload::Training, Priority::Balanced);
        assert_eq!(training.len(), 12);
    }

    #[test]
    fn test_energy_efficient_families() {
        let catalog = Catalog::builtin();
        assert!(catalog.is_energy_efficient("m7g.large"));
        assert!(catalog.is_energy_efficient("lambda-arm64"));
        assert!(!catalog.is_energy_efficient("m6i.large"));
    }

    #[test]
    fn test_validate_rejects_zone_without_fallback() {
        let catalog = Catalog::builtin().with_regions([("mars-1", "MARS")]);
        assert!(matches!(
            catalog.validate(),
            Err(EngineError::InvalidCatalog(_))
        ));

        let catalog = catalog.with_fallback_intensity("MARS", 12.0);
        catalog.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_duplicates_and_non_positive() {
        let dup = Catalog::builtin().with_regions([("a", "FR"), ("a", "SE")]);
        assert!(dup.validate().is_err());

        let zero = Catalog::builtin().with_fallback_intensity("FR", 0.0);
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_service_optimizations_follow_workload() {
        let catalog = Catalog::builtin();
        let tips = catalog.service_optimizations(Workload::Serverless);
        assert!(tips[0].contains("ARM64"));
        assert_eq!(catalog.service_optimizations(Workload::Training).len(), 4);
    }
}
