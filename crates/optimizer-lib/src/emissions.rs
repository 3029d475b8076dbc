//! Instance emissions calculator
//!
//! `power_kwh = factor × hours`, `co2_g = power_kwh × intensity`. Unknown
//! instance families use [`crate::catalog::DEFAULT_POWER_FACTOR`], so every
//! class yields an estimate.

use crate::catalog::Catalog;
use crate::models::EmissionEstimate;
use std::sync::Arc;

/// Decimal places of the presentation figures
pub const POWER_DECIMALS: i32 = 3;
pub const CO2_G_DECIMALS: i32 = 2;
pub const CO2_KG_DECIMALS: i32 = 4;

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

#[derive(Debug, Clone)]
pub struct EmissionsCalculator {
    catalog: Arc<Catalog>,
}

impl EmissionsCalculator {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn estimate(&self, instance_class: &str, intensity: f64, duration_h: f64) -> EmissionEstimate {
        let factor = self.catalog.power_factor(instance_class);
        let power_kwh = factor * duration_h;
        let co2_g = power_kwh * intensity;
        let co2_kg = co2_g / 1000.0;

        EmissionEstimate {
            instance_class: instance_class.to_string(),
            power_kwh: round_to(power_kwh, POWER_DECIMALS),
            co2_g: round_to(co2_g, CO2_G_DECIMALS),
            co2_kg: round_to(co2_kg, CO2_KG_DECIMALS),
            duration_h,
            intensity_used: intensity,
            raw_co2_kg: co2_kg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator() -> EmissionsCalculator {
        EmissionsCalculator::new(Arc::new(Catalog::builtin()))
    }

    #[test]
    fn test_a100_day_at_100g() {
        let estimate = calculator().estimate("p4d.24xlarge", 100.0, 24.0);
        assert_eq!(estimate.power_kwh, 52.8);
        assert_eq!(estimate.co2_g, 5280.0);
        assert_eq!(estimate.co2_kg, 5.28);
        assert_eq!(estimate.intensity_used, 100.0);
        assert_eq!(estimate.duration_h, 24.0);
    }

    #[test]
    fn test_unknown_class_uses_default_factor() {
        let estimate = calculator().estimate("quantum.huge", 200.0, 10.0);
        assert_eq!(estimate.power_kwh, 3.0);
        assert_eq!(estimate.co2_g, 600.0);
        assert_eq!(estimate.co2_kg, 0.6);
    }

    #[test]
    fn test_exact_value_is_unrounded() {
        // 0.15 kW × 1 h × 33.33333 g/kWh
        let estimate = calculator().estimate("t4g.micro", 33.333_33, 1.0);
        assert_eq!(estimate.co2_kg, 0.005);
        assert!((estimate.exact_co2_kg() - 0.004_999_999_5).abs() < 1e-12);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(65.555_555, 2), 65.56);
        assert_eq!(round_to(-0.125, 2), -0.13);
    }
}
