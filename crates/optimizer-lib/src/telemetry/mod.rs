//! Grid-carbon telemetry: provider client, clock and the pull-through cache

mod cache;
mod client;
mod clock;

pub use cache::{IntensityLookup, TelemetryCache};
pub use client::ElectricityMapsClient;
pub use clock::{Clock, ManualClock, SystemClock};

use crate::error::TelemetryError;
use crate::models::{CarbonReading, ForecastSeries};
use async_trait::async_trait;

/// External carbon-intensity provider
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Current intensity for a zone
    async fn latest(&self, zone: &str) -> Result<CarbonReading, TelemetryError>;

    /// Forecast for a zone, chronological
    async fn forecast(&self, zone: &str) -> Result<ForecastSeries, TelemetryError>;
}
