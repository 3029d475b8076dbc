//! Carbon-aware cloud optimization library
//!
//! This crate provides the core functionality for:
//! - Grid carbon-intensity telemetry with TTL caching and static fallbacks
//! - Region ranking and per-region detail views
//! - Instance emissions estimates and option comparison
//! - Lowest-carbon scheduling windows over forecasts
//! - Health checks and observability

pub mod catalog;
pub mod config;
pub mod emissions;
pub mod engine;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod ranking;
pub mod telemetry;
pub mod window;

pub use catalog::Catalog;
pub use config::EngineConfig;
pub use engine::{CarbonEngine, EngineBuilder, MAX_COMPARE_OPTIONS, MAX_DURATION_H};
pub use error::{EngineError, EngineResult, TelemetryError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{EngineMetrics, StructuredLogger};
pub use telemetry::{Clock, ElectricityMapsClient, ManualClock, SystemClock, TelemetrySource};
