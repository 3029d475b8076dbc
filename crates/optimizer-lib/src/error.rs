//! Error types for the optimization engine

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced to callers of the engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// Region (or its zone) is not in the static region map
    #[error("Region {0} not supported")]
    UnknownRegion(String),

    /// Input outside its accepted range
    #[error("{0}")]
    Validation(String),

    /// Filtering left nothing to recommend
    #[error("No candidates available: {0}")]
    NoCandidates(String),

    /// Static catalog failed its consistency checks
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Engine could not be constructed from its configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl EngineError {
    /// True for errors caused by the request rather than the engine
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            EngineError::UnknownRegion(_) | EngineError::Validation(_) | EngineError::NoCandidates(_)
        )
    }
}

/// Failures talking to the telemetry provider.
///
/// These never leave the telemetry cache: every variant triggers the
/// fallback path instead.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("no telemetry credential configured")]
    Unconfigured,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl TelemetryError {
    /// Short label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            TelemetryError::Unconfigured => "unconfigured",
            TelemetryError::Transport(_) => "transport",
            TelemetryError::Status(_) => "status",
            TelemetryError::Malformed(_) => "malformed",
            TelemetryError::Timeout(_) => "timeout",
        }
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
