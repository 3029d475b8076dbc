//! HTTP API: health checks, Prometheus metrics and the optimization routes

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use optimizer_lib::{
    health::{ComponentStatus, HealthRegistry},
    observability::EngineMetrics,
    Calculation, CarbonEngine, CompareOption, ComparisonSet, EngineError, Priority,
    RecommendationSet, RegionDetails, RegionSummary, ScheduleWindow, Workload,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_request_id() -> String {
    let n = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    format!("carbon_req_{:06}", n)
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<CarbonEngine>,
    pub health_registry: HealthRegistry,
    pub metrics: EngineMetrics,
}

impl AppState {
    pub fn new(engine: Arc<CarbonEngine>, health_registry: HealthRegistry, metrics: EngineMetrics) -> Self {
        Self {
            engine,
            health_registry,
            metrics,
        }
    }
}

/// Error returned by API handlers, rendered as the error envelope
#[derive(Debug)]
pub enum ApiError {
    Engine(EngineError),
    BadRequest(String),
    NotFound(String),
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError::Engine(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    error_type: &'static str,
    message: String,
    timestamp: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::Engine(e @ EngineError::UnknownRegion(_)) => {
                (StatusCode::NOT_FOUND, "not_found", e.to_string())
            }
            ApiError::Engine(e) if e.is_client_error() => {
                (StatusCode::BAD_REQUEST, "validation_error", e.to_string())
            }
            ApiError::Engine(e) => {
                error!(error = %e, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "validation_error", message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
        };

        if status.is_client_error() {
            warn!(status = status.as_u16(), message = %message, "Request rejected");
        }

        let body = ErrorBody {
            status: "error",
            error_type,
            message,
            timestamp: Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}

/// `{status: "success", request_id, ...body}`
#[derive(Serialize)]
struct Success<T> {
    status: &'static str,
    request_id: String,
    #[serde(flatten)]
    body: T,
}

fn success<T: Serialize>(body: T) -> Json<Success<T>> {
    Json(Success {
        status: "success",
        request_id: next_request_id(),
        body,
    })
}

type ApiResult<T> = Result<Json<Success<T>>, ApiError>;

fn parse_or_default<T>(value: Option<&str>, default: T) -> Result<T, ApiError>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .map(str::parse)
        .transpose()
        .map(|v| v.unwrap_or(default))
        .map_err(ApiError::BadRequest)
}

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    #[serde(default)]
    pub workload: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_duration")]
    pub duration_hours: f64,
}

#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub instance_type: String,
    #[serde(default = "default_duration")]
    pub duration_hours: f64,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    #[serde(default)]
    pub options: Vec<CompareOption>,
    #[serde(default = "default_duration")]
    pub duration_hours: f64,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    #[serde(default)]
    pub region: String,
    #[serde(default = "default_schedule_duration")]
    pub duration_hours: u32,
}

fn default_duration() -> f64 {
    1.0
}

fn default_schedule_duration() -> u32 {
    4
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegionsBody {
    pub timestamp: chrono::DateTime<Utc>,
    pub total_regions: usize,
    pub regions: Vec<RegionSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegionDetailsBody {
    pub region_details: RegionDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OptimizeBody {
    pub recommendation: RecommendationSet,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalculateBody {
    pub calculation: Calculation,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SavingsPotential {
    pub current_vs_optimal_gco2_kwh: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleBody {
    pub region: String,
    pub zone: String,
    pub optimal_window: ScheduleWindow,
    pub current_intensity: f64,
    pub savings_potential: SavingsPotential,
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        // Fallback estimates still answer every request
        ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

async fn list_regions(State(state): State<Arc<AppState>>) -> ApiResult<RegionsBody> {
    info!("Listing all regions by carbon intensity");
    let regions = state.engine.rank_regions().await;
    Ok(success(RegionsBody {
        timestamp: Utc::now(),
        total_regions: regions.len(),
        regions,
    }))
}

async fn region_details(
    State(state): State<Arc<AppState>>,
    Path(region): Path<String>,
) -> ApiResult<RegionDetailsBody> {
    let region_details = state.engine.get_region_details(&region).await?;
    Ok(success(RegionDetailsBody { region_details }))
}

async fn optimize(
    State(state): State<Arc<AppState>>,
    body: Result<Json<OptimizeRequest>, JsonRejection>,
) -> ApiResult<OptimizeBody> {
    let Json(req) = body?;
    let workload = parse_or_default(req.workload.as_deref(), Workload::General)?;
    let priority = parse_or_default(req.priority.as_deref(), Priority::Carbon)?;

    let recommendation = state
        .engine
        .suggest(workload, priority, req.region.as_deref(), req.duration_hours)
        .await?;
    Ok(success(OptimizeBody { recommendation }))
}

async fn calculate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CalculateRequest>, JsonRejection>,
) -> ApiResult<CalculateBody> {
    let Json(req) = body?;
    if req.region.is_empty() || req.instance_type.is_empty() {
        return Err(ApiError::BadRequest(
            "region and instance_type are required".to_string(),
        ));
    }

    let calculation = state
        .engine
        .calculate(&req.region, &req.instance_type, req.duration_hours)
        .await?;
    Ok(success(CalculateBody { calculation }))
}

async fn compare(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CompareRequest>, JsonRejection>,
) -> ApiResult<ComparisonSet> {
    let Json(req) = body?;
    let comparison = state.engine.compare(&req.options, req.duration_hours).await?;
    Ok(success(comparison))
}

async fn schedule(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ScheduleRequest>, JsonRejection>,
) -> ApiResult<ScheduleBody> {
    let Json(req) = body?;
    if req.region.is_empty() {
        return Err(ApiError::BadRequest("region is required".to_string()));
    }

    let plan = state
        .engine
        .schedule(&req.region, req.duration_hours)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("Unable to generate forecast for this region".to_string())
        })?;

    Ok(success(ScheduleBody {
        region: plan.region,
        zone: plan.zone,
        optimal_window: plan.window,
        current_intensity: plan.current_intensity,
        savings_potential: SavingsPotential {
            current_vs_optimal_gco2_kwh: plan.savings_vs_current_g_per_kwh,
        },
    }))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Endpoint not found".to_string())
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/regions", get(list_regions))
        .route("/api/v1/regions/:region", get(region_details))
        .route("/api/v1/optimize", post(optimize))
        .route("/api/v1/calculate", post(calculate))
        .route("/api/v1/compare", post(compare))
        .route("/api/v1/schedule", post(schedule))
        .fallback(not_found)
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_sequential_and_padded() {
        let a = next_request_id();
        let b = next_request_id();
        assert!(a.starts_with("carbon_req_"));
        assert_eq!(a.len(), "carbon_req_".len() + 6);
        let n = |id: &str| id["carbon_req_".len()..].parse::<u64>().unwrap();
        assert!(n(&b) > n(&a));
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(parse_or_default(None, Workload::General).unwrap(), Workload::General);
        assert_eq!(
            parse_or_default(Some("training"), Workload::General).unwrap(),
            Workload::Training
        );
        assert!(matches!(
            parse_or_default(Some("mining"), Priority::Carbon),
            Err(ApiError::BadRequest(m)) if m.contains("Must be one of")
        ));
    }
}
