//! API client for communicating with the Carbon Optimizer service

use anyhow::{Context, Result};
use optimizer_lib::{
    Calculation, CompareOption, ComparisonSet, RecommendationSet, RegionDetails, RegionSummary,
    ScheduleWindow,
};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

/// API client for the Carbon Optimizer service
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request and unwrap the success envelope
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        Self::unwrap_envelope(response).await
    }

    /// Make a POST request with JSON body and unwrap the success envelope
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        Self::unwrap_envelope(response).await
    }

    async fn unwrap_envelope<T: DeserializeOwned>(response: Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            anyhow::bail!("API error ({}): {}", status, message);
        }

        let envelope: Envelope<T> = response.json().await.context("Failed to parse response")?;
        Ok(envelope.body)
    }

    pub async fn list_regions(&self) -> Result<RegionList> {
        self.get("api/v1/regions").await
    }

    pub async fn region_details(&self, region: &str) -> Result<RegionDetails> {
        let body: RegionDetailsResponse = self.get(&format!("api/v1/regions/{}", region)).await?;
        Ok(body.region_details)
    }

    pub async fn optimize(&self, request: &OptimizeRequest) -> Result<RecommendationSet> {
        let body: OptimizeResponse = self.post("api/v1/optimize", request).await?;
        Ok(body.recommendation)
    }

    pub async fn calculate(&self, request: &CalculateRequest) -> Result<Calculation> {
        let body: CalculateResponse = self.post("api/v1/calculate", request).await?;
        Ok(body.calculation)
    }

    pub async fn compare(&self, request: &CompareRequest) -> Result<ComparisonSet> {
        self.post("api/v1/compare", request).await
    }

    pub async fn schedule(&self, request: &ScheduleRequest) -> Result<ScheduleResponse> {
        self.post("api/v1/schedule", request).await
    }
}

// API request/response types

/// Payload of a `{status: "success", request_id, ...}` response
#[derive(Debug, Clone, Deserialize)]
struct Envelope<T> {
    #[serde(flatten)]
    body: T,
}

/// Message of a `{status: "error", error_type, message, timestamp}` response
#[derive(Debug, Clone, Deserialize)]
struct ErrorResponse {
    message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionList {
    pub timestamp: String,
    pub total_regions: usize,
    pub regions: Vec<RegionSummary>,
}

#[derive(Debug, Clone, Deserialize)]
struct RegionDetailsResponse {
    region_details: RegionDetails,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizeRequest {
    pub workload: String,
    pub priority: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub duration_hours: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct OptimizeResponse {
    recommendation: RecommendationSet,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalculateRequest {
    pub region: String,
    pub instance_type: String,
    pub duration_hours: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct CalculateResponse {
    calculation: Calculation,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareRequest {
    pub options: Vec<CompareOption>,
    pub duration_hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleRequest {
    pub region: String,
    pub duration_hours: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsPotential {
    pub current_vs_optimal_gco2_kwh: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub region: String,
    pub zone: String,
    pub optimal_window: ScheduleWindow,
    pub current_intensity: f64,
    pub savings_potential: SavingsPotential,
}
