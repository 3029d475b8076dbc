//! HTTP client for the Electricity Maps carbon-intensity API

use super::TelemetrySource;
use crate::config::EngineConfig;
use crate::error::{EngineError, TelemetryError};
use crate::models::{CarbonReading, ForecastPoint, ForecastSeries};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;
use tracing::debug;

const LATEST_PATH: &str = "carbon-intensity/latest";
const FORECAST_PATH: &str = "carbon-intensity/forecast";
const AUTH_HEADER: &str = "auth-token";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestPayload {
    carbon_intensity: Option<f64>,
    datetime: Option<DateTime<Utc>>,
    renewable_percentage: Option<f64>,
    fossil_free_percentage: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ForecastPayload {
    #[serde(default)]
    forecast: Vec<ForecastPointPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForecastPointPayload {
    carbon_intensity: Option<f64>,
    datetime: DateTime<Utc>,
}

fn valid_intensity(value: Option<f64>) -> Option<f64> {
    value.filter(|g| g.is_finite() && *g > 0.0)
}

/// Live telemetry source backed by the Electricity Maps v3 API
pub struct ElectricityMapsClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl ElectricityMapsClient {
    /// Create a client from engine configuration
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| EngineError::Configuration(format!("HTTP client: {}", e)))?;

        // Url::join drops the last segment unless the base ends with '/'
        let mut base = config.api_base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| EngineError::Configuration(format!("invalid API URL {}: {}", base, e)))?;

        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty());

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, zone: &str) -> Result<T, TelemetryError> {
        let api_key = self.api_key.as_deref().ok_or(TelemetryError::Unconfigured)?;
        let url = self
            .base_url
            .join(path)
            .map_err(|e| TelemetryError::Malformed(format!("bad endpoint path: {}", e)))?;

        let response = self
            .client
            .get(url)
            .header(AUTH_HEADER, api_key)
            .query(&[("zone", zone)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelemetryError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| TelemetryError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl TelemetrySource for ElectricityMapsClient {
    async fn latest(&self, zone: &str) -> Result<CarbonReading, TelemetryError> {
        let payload: LatestPayload = self.get(LATEST_PATH, zone).await?;

        let intensity = valid_intensity(payload.carbon_intensity).ok_or_else(|| {
            TelemetryError::Malformed("missing or non-positive carbonIntensity".into())
        })?;
        let observed_at = payload
            .datetime
            .ok_or_else(|| TelemetryError::Malformed("missing datetime".into()))?;

        Ok(CarbonReading {
            zone: zone.to_string(),
            intensity_g_per_kwh: intensity,
            renewable_pct: payload.renewable_percentage,
            fossil_free_pct: payload.fossil_free_percentage,
            observed_at,
            is_estimate: false,
        })
    }

    async fn forecast(&self, zone: &str) -> Result<ForecastSeries, TelemetryError> {
        let payload: ForecastPayload = self.get(FORECAST_PATH, zone).await?;
        let received = payload.forecast.len();

        let points: Vec<ForecastPoint> = payload
            .forecast
            .into_iter()
            .filter_map(|p| {
                valid_intensity(p.carbon_intensity).map(|intensity| ForecastPoint {
                    intensity,
                    timestamp: p.datetime,
                })
            })
            .collect();

        if points.len() < received {
            debug!(
                zone = %zone,
                dropped = received - points.len(),
                "Dropped forecast points without a usable intensity"
            );
        }

        Ok(ForecastSeries::new(zone, points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::time::Duration;

    fn client_for(server: &mockito::ServerGuard, api_key: Option<&str>) -> ElectricityMapsClient {
        let config = EngineConfig {
            api_key: api_key.map(String::from),
            api_base_url: format!("{}/v3", server.url()),
            request_timeout: Duration::from_secs(2),
            ..EngineConfig::default()
        };
        ElectricityMapsClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_latest_parses_payload_and_sends_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v3/carbon-intensity/latest")
            .match_query(Matcher::UrlEncoded("zone".into(), "FR".into()))
            .match_header("auth-token", "secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"zone":"FR","carbonIntensity":56,"datetime":"2024-05-01T10:00:00.000Z",
                    "renewablePercentage":31.5,"fossilFreePercentage":92.0}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server, Some("secret"));
        let reading = client.latest("FR").await.unwrap();

        mock.assert_async().await;
        assert_eq!(reading.zone, "FR");
        assert_eq!(reading.intensity_g_per_kwh, 56.0);
        assert_eq!(reading.renewable_pct, Some(31.5));
        assert_eq!(reading.fossil_free_pct, Some(92.0));
        assert!(!reading.is_estimate);
    }

    #[tokio::test]
    async fn test_latest_rejects_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v3/carbon-intensity/latest")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let client = client_for(&server, Some("bad"));
        let err = client.latest("DE").await.unwrap_err();
        assert!(matches!(err, TelemetryError::Status(401)));
    }

    #[tokio::test]
    async fn test_latest_rejects_missing_intensity() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v3/carbon-intensity/latest")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"zone":"DE","datetime":"2024-05-01T10:00:00Z"}"#)
            .create_async()
            .await;

        let client = client_for(&server, Some("key"));
        let err = client.latest("DE").await.unwrap_err();
        assert!(matches!(err, TelemetryError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_latest_rejects_garbage_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v3/carbon-intensity/latest")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = client_for(&server, Some("key"));
        assert!(matches!(
            client.latest("DE").await,
            Err(TelemetryError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_forecast_orders_points_and_drops_invalid() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v3/carbon-intensity/forecast")
            .match_query(Matcher::UrlEncoded("zone".into(), "SE".into()))
            .with_status(200)
            .with_body(
                r#"{"zone":"SE","forecast":[
                    {"carbonIntensity":40,"datetime":"2024-05-01T12:00:00Z"},
                    {"carbonIntensity":20,"datetime":"2024-05-01T10:00:00Z"},
                    {"carbonIntensity":null,"datetime":"2024-05-01T11:00:00Z"},
                    {"carbonIntensity":30,"datetime":"2024-05-01T13:00:00Z"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server, Some("key"));
        let series = client.forecast("SE").await.unwrap();
        assert_eq!(series.intensities().collect::<Vec<_>>(), vec![20.0, 40.0, 30.0]);
    }

    #[tokio::test]
    async fn test_unconfigured_client_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server, None);
        assert!(!client.is_configured());
        assert!(matches!(
            client.latest("FR").await,
            Err(TelemetryError::Unconfigured)
        ));
        mock.assert_async().await;
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = EngineConfig {
            api_base_url: "https://example.test/v3".into(),
            ..EngineConfig::default()
        };
        let client = ElectricityMapsClient::new(&config).unwrap();
        assert_eq!(
            client.base_url().join(LATEST_PATH).unwrap().as_str(),
            "https://example.test/v3/carbon-intensity/latest"
        );
    }
}
