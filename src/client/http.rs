//! reqwest-backed implementation of [`TelemetrySource`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{instrument, trace};

use crate::actors::messages::PollKind;
use crate::{AlertRule, HistorySnapshot, ReadingsSnapshot};

use super::{ClientError, ClientResult, TelemetrySource};

const SET_ALERT_PATH: &str = "/set-alert";

#[derive(Debug, Deserialize)]
struct AverageTemperatureResponse {
    average_temperature: Option<f64>,
}

/// HTTP client bound to a single backend base address
///
/// The underlying `reqwest::Client` is reused across all requests.
#[derive(Debug, Clone)]
pub struct HttpTelemetryClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTelemetryClient {
    /// Create a client for the backend at `base_url` (e.g. `http://localhost:8001`)
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.url(path);
        trace!("GET {url}");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl TelemetrySource for HttpTelemetryClient {
    #[instrument(skip(self))]
    async fn fetch_readings(&self) -> ClientResult<ReadingsSnapshot> {
        self.get_json(PollKind::Readings.path()).await
    }

    #[instrument(skip(self))]
    async fn fetch_history(&self) -> ClientResult<HistorySnapshot> {
        self.get_json(PollKind::History.path()).await
    }

    #[instrument(skip(self))]
    async fn fetch_average_temperature(&self) -> ClientResult<f64> {
        // The backend answers 404 when no device reported inside its window
        let response: AverageTemperatureResponse =
            match self.get_json(PollKind::Aggregate.path()).await {
                Err(ClientError::Status(code)) if code == StatusCode::NOT_FOUND.as_u16() => {
                    return Err(ClientError::NoData);
                }
                other => other?,
            };

        response.average_temperature.ok_or(ClientError::NoData)
    }

    #[instrument(skip(self))]
    async fn set_alert(&self, rule: &AlertRule) -> ClientResult<()> {
        let url = self.url(SET_ALERT_PATH);
        trace!("POST {url}");

        let response = self.client.post(&url).json(rule).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }

        Ok(())
    }
}
