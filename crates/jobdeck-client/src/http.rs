//! HTTP implementation of [`JobApi`] for the remote job listing API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use jobdeck_core::{
    ApiErrorBody, FetchError, JobApi, JobId, JobItem, JobItemExpanded, JobItemResponse,
    JobItemsResponse,
};

use crate::config::{ClientConfig, ConfigError, ConfigResult};

/// `reqwest`-backed job listing API client.
#[derive(Debug, Clone)]
pub struct HttpJobApi {
    client: Client,
    config: ClientConfig,
}

impl HttpJobApi {
    /// Create a client from a validated configuration.
    pub fn new(config: ClientConfig) -> ConfigResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        debug!(base_url = %config.base_url, "Initializing job API client");

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a request and decode a 2xx body as `T`.
    ///
    /// Any non-2xx status is a [`FetchError::Remote`] carrying the body's
    /// `description` (or the status reason when the body has none).
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, FetchError> {
        let start = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(format!("Failed to read body: {}", e)))?;

        debug!(
            http_status = status.as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Job API response"
        );

        if !status.is_success() {
            let description = remote_description(status, &body);
            warn!(http_status = status.as_u16(), error = %description, "Job API returned error");
            return Err(FetchError::Remote {
                status: status.as_u16(),
                description,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| FetchError::Decode(format!("Failed to parse response: {}", e)))
    }
}

/// Extract the human-readable description from an error body.
fn remote_description(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .map(|b| b.description)
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        })
}

#[async_trait]
impl JobApi for HttpJobApi {
    #[instrument(skip(self), fields(subsystem = "client", op = "search"))]
    async fn search(&self, text: &str) -> Result<Vec<JobItem>, FetchError> {
        let request = self
            .client
            .get(self.config.base())
            .query(&[("search", text)]);
        let response: JobItemsResponse = self.send_json(request).await?;
        debug!(result_count = response.job_items.len(), "Search completed");
        Ok(response.job_items)
    }

    #[instrument(skip(self), fields(subsystem = "client", op = "job_item"))]
    async fn job_item(&self, id: JobId) -> Result<JobItemExpanded, FetchError> {
        let url = format!("{}/{}", self.config.base(), id);
        let response: JobItemResponse = self.send_json(self.client.get(url)).await?;
        Ok(response.job_item)
    }
}
