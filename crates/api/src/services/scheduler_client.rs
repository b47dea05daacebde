//! HTTP client for the external schedule solver.

use async_trait::async_trait;
use domain::models::{GenerateScheduleRequest, GenerateScheduleResponse};
use domain::services::{SchedulerClient, SchedulerError};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::config::SchedulerServiceConfig;

const HEALTH_PATH: &str = "/api/v1/healthy";
const GENERATE_PATH: &str = "/api/v1/schedules/generate";

/// Health-probes the solver, then posts the request.
pub struct HttpSchedulerClient {
    client: Client,
    base_url: String,
}

impl HttpSchedulerClient {
    pub fn new(config: &SchedulerServiceConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn check_health(&self) -> Result<(), SchedulerError> {
        let url = format!("{}{}", self.base_url, HEALTH_PATH);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SchedulerError::Unavailable(format!("health check failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SchedulerError::Unavailable(format!(
                "health check returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SchedulerClient for HttpSchedulerClient {
    async fn generate_schedule(
        &self,
        request: &GenerateScheduleRequest,
    ) -> Result<GenerateScheduleResponse, SchedulerError> {
        self.check_health().await?;

        let url = format!("{}{}", self.base_url, GENERATE_PATH);
        debug!(
            url = %url,
            assistants = request.assistants.len(),
            shifts = request.shifts.len(),
            "Calling scheduler"
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| SchedulerError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let body = response.text().await.unwrap_or_default();
            return Err(SchedulerError::InvalidRequest(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SchedulerError::Internal(format!("HTTP {}: {}", status, body)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SchedulerError::Unavailable(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| SchedulerError::UnmarshalResponse(e.to_string()))
    }
}
