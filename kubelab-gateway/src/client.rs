use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::config::DataServiceConfig;

/// Errors returned by the upstream data service client.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The data service answered with an error status. The status and body
    /// are preserved so the gateway can pass them through unchanged.
    #[error("the data service returned status {status}")]
    ErrorStatus { status: StatusCode, body: String },

    /// The data service could not be reached, or its response could not be
    /// read or decoded.
    #[error("the data service is unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
}

/// HTTP client for the internal data service.
///
/// Thin wrapper around [`reqwest::Client`] carrying the upstream base URL and
/// the two timeouts from the configuration.
#[derive(Debug, Clone)]
pub struct DataServiceClient {
    http: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
    health_timeout: Duration,
}

impl DataServiceClient {
    pub fn new(config: &DataServiceConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            health_timeout: Duration::from_secs(config.health_timeout_secs),
        }
    }

    /// Fetches all users from the data service.
    pub async fn get_users<T: DeserializeOwned>(&self) -> Result<T, UpstreamError> {
        self.get_json(&format!("{}/data/users", self.base_url)).await
    }

    /// Fetches a single user by id from the data service.
    pub async fn get_user<T: DeserializeOwned>(&self, user_id: i64) -> Result<T, UpstreamError> {
        self.get_json(&format!("{}/data/users/{user_id}", self.base_url))
            .await
    }

    /// Probes the data service health endpoint and returns its status code.
    pub async fn health(&self) -> Result<StatusCode, reqwest::Error> {
        let response = self
            .http
            .get(format!("{}/actuator/health", self.base_url))
            .timeout(self.health_timeout)
            .send()
            .await?;

        Ok(response.status())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, UpstreamError> {
        let response = self
            .http
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::ErrorStatus { status, body });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slashes_are_stripped_from_the_base_url() {
        let client = DataServiceClient::new(&DataServiceConfig {
            base_url: "http://data-service:8080/".to_string(),
            request_timeout_secs: 5,
            health_timeout_secs: 2,
        });

        assert_eq!(client.base_url, "http://data-service:8080");
    }
}
