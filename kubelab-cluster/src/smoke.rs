use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::k8s::{K8sClient, K8sError, PodPhase};

/// An id no seeded lab database will ever contain.
const ABSENT_USER_ID: i64 = 999_999;

/// Timeout applied to every smoke request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum SmokeError {
    #[error("GET {url} failed: {source}")]
    Request {
        url: String,
        source: reqwest::Error,
    },

    #[error("GET {url} returned status {status}, expected {expected}")]
    UnexpectedStatus {
        url: String,
        status: StatusCode,
        expected: StatusCode,
    },

    #[error("GET {url} did not return a JSON array")]
    NotAnArray { url: String },

    #[error(transparent)]
    K8s(#[from] K8sError),

    #[error("expected {expected} Running pods, found {running}")]
    PodsNotRunning { expected: usize, running: usize },
}

/// Runs the smoke checks against a deployed lab.
///
/// Sequential, stops on the first failure:
/// 1. the gateway health route answers 200,
/// 2. the user list route answers 200 with a JSON array,
/// 3. an absent user id answers 404,
/// 4. the expected number of pods is Running.
pub async fn run_smoke(
    base_url: &str,
    k8s: &dyn K8sClient,
    namespace: &str,
    expected_pods: usize,
) -> Result<(), SmokeError> {
    let base_url = base_url.trim_end_matches('/');
    let client = reqwest::Client::new();

    let health_url = format!("{base_url}/api/health");
    expect_status(&client, &health_url, StatusCode::OK).await?;
    info!(url = health_url, "smoke check passed: gateway is healthy");

    let users_url = format!("{base_url}/api/users");
    let response = expect_status(&client, &users_url, StatusCode::OK).await?;
    let users: serde_json::Value =
        response
            .json()
            .await
            .map_err(|source| SmokeError::Request {
                url: users_url.clone(),
                source,
            })?;
    if !users.is_array() {
        return Err(SmokeError::NotAnArray { url: users_url });
    }
    info!(url = users_url, "smoke check passed: user list is served");

    let absent_url = format!("{base_url}/api/users/{ABSENT_USER_ID}");
    expect_status(&client, &absent_url, StatusCode::NOT_FOUND).await?;
    info!(
        url = absent_url,
        "smoke check passed: absent users answer 404",
    );

    let phases = k8s.get_pod_phases(namespace).await?;
    let running = phases
        .iter()
        .filter(|(_, phase)| *phase == PodPhase::Running)
        .count();
    if running < expected_pods {
        return Err(SmokeError::PodsNotRunning {
            expected: expected_pods,
            running,
        });
    }
    info!(running, "smoke check passed: all pods are Running");

    Ok(())
}

async fn expect_status(
    client: &reqwest::Client,
    url: &str,
    expected: StatusCode,
) -> Result<reqwest::Response, SmokeError> {
    let response = client
        .get(url)
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await
        .map_err(|source| SmokeError::Request {
            url: url.to_string(),
            source,
        })?;

    if response.status() != expected {
        return Err(SmokeError::UnexpectedStatus {
            url: url.to_string(),
            status: response.status(),
            expected,
        });
    }

    Ok(response)
}
