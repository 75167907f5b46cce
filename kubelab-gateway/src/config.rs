use kubelab_config::shared::SentryConfig;
use serde::Deserialize;

/// Complete configuration for the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Application server settings.
    pub application: ApplicationSettings,
    /// Upstream data service settings.
    pub data_service: DataServiceConfig,
    /// Optional Sentry configuration for error tracking.
    pub sentry: Option<SentryConfig>,
}

/// HTTP server configuration settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    /// Host address the gateway listens on.
    pub host: String,
    /// Port number the gateway listens on.
    pub port: u16,
}

/// Upstream data service connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DataServiceConfig {
    /// Base URL of the data service, e.g. `http://data-service:8080`.
    pub base_url: String,
    /// Timeout in seconds for proxied user requests.
    pub request_timeout_secs: u64,
    /// Timeout in seconds for the health connectivity probe.
    ///
    /// Kept shorter than the request timeout so a wedged upstream does not
    /// stall the gateway's own health endpoint.
    pub health_timeout_secs: u64,
}
