use kubelab_config::shared::{PgConnectionConfig, SentryConfig};
use serde::Deserialize;

/// Complete configuration for the data service.
///
/// Contains the database connection, server settings, and optional error
/// tracking. All fields can be overridden per environment through
/// `APP_`-prefixed environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Database connection configuration.
    pub database: PgConnectionConfig,
    /// Application server settings.
    pub application: ApplicationSettings,
    /// Optional Sentry configuration for error tracking.
    pub sentry: Option<SentryConfig>,
}

/// HTTP server configuration settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    /// Host address the service listens on.
    pub host: String,
    /// Port number the service listens on.
    pub port: u16,
}
