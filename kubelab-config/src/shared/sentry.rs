use serde::{Deserialize, Serialize};

/// Sentry error tracking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentryConfig {
    /// The DSN of the Sentry project to send errors to.
    pub dsn: String,
}
