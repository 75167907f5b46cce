use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Secret, Service};
use std::fmt;
use thiserror::Error;

/// Errors emitted by the Kubernetes integration.
///
/// Variants wrap lower-level libraries where appropriate to preserve context.
#[derive(Debug, Error)]
pub enum K8sError {
    /// A serialization or deserialization error while building or parsing
    /// Kubernetes resources.
    #[error("An error occurred in serde when dealing with K8s: {0}")]
    Serde(#[from] serde_json::error::Error),
    /// An error returned by the [`kube`] client when talking to the API
    /// server.
    #[error("An error occurred with kube when dealing with K8s: {0}")]
    Kube(#[from] kube::Error),
    /// A resource was handed to the client without a metadata name.
    #[error("The {0} resource is missing a metadata name")]
    MissingName(&'static str),
}

/// A simplified view of a pod phase.
///
/// This mirrors the string phases reported by Kubernetes but only tracks the
/// states needed by the CLI. Unknown values map to [`PodPhase::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl From<&str> for PodPhase {
    /// Converts a Kubernetes pod phase string into a [`PodPhase`].
    ///
    /// Unrecognized values result in [`PodPhase::Unknown`].
    fn from(value: &str) -> Self {
        match value {
            "Pending" => PodPhase::Pending,
            "Running" => PodPhase::Running,
            "Succeeded" => PodPhase::Succeeded,
            "Failed" => PodPhase::Failed,
            _ => PodPhase::Unknown,
        }
    }
}

impl fmt::Display for PodPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            PodPhase::Pending => "Pending",
            PodPhase::Running => "Running",
            PodPhase::Succeeded => "Succeeded",
            PodPhase::Failed => "Failed",
            PodPhase::Unknown => "Unknown",
        };
        f.write_str(phase)
    }
}

/// Client interface describing the Kubernetes operations used by the CLI.
///
/// Implementations are expected to be idempotent by issuing server-side
/// apply patches for create-or-update behaviors, so `deploy` can be re-run
/// safely against a cluster that already carries the workloads.
#[async_trait]
pub trait K8sClient: Send + Sync {
    /// Creates or updates the lab namespace.
    async fn create_or_update_namespace(&self, namespace: &Namespace) -> Result<(), K8sError>;

    /// Creates or updates a secret in the given namespace.
    async fn create_or_update_secret(
        &self,
        namespace: &str,
        secret: &Secret,
    ) -> Result<(), K8sError>;

    /// Creates or updates a config map in the given namespace.
    async fn create_or_update_config_map(
        &self,
        namespace: &str,
        config_map: &ConfigMap,
    ) -> Result<(), K8sError>;

    /// Creates or updates a deployment in the given namespace.
    async fn create_or_update_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<(), K8sError>;

    /// Creates or updates a service in the given namespace.
    async fn create_or_update_service(
        &self,
        namespace: &str,
        service: &Service,
    ) -> Result<(), K8sError>;

    /// Returns the name and phase of every pod in the given namespace.
    async fn get_pod_phases(&self, namespace: &str) -> Result<Vec<(String, PodPhase)>, K8sError>;
}
