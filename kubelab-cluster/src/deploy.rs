use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Secret, Service};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, sleep};
use tracing::info;

use crate::k8s::{K8sClient, K8sError, PodPhase};

/// Namespace holding every lab workload.
pub const NAMESPACE: &str = "kubelab";

/// Pods expected to be Running after a successful deploy: PostgreSQL, the
/// data service, and the gateway.
pub const EXPECTED_PODS: usize = 3;

/// NodePort on which the gateway is reachable from the host.
pub const GATEWAY_NODE_PORT: i32 = 30080;

/// Interval between pod phase polls while waiting for the deploy to settle.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Images deployed into the cluster.
pub struct DeployImages {
    pub gateway: String,
    pub data_service: String,
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    K8s(#[from] K8sError),

    #[error("timed out after {elapsed_secs} seconds waiting for {expected} pods to reach Running")]
    Timeout { elapsed_secs: u64, expected: usize },
}

/// Applies the full lab stack and waits for the pods to come up.
///
/// Resources are applied in dependency order (namespace, credentials, then
/// workloads); every apply is a server-side apply patch, so rerunning deploy
/// against an existing stack converges. There is no rollback: a failure or
/// timeout leaves whatever was already applied in place.
pub async fn deploy(
    k8s: &dyn K8sClient,
    images: &DeployImages,
    postgres_password: &str,
    timeout: Duration,
) -> Result<(), DeployError> {
    info!(namespace = NAMESPACE, "applying namespace");
    k8s.create_or_update_namespace(&namespace()?).await?;

    info!("applying postgres credentials secret");
    k8s.create_or_update_secret(NAMESPACE, &postgres_secret(postgres_password)?)
        .await?;

    info!("applying postgres");
    k8s.create_or_update_deployment(NAMESPACE, &postgres_deployment()?)
        .await?;
    k8s.create_or_update_service(NAMESPACE, &postgres_service()?)
        .await?;

    info!(image = images.data_service, "applying data service");
    k8s.create_or_update_config_map(NAMESPACE, &data_service_config_map()?)
        .await?;
    k8s.create_or_update_deployment(NAMESPACE, &data_service_deployment(&images.data_service)?)
        .await?;
    k8s.create_or_update_service(NAMESPACE, &data_service_service()?)
        .await?;

    info!(image = images.gateway, "applying gateway");
    k8s.create_or_update_config_map(NAMESPACE, &gateway_config_map()?)
        .await?;
    k8s.create_or_update_deployment(NAMESPACE, &gateway_deployment(&images.gateway)?)
        .await?;
    k8s.create_or_update_service(NAMESPACE, &gateway_service()?)
        .await?;

    info!(
        expected = EXPECTED_PODS,
        timeout_secs = timeout.as_secs(),
        "waiting for pods to reach Running",
    );
    wait_for_pods_running(k8s, NAMESPACE, EXPECTED_PODS, timeout).await
}

/// Polls pod phases until `expected` pods are Running or the timeout elapses.
///
/// On timeout the already-applied resources are left untouched; cleanup is
/// the caller's business.
pub async fn wait_for_pods_running(
    k8s: &dyn K8sClient,
    namespace: &str,
    expected: usize,
    timeout: Duration,
) -> Result<(), DeployError> {
    let started = Instant::now();
    let deadline = started + timeout;

    loop {
        let phases = k8s.get_pod_phases(namespace).await?;
        let running = phases
            .iter()
            .filter(|(_, phase)| *phase == PodPhase::Running)
            .count();

        if running >= expected {
            info!(running, "all pods are Running");
            return Ok(());
        }

        if Instant::now() >= deadline {
            return Err(DeployError::Timeout {
                elapsed_secs: started.elapsed().as_secs(),
                expected,
            });
        }

        info!(running, expected, "pods not ready yet");
        sleep(POLL_INTERVAL).await;
    }
}

fn labels(name: &str) -> serde_json::Value {
    json!({
        "app.kubernetes.io/name": name,
        "app.kubernetes.io/part-of": "kubelab",
    })
}

pub fn namespace() -> Result<Namespace, K8sError> {
    let namespace = serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": NAMESPACE,
            "labels": {
                "app.kubernetes.io/part-of": "kubelab",
            },
        },
    }))?;

    Ok(namespace)
}

pub fn postgres_secret(password: &str) -> Result<Secret, K8sError> {
    let secret = serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "name": "postgres-credentials",
            "labels": labels("postgres"),
        },
        "type": "Opaque",
        "stringData": {
            // Consumed by the postgres container and the data service
            // respectively; both carry the same credential.
            "POSTGRES_PASSWORD": password,
            "APP_DATABASE__PASSWORD": password,
        },
    }))?;

    Ok(secret)
}

pub fn postgres_deployment() -> Result<Deployment, K8sError> {
    let deployment = serde_json::from_value(json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": "postgres",
            "labels": labels("postgres"),
        },
        "spec": {
            "replicas": 1,
            "selector": {
                "matchLabels": { "app.kubernetes.io/name": "postgres" },
            },
            "template": {
                "metadata": { "labels": labels("postgres") },
                "spec": {
                    "containers": [{
                        "name": "postgres",
                        "image": "postgres:17-alpine",
                        "env": [
                            { "name": "POSTGRES_DB", "value": "kubelab" },
                            { "name": "POSTGRES_USER", "value": "postgres" },
                            {
                                "name": "POSTGRES_PASSWORD",
                                "valueFrom": {
                                    "secretKeyRef": {
                                        "name": "postgres-credentials",
                                        "key": "POSTGRES_PASSWORD",
                                    },
                                },
                            },
                        ],
                        "ports": [{ "containerPort": 5432 }],
                        "readinessProbe": {
                            "exec": { "command": ["pg_isready", "-U", "postgres"] },
                            "initialDelaySeconds": 5,
                            "periodSeconds": 5,
                        },
                    }],
                },
            },
        },
    }))?;

    Ok(deployment)
}

pub fn postgres_service() -> Result<Service, K8sError> {
    let service = serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": {
            "name": "postgres",
            "labels": labels("postgres"),
        },
        "spec": {
            "selector": { "app.kubernetes.io/name": "postgres" },
            "ports": [{ "port": 5432, "targetPort": 5432 }],
        },
    }))?;

    Ok(service)
}

pub fn data_service_config_map() -> Result<ConfigMap, K8sError> {
    let config_map = serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {
            "name": "data-service-config",
            "labels": labels("data-service"),
        },
        "data": {
            "APP_ENVIRONMENT": "prod",
            "APP_DATABASE__HOST": "postgres",
            "APP_DATABASE__PORT": "5432",
            "APP_DATABASE__NAME": "kubelab",
            "APP_DATABASE__USERNAME": "postgres",
        },
    }))?;

    Ok(config_map)
}

pub fn data_service_deployment(image: &str) -> Result<Deployment, K8sError> {
    let deployment = serde_json::from_value(json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": "data-service",
            "labels": labels("data-service"),
        },
        "spec": {
            "replicas": 1,
            "selector": {
                "matchLabels": { "app.kubernetes.io/name": "data-service" },
            },
            "template": {
                "metadata": { "labels": labels("data-service") },
                "spec": {
                    "containers": [{
                        "name": "data-service",
                        "image": image,
                        // Images are side-loaded with `load`, never pulled.
                        "imagePullPolicy": "IfNotPresent",
                        "envFrom": [
                            { "configMapRef": { "name": "data-service-config" } },
                            { "secretRef": { "name": "postgres-credentials" } },
                        ],
                        "ports": [{ "containerPort": 8080 }],
                        "readinessProbe": {
                            "httpGet": { "path": "/actuator/health", "port": 8080 },
                            "initialDelaySeconds": 5,
                            "periodSeconds": 5,
                        },
                        "livenessProbe": {
                            "httpGet": { "path": "/actuator/health", "port": 8080 },
                            "initialDelaySeconds": 15,
                            "periodSeconds": 10,
                        },
                    }],
                },
            },
        },
    }))?;

    Ok(deployment)
}

pub fn data_service_service() -> Result<Service, K8sError> {
    let service = serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": {
            "name": "data-service",
            "labels": labels("data-service"),
        },
        "spec": {
            "selector": { "app.kubernetes.io/name": "data-service" },
            "ports": [{ "port": 8080, "targetPort": 8080 }],
        },
    }))?;

    Ok(service)
}

pub fn gateway_config_map() -> Result<ConfigMap, K8sError> {
    let config_map = serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {
            "name": "gateway-config",
            "labels": labels("gateway"),
        },
        "data": {
            "APP_ENVIRONMENT": "prod",
            "APP_DATA_SERVICE__BASE_URL": "http://data-service:8080",
        },
    }))?;

    Ok(config_map)
}

pub fn gateway_deployment(image: &str) -> Result<Deployment, K8sError> {
    let deployment = serde_json::from_value(json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": "gateway",
            "labels": labels("gateway"),
        },
        "spec": {
            "replicas": 1,
            "selector": {
                "matchLabels": { "app.kubernetes.io/name": "gateway" },
            },
            "template": {
                "metadata": { "labels": labels("gateway") },
                "spec": {
                    "containers": [{
                        "name": "gateway",
                        "image": image,
                        "imagePullPolicy": "IfNotPresent",
                        "envFrom": [
                            { "configMapRef": { "name": "gateway-config" } },
                        ],
                        "ports": [{ "containerPort": 8000 }],
                        "readinessProbe": {
                            "httpGet": { "path": "/api/health", "port": 8000 },
                            "initialDelaySeconds": 5,
                            "periodSeconds": 5,
                        },
                        "livenessProbe": {
                            "httpGet": { "path": "/api/health", "port": 8000 },
                            "initialDelaySeconds": 15,
                            "periodSeconds": 10,
                        },
                    }],
                },
            },
        },
    }))?;

    Ok(deployment)
}

pub fn gateway_service() -> Result<Service, K8sError> {
    let service = serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": {
            "name": "gateway",
            "labels": labels("gateway"),
        },
        "spec": {
            "type": "NodePort",
            "selector": { "app.kubernetes.io/name": "gateway" },
            "ports": [{
                "port": 8000,
                "targetPort": 8000,
                "nodePort": GATEWAY_NODE_PORT,
            }],
        },
    }))?;

    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use k8s_openapi::api::core::v1::Namespace;
    use std::sync::Mutex;

    /// Scripted [`K8sClient`] returning one pod phase snapshot per poll.
    struct ScriptedK8sClient {
        snapshots: Mutex<Vec<Vec<(String, PodPhase)>>>,
    }

    impl ScriptedK8sClient {
        fn new(mut snapshots: Vec<Vec<(String, PodPhase)>>) -> Self {
            // Poll order is front-to-back.
            snapshots.reverse();
            Self {
                snapshots: Mutex::new(snapshots),
            }
        }
    }

    #[async_trait]
    impl K8sClient for ScriptedK8sClient {
        async fn create_or_update_namespace(&self, _: &Namespace) -> Result<(), K8sError> {
            Ok(())
        }

        async fn create_or_update_secret(&self, _: &str, _: &Secret) -> Result<(), K8sError> {
            Ok(())
        }

        async fn create_or_update_config_map(
            &self,
            _: &str,
            _: &ConfigMap,
        ) -> Result<(), K8sError> {
            Ok(())
        }

        async fn create_or_update_deployment(
            &self,
            _: &str,
            _: &Deployment,
        ) -> Result<(), K8sError> {
            Ok(())
        }

        async fn create_or_update_service(&self, _: &str, _: &Service) -> Result<(), K8sError> {
            Ok(())
        }

        async fn get_pod_phases(&self, _: &str) -> Result<Vec<(String, PodPhase)>, K8sError> {
            let mut snapshots = self.snapshots.lock().unwrap();
            let snapshot = snapshots.pop().unwrap_or_else(|| {
                vec![
                    ("postgres".to_string(), PodPhase::Running),
                    ("data-service".to_string(), PodPhase::Running),
                    ("gateway".to_string(), PodPhase::Running),
                ]
            });

            Ok(snapshot)
        }
    }

    #[test]
    fn test_the_gateway_service_exposes_the_node_port() {
        let service = gateway_service().unwrap();

        let spec = service.spec.unwrap();
        assert_eq!(spec.type_.as_deref(), Some("NodePort"));
        let port = &spec.ports.unwrap()[0];
        assert_eq!(port.node_port, Some(GATEWAY_NODE_PORT));
        assert_eq!(port.port, 8000);
    }

    #[test]
    fn test_the_data_service_deployment_wires_config_and_credentials() {
        let deployment = data_service_deployment("kubelab-data:latest").unwrap();

        let container =
            deployment.spec.unwrap().template.spec.unwrap().containers[0].clone();
        assert_eq!(container.image.as_deref(), Some("kubelab-data:latest"));

        let env_from = serde_json::to_value(container.env_from.unwrap()).unwrap();
        assert_eq!(env_from[0]["configMapRef"]["name"], "data-service-config");
        assert_eq!(env_from[1]["secretRef"]["name"], "postgres-credentials");
    }

    #[test]
    fn test_the_probe_paths_match_the_service_routes() {
        let data = data_service_deployment("kubelab-data:latest").unwrap();
        let data_container = data.spec.unwrap().template.spec.unwrap().containers[0].clone();
        let data_probe = data_container.readiness_probe.unwrap().http_get.unwrap();
        assert_eq!(data_probe.path.as_deref(), Some("/actuator/health"));

        let gateway = gateway_deployment("kubelab-gateway:latest").unwrap();
        let gateway_container =
            gateway.spec.unwrap().template.spec.unwrap().containers[0].clone();
        let gateway_probe = gateway_container.readiness_probe.unwrap().http_get.unwrap();
        assert_eq!(gateway_probe.path.as_deref(), Some("/api/health"));
    }

    #[test]
    fn test_the_secret_carries_both_credential_keys() {
        let secret = postgres_secret("hunter2").unwrap();

        let string_data = secret.string_data.unwrap();
        assert_eq!(string_data["POSTGRES_PASSWORD"], "hunter2");
        assert_eq!(string_data["APP_DATABASE__PASSWORD"], "hunter2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiting_succeeds_once_enough_pods_are_running() {
        let k8s = ScriptedK8sClient::new(vec![
            vec![("postgres".to_string(), PodPhase::Pending)],
            vec![
                ("postgres".to_string(), PodPhase::Running),
                ("data-service".to_string(), PodPhase::Pending),
                ("gateway".to_string(), PodPhase::Pending),
            ],
            vec![
                ("postgres".to_string(), PodPhase::Running),
                ("data-service".to_string(), PodPhase::Running),
                ("gateway".to_string(), PodPhase::Running),
            ],
        ]);

        let result =
            wait_for_pods_running(&k8s, NAMESPACE, EXPECTED_PODS, Duration::from_secs(60)).await;

        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiting_times_out_when_pods_never_run() {
        // A pod that never leaves Pending.
        struct StuckK8sClient;

        #[async_trait]
        impl K8sClient for StuckK8sClient {
            async fn create_or_update_namespace(&self, _: &Namespace) -> Result<(), K8sError> {
                Ok(())
            }

            async fn create_or_update_secret(&self, _: &str, _: &Secret) -> Result<(), K8sError> {
                Ok(())
            }

            async fn create_or_update_config_map(
                &self,
                _: &str,
                _: &ConfigMap,
            ) -> Result<(), K8sError> {
                Ok(())
            }

            async fn create_or_update_deployment(
                &self,
                _: &str,
                _: &Deployment,
            ) -> Result<(), K8sError> {
                Ok(())
            }

            async fn create_or_update_service(
                &self,
                _: &str,
                _: &Service,
            ) -> Result<(), K8sError> {
                Ok(())
            }

            async fn get_pod_phases(
                &self,
                _: &str,
            ) -> Result<Vec<(String, PodPhase)>, K8sError> {
                Ok(vec![("postgres".to_string(), PodPhase::Pending)])
            }
        }

        let result = wait_for_pods_running(
            &StuckK8sClient,
            NAMESPACE,
            EXPECTED_PODS,
            Duration::from_secs(10),
        )
        .await;

        assert!(matches!(
            result,
            Err(DeployError::Timeout { expected: 3, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deploy_applies_everything_and_waits() {
        let k8s = ScriptedK8sClient::new(vec![]);
        let images = DeployImages {
            gateway: "kubelab-gateway:latest".to_string(),
            data_service: "kubelab-data:latest".to_string(),
        };

        let result = deploy(&k8s, &images, "postgres", Duration::from_secs(60)).await;

        assert!(result.is_ok());
    }
}
