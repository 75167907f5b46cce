use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Pod, Secret, Service};
use kube::{
    Api, Client,
    api::{ListParams, Patch, PatchParams},
};

use crate::k8s::base::{K8sClient, K8sError, PodPhase};

/// Field manager recorded by the API server for our apply patches.
const FIELD_MANAGER: &str = "kubelab-cluster";

/// Kubernetes client backed by the [`kube`] crate.
///
/// Talks to whatever cluster the ambient configuration points at, which after
/// `up` is the kube context the cluster tool just wrote. All mutations are
/// server-side apply patches, so repeated deploys converge instead of failing
/// on already-existing resources.
pub struct HttpK8sClient {
    client: Client,
}

impl HttpK8sClient {
    /// Creates a client from the ambient Kubernetes configuration.
    pub async fn new() -> Result<HttpK8sClient, K8sError> {
        let client = Client::try_default().await?;

        Ok(HttpK8sClient { client })
    }

    fn apply_params() -> PatchParams {
        PatchParams::apply(FIELD_MANAGER).force()
    }
}

#[async_trait]
impl K8sClient for HttpK8sClient {
    async fn create_or_update_namespace(&self, namespace: &Namespace) -> Result<(), K8sError> {
        let name = namespace
            .metadata
            .name
            .as_deref()
            .ok_or(K8sError::MissingName("namespace"))?;

        let namespaces_api: Api<Namespace> = Api::all(self.client.clone());
        namespaces_api
            .patch(name, &Self::apply_params(), &Patch::Apply(namespace))
            .await?;

        Ok(())
    }

    async fn create_or_update_secret(
        &self,
        namespace: &str,
        secret: &Secret,
    ) -> Result<(), K8sError> {
        let name = secret
            .metadata
            .name
            .as_deref()
            .ok_or(K8sError::MissingName("secret"))?;

        let secrets_api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        secrets_api
            .patch(name, &Self::apply_params(), &Patch::Apply(secret))
            .await?;

        Ok(())
    }

    async fn create_or_update_config_map(
        &self,
        namespace: &str,
        config_map: &ConfigMap,
    ) -> Result<(), K8sError> {
        let name = config_map
            .metadata
            .name
            .as_deref()
            .ok_or(K8sError::MissingName("config map"))?;

        let config_maps_api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        config_maps_api
            .patch(name, &Self::apply_params(), &Patch::Apply(config_map))
            .await?;

        Ok(())
    }

    async fn create_or_update_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<(), K8sError> {
        let name = deployment
            .metadata
            .name
            .as_deref()
            .ok_or(K8sError::MissingName("deployment"))?;

        let deployments_api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        deployments_api
            .patch(name, &Self::apply_params(), &Patch::Apply(deployment))
            .await?;

        Ok(())
    }

    async fn create_or_update_service(
        &self,
        namespace: &str,
        service: &Service,
    ) -> Result<(), K8sError> {
        let name = service
            .metadata
            .name
            .as_deref()
            .ok_or(K8sError::MissingName("service"))?;

        let services_api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        services_api
            .patch(name, &Self::apply_params(), &Patch::Apply(service))
            .await?;

        Ok(())
    }

    async fn get_pod_phases(&self, namespace: &str) -> Result<Vec<(String, PodPhase)>, K8sError> {
        let pods_api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pods = pods_api.list(&ListParams::default()).await?;

        Ok(pods
            .items
            .into_iter()
            .map(|pod| {
                let name = pod.metadata.name.unwrap_or_default();
                let phase = pod
                    .status
                    .and_then(|status| status.phase)
                    .map(|phase| PodPhase::from(phase.as_str()))
                    .unwrap_or(PodPhase::Unknown);

                (name, phase)
            })
            .collect())
    }
}
