use super::{provider_url, segment};
use crate::client::ArmClient;
use crate::common::{ArmError, ArmResult};
use crate::lro::{NoContent, Poller};
use crate::model::TrackedResource;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const API_VERSION: &str = "2024-02-01";

pub type ManagedCluster = TrackedResource<ManagedClusterProperties>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agent_pool_profiles: Vec<AgentPoolProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_principal_profile: Option<ServicePrincipalProfile>,
    #[serde(default, skip_serializing)]
    pub fqdn: Option<String>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentPoolProfile {
    pub name: String,
    pub count: u32,
    pub vm_size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl AgentPoolProfile {
    pub fn system(name: &str, count: u32, vm_size: &str) -> Self {
        Self {
            name: name.to_string(),
            count,
            vm_size: vm_size.to_string(),
            os_type: Some("Linux".to_string()),
            mode: Some("System".to_string()),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServicePrincipalProfile {
    pub client_id: String,
    /// Only sent on create; the service never returns it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

impl std::fmt::Debug for ServicePrincipalProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServicePrincipalProfile")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CredentialResults {
    #[serde(default)]
    pub kubeconfigs: Vec<CredentialResult>,
}

#[derive(Clone, Deserialize, PartialEq)]
pub struct CredentialResult {
    pub name: String,
    /// Base64-encoded kubeconfig file.
    pub value: String,
}

impl std::fmt::Debug for CredentialResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResult")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl CredentialResult {
    /// The kubeconfig as YAML text.
    pub fn kubeconfig(&self) -> ArmResult<String> {
        let bytes = STANDARD
            .decode(self.value.trim())
            .map_err(|e| ArmError::deserialize("managed_clusters.kubeconfig", e))?;
        String::from_utf8(bytes).map_err(|e| ArmError::deserialize("managed_clusters.kubeconfig", e))
    }
}

#[derive(Debug, Clone)]
pub struct ManagedClustersClient {
    client: Arc<ArmClient>,
    subscription_id: String,
}

impl ManagedClustersClient {
    pub fn new(client: Arc<ArmClient>, subscription_id: &str) -> Self {
        Self {
            client,
            subscription_id: subscription_id.to_string(),
        }
    }

    fn url(&self, resource_group: &str, name: &str, suffix: &str) -> String {
        provider_url(
            &self.client,
            &self.subscription_id,
            resource_group,
            &format!("Microsoft.ContainerService/managedClusters/{}{suffix}", segment(name)),
            API_VERSION,
        )
    }

    pub async fn begin_create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        cluster: &ManagedCluster,
    ) -> ArmResult<Poller<ManagedCluster>> {
        self.client
            .begin_put(
                "managed_clusters.create_or_update",
                &self.url(resource_group, name, ""),
                cluster,
            )
            .await
    }

    pub async fn get(&self, resource_group: &str, name: &str) -> ArmResult<ManagedCluster> {
        self.client
            .get_json("managed_clusters.get", &self.url(resource_group, name, ""))
            .await
    }

    pub async fn list_cluster_admin_credentials(
        &self,
        resource_group: &str,
        name: &str,
    ) -> ArmResult<CredentialResults> {
        self.client
            .post_empty(
                "managed_clusters.list_cluster_admin_credentials",
                &self.url(resource_group, name, "/listClusterAdminCredential"),
            )
            .await
    }

    pub async fn begin_delete(&self, resource_group: &str, name: &str) -> ArmResult<Poller<NoContent>> {
        self.client
            .begin_delete("managed_clusters.delete", &self.url(resource_group, name, ""))
            .await
    }
}
