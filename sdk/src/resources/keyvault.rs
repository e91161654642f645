use super::{provider_url, segment, subscription_provider_url};
use crate::client::ArmClient;
use crate::common::ArmResult;
use crate::lro::{NoContent, Poller};
use crate::model::TrackedResource;
use crate::pager::Pager;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

const API_VERSION: &str = "2023-07-01";

pub type Vault = TrackedResource<VaultProperties>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VaultProperties {
    pub tenant_id: String,
    pub sku: VaultSku,
    #[serde(default)]
    pub access_policies: Vec<AccessPolicyEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_for_deployment: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_soft_delete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_delete_retention_in_days: Option<u32>,
    #[serde(default, skip_serializing)]
    pub vault_uri: Option<String>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<String>,
}

impl VaultProperties {
    /// Standard vault with a single access policy.
    pub fn standard(tenant_id: &str, policy: AccessPolicyEntry) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            sku: VaultSku::default(),
            access_policies: vec![policy],
            enabled_for_deployment: None,
            enable_soft_delete: Some(true),
            soft_delete_retention_in_days: Some(7),
            vault_uri: None,
            provisioning_state: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VaultSku {
    pub family: String,
    pub name: String,
}

impl Default for VaultSku {
    fn default() -> Self {
        Self {
            family: "A".to_string(),
            name: "standard".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessPolicyEntry {
    pub tenant_id: String,
    pub object_id: String,
    pub permissions: Permissions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Permissions {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub secrets: Vec<String>,
    #[serde(default)]
    pub certificates: Vec<String>,
}

impl AccessPolicyEntry {
    /// Secret management for `object_id`: get, list, set, delete, purge.
    pub fn secrets_manager(tenant_id: &str, object_id: &str) -> Self {
        let secrets = ["get", "list", "set", "delete", "purge"];
        Self {
            tenant_id: tenant_id.to_string(),
            object_id: object_id.to_string(),
            permissions: Permissions {
                secrets: secrets.iter().map(|p| p.to_string()).collect(),
                ..Default::default()
            },
        }
    }
}

/// How [`VaultsClient::update_access_policy`] merges the given policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicyUpdateKind {
    Add,
    Replace,
    Remove,
}

impl fmt::Display for AccessPolicyUpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccessPolicyUpdateKind::Add => "add",
            AccessPolicyUpdateKind::Replace => "replace",
            AccessPolicyUpdateKind::Remove => "remove",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VaultAccessPolicyParameters {
    pub properties: VaultAccessPolicyProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VaultAccessPolicyProperties {
    pub access_policies: Vec<AccessPolicyEntry>,
}

#[derive(Debug, Clone)]
pub struct VaultsClient {
    client: Arc<ArmClient>,
    subscription_id: String,
}

impl VaultsClient {
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
            &format!("Microsoft.KeyVault/vaults/{}{suffix}", segment(name)),
            API_VERSION,
        )
    }

    pub async fn begin_create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        vault: &Vault,
    ) -> ArmResult<Poller<Vault>> {
        self.client
            .begin_put(
                "vaults.create_or_update",
                &self.url(resource_group, name, ""),
                vault,
            )
            .await
    }

    pub async fn get(&self, resource_group: &str, name: &str) -> ArmResult<Vault> {
        self.client
            .get_json("vaults.get", &self.url(resource_group, name, ""))
            .await
    }

    pub async fn update_access_policy(
        &self,
        resource_group: &str,
        name: &str,
        kind: AccessPolicyUpdateKind,
        policies: Vec<AccessPolicyEntry>,
    ) -> ArmResult<VaultAccessPolicyParameters> {
        let body = VaultAccessPolicyParameters {
            properties: VaultAccessPolicyProperties {
                access_policies: policies,
            },
        };
        self.client
            .put_json(
                "vaults.update_access_policy",
                &self.url(resource_group, name, &format!("/accessPolicies/{kind}")),
                &body,
            )
            .await
    }

    pub fn list_by_resource_group(&self, resource_group: &str) -> Pager<Vault> {
        let url = provider_url(
            &self.client,
            &self.subscription_id,
            resource_group,
            "Microsoft.KeyVault/vaults",
            API_VERSION,
        );
        self.client.pager("vaults.list_by_resource_group", &url)
    }

    /// Soft-deletes the vault; it stays recoverable until purged.
    pub async fn delete(&self, resource_group: &str, name: &str) -> ArmResult<()> {
        self.client
            .delete("vaults.delete", &self.url(resource_group, name, ""))
            .await
    }

    /// Permanently removes a soft-deleted vault so its name can be reused.
    pub async fn begin_purge_deleted(&self, location: &str, name: &str) -> ArmResult<Poller<NoContent>> {
        let url = subscription_provider_url(
            &self.client,
            &self.subscription_id,
            &format!(
                "Microsoft.KeyVault/locations/{}/deletedVaults/{}/purge",
                segment(location),
                segment(name)
            ),
            API_VERSION,
        );
        self.client
            .begin_post("vaults.purge_deleted", &url, &serde_json::json!({}))
            .await
    }
}
