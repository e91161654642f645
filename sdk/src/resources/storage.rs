use super::{provider_url, segment, subscription_provider_url};
use crate::client::ArmClient;
use crate::common::ArmResult;
use crate::lro::Poller;
use crate::model::{CheckNameAvailabilityRequest, CheckNameAvailabilityResult, Sku, Tags, TrackedResource};
use crate::pager::Pager;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use zeroize::Zeroize;

const API_VERSION: &str = "2023-01-01";

pub type StorageAccount = TrackedResource<StorageAccountProperties>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_tls_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_blob_public_access: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_https_traffic_only: Option<bool>,
    #[serde(default, skip_serializing)]
    pub primary_endpoints: Option<Endpoints>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Endpoints {
    #[serde(default)]
    pub blob: Option<String>,
    #[serde(default)]
    pub queue: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
}

/// PATCH body for [`StorageAccountsClient::update`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct StorageAccountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
}

#[derive(Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountKey {
    pub key_name: String,
    pub value: String,
    #[serde(default)]
    pub permissions: Option<String>,
}

impl std::fmt::Debug for StorageAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageAccountKey")
            .field("key_name", &self.key_name)
            .field("value", &"[redacted]")
            .field("permissions", &self.permissions)
            .finish()
    }
}

impl Drop for StorageAccountKey {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

#[derive(Debug, Deserialize)]
struct ListKeysResult {
    #[serde(default)]
    keys: Vec<StorageAccountKey>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegenerateKeyRequest<'a> {
    key_name: &'a str,
}

#[derive(Debug, Clone)]
pub struct StorageAccountsClient {
    client: Arc<ArmClient>,
    subscription_id: String,
}

impl StorageAccountsClient {
    pub fn new(client: Arc<ArmClient>, subscription_id: &str) -> Self {
        Self {
            client,
            subscription_id: subscription_id.to_string(),
        }
    }

    fn url(&self, resource_group: &str, name: &str, action: &str) -> String {
        provider_url(
            &self.client,
            &self.subscription_id,
            resource_group,
            &format!("Microsoft.Storage/storageAccounts/{}{action}", segment(name)),
            API_VERSION,
        )
    }

    /// Account names are global across Azure.
    pub async fn check_name_availability(&self, name: &str) -> ArmResult<CheckNameAvailabilityResult> {
        let url = subscription_provider_url(
            &self.client,
            &self.subscription_id,
            "Microsoft.Storage/checkNameAvailability",
            API_VERSION,
        );
        let request = CheckNameAvailabilityRequest {
            name: name.to_string(),
            resource_type: "Microsoft.Storage/storageAccounts".to_string(),
        };
        self.client
            .post_json("storage_accounts.check_name_availability", &url, &request)
            .await
    }

    pub async fn begin_create(
        &self,
        resource_group: &str,
        name: &str,
        account: &StorageAccount,
    ) -> ArmResult<Poller<StorageAccount>> {
        self.client
            .begin_put(
                "storage_accounts.create",
                &self.url(resource_group, name, ""),
                account,
            )
            .await
    }

    pub async fn get_properties(&self, resource_group: &str, name: &str) -> ArmResult<StorageAccount> {
        self.client
            .get_json(
                "storage_accounts.get_properties",
                &self.url(resource_group, name, ""),
            )
            .await
    }

    pub async fn update(
        &self,
        resource_group: &str,
        name: &str,
        update: &StorageAccountUpdate,
    ) -> ArmResult<StorageAccount> {
        self.client
            .patch_json(
                "storage_accounts.update",
                &self.url(resource_group, name, ""),
                update,
            )
            .await
    }

    pub async fn list_keys(&self, resource_group: &str, name: &str) -> ArmResult<Vec<StorageAccountKey>> {
        let result: ListKeysResult = self
            .client
            .post_empty(
                "storage_accounts.list_keys",
                &self.url(resource_group, name, "/listKeys"),
            )
            .await?;
        Ok(result.keys)
    }

    /// Rotates `key1` or `key2`; returns the account's keys after rotation.
    pub async fn regenerate_key(
        &self,
        resource_group: &str,
        name: &str,
        key_name: &str,
    ) -> ArmResult<Vec<StorageAccountKey>> {
        let result: ListKeysResult = self
            .client
            .post_json(
                "storage_accounts.regenerate_key",
                &self.url(resource_group, name, "/regenerateKey"),
                &RegenerateKeyRequest { key_name },
            )
            .await?;
        Ok(result.keys)
    }

    pub fn list_by_resource_group(&self, resource_group: &str) -> Pager<StorageAccount> {
        let url = provider_url(
            &self.client,
            &self.subscription_id,
            resource_group,
            "Microsoft.Storage/storageAccounts",
            API_VERSION,
        );
        self.client
            .pager("storage_accounts.list_by_resource_group", &url)
    }

    /// Storage account deletion is synchronous.
    pub async fn delete(&self, resource_group: &str, name: &str) -> ArmResult<()> {
        self.client
            .delete("storage_accounts.delete", &self.url(resource_group, name, ""))
            .await
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BlobContainer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: ContainerProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerProperties {
    /// `None`, `Blob` or `Container`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_access: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    #[serde(default, skip_serializing)]
    pub last_modified_time: Option<String>,
    #[serde(default, skip_serializing)]
    pub lease_state: Option<String>,
}

impl BlobContainer {
    pub fn private() -> Self {
        Self {
            properties: ContainerProperties {
                public_access: Some("None".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Management-plane view of blob containers.
#[derive(Debug, Clone)]
pub struct BlobContainersClient {
    client: Arc<ArmClient>,
    subscription_id: String,
}

impl BlobContainersClient {
    pub fn new(client: Arc<ArmClient>, subscription_id: &str) -> Self {
        Self {
            client,
            subscription_id: subscription_id.to_string(),
        }
    }

    fn url(&self, resource_group: &str, account: &str, container: Option<&str>) -> String {
        let mut path = format!(
            "Microsoft.Storage/storageAccounts/{}/blobServices/default/containers",
            segment(account)
        );
        if let Some(container) = container {
            path.push('/');
            path.push_str(&segment(container));
        }
        provider_url(
            &self.client,
            &self.subscription_id,
            resource_group,
            &path,
            API_VERSION,
        )
    }

    pub async fn create(
        &self,
        resource_group: &str,
        account: &str,
        name: &str,
        container: &BlobContainer,
    ) -> ArmResult<BlobContainer> {
        self.client
            .put_json(
                "blob_containers.create",
                &self.url(resource_group, account, Some(name)),
                container,
            )
            .await
    }

    pub async fn get(&self, resource_group: &str, account: &str, name: &str) -> ArmResult<BlobContainer> {
        self.client
            .get_json(
                "blob_containers.get",
                &self.url(resource_group, account, Some(name)),
            )
            .await
    }

    pub async fn update(
        &self,
        resource_group: &str,
        account: &str,
        name: &str,
        container: &BlobContainer,
    ) -> ArmResult<BlobContainer> {
        self.client
            .patch_json(
                "blob_containers.update",
                &self.url(resource_group, account, Some(name)),
                container,
            )
            .await
    }

    pub async fn delete(&self, resource_group: &str, account: &str, name: &str) -> ArmResult<()> {
        self.client
            .delete(
                "blob_containers.delete",
                &self.url(resource_group, account, Some(name)),
            )
            .await
    }

    pub fn list(&self, resource_group: &str, account: &str) -> Pager<BlobContainer> {
        self.client
            .pager("blob_containers.list", &self.url(resource_group, account, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tags;

    #[test]
    fn account_body_shape() {
        let account = StorageAccount::new(
            "westus2",
            StorageAccountProperties {
                minimum_tls_version: Some("TLS1_2".to_string()),
                allow_blob_public_access: Some(false),
                ..Default::default()
            },
        )
        .with_sku(Sku::named("Standard_LRS"))
        .with_kind("StorageV2");
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["kind"], "StorageV2");
        assert_eq!(json["sku"]["name"], "Standard_LRS");
        assert_eq!(json["properties"]["minimumTlsVersion"], "TLS1_2");
        assert_eq!(json["properties"]["allowBlobPublicAccess"], false);
    }

    #[test]
    fn key_debug_hides_value() {
        let key: StorageAccountKey =
            serde_json::from_str(r#"{"keyName":"key1","value":"c2VjcmV0","permissions":"FULL"}"#)
                .unwrap();
        let printed = format!("{key:?}");
        assert!(printed.contains("key1"));
        assert!(!printed.contains("c2VjcmV0"));
    }

    #[test]
    fn update_skips_unset_fields() {
        let update = StorageAccountUpdate {
            tags: Some(tags([("stage", "updated")])),
            sku: None,
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"tags": {"stage": "updated"}})
        );
    }

    #[test]
    fn private_container_body() {
        assert_eq!(
            serde_json::to_value(BlobContainer::private()).unwrap(),
            serde_json::json!({"properties": {"publicAccess": "None"}})
        );
    }
}
