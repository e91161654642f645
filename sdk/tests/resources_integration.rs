//! Typed resource clients against a mocked ARM endpoint: URLs, bodies and
//! response shapes of the operations the sample programs do not cover.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use claims::*;
use sdk::resources::keyvault::{
    AccessPolicyEntry, AccessPolicyUpdateKind, VaultAccessPolicyParameters,
    VaultAccessPolicyProperties,
};
use sdk::resources::storage::BlobContainer;
use sdk::resources::{
    ApisClient, BlobContainersClient, FirewallRulesClient, ManagedClustersClient, RedisClient,
    StorageAccountsClient, VaultsClient, VirtualNetworksClient,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::*;

const GROUP: &str = "resources-rg";

mod storage_accounts {
    use super::*;

    const ACCOUNT: &str = "Microsoft.Storage/storageAccounts/acct1";

    #[tokio::test]
    async fn test_regenerate_key_posts_key_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(provider_path(GROUP, &format!("{ACCOUNT}/regenerateKey"))))
            .and(query_param("api-version", "2023-01-01"))
            .and(body_json(json!({"keyName": "key1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "keys": [
                    {"keyName": "key1", "value": "bmV3", "permissions": "FULL"},
                    {"keyName": "key2", "value": "b2xk", "permissions": "FULL"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let accounts = StorageAccountsClient::new(mock_client(&server), SUBSCRIPTION);
        let keys = assert_ok!(accounts.regenerate_key(GROUP, "acct1", "key1").await);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].key_name, "key1");
        assert_eq!(keys[0].value, "bmV3");
        assert!(!format!("{:?}", keys[0]).contains("bmV3"));
    }

    #[tokio::test]
    async fn test_get_list_and_delete() {
        let server = MockServer::start().await;
        let account = json!({
            "id": format!("/subscriptions/{SUBSCRIPTION}/resourceGroups/{GROUP}/providers/{ACCOUNT}"),
            "name": "acct1",
            "location": "eastus",
            "kind": "StorageV2",
            "sku": {"name": "Standard_LRS"},
            "properties": {
                "provisioningState": "Succeeded",
                "primaryEndpoints": {"blob": "https://acct1.blob.core.windows.net/"}
            }
        });
        Mock::given(method("GET"))
            .and(path(provider_path(GROUP, ACCOUNT)))
            .respond_with(ResponseTemplate::new(200).set_body_json(account.clone()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(provider_path(GROUP, "Microsoft.Storage/storageAccounts")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": [account]})))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(provider_path(GROUP, ACCOUNT)))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let accounts = StorageAccountsClient::new(mock_client(&server), SUBSCRIPTION);
        let fetched = assert_ok!(accounts.get_properties(GROUP, "acct1").await);
        assert_eq!(fetched.display_name(), "acct1");
        assert_eq!(fetched.kind.as_deref(), Some("StorageV2"));
        let blob = fetched
            .properties
            .and_then(|p| p.primary_endpoints)
            .and_then(|e| e.blob);
        assert_eq!(blob.as_deref(), Some("https://acct1.blob.core.windows.net/"));

        let listed = assert_ok!(accounts.list_by_resource_group(GROUP).collect_all().await);
        assert_eq!(listed.len(), 1);

        assert_ok!(accounts.delete(GROUP, "acct1").await);
    }
}

mod blob_containers {
    use super::*;

    const CONTAINERS: &str =
        "Microsoft.Storage/storageAccounts/acct1/blobServices/default/containers";

    #[tokio::test]
    async fn test_container_lifecycle() {
        let server = MockServer::start().await;
        let container_path = provider_path(GROUP, &format!("{CONTAINERS}/data"));
        Mock::given(method("GET"))
            .and(path(container_path.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "data",
                "properties": {"publicAccess": "None", "leaseState": "Available"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path(container_path.clone()))
            .and(body_json(json!({
                "properties": {"publicAccess": "None", "metadata": {"owner": "samples"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "data",
                "properties": {"publicAccess": "None", "metadata": {"owner": "samples"}}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(provider_path(GROUP, CONTAINERS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"name": "data"}, {"name": "logs"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(container_path))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let containers = BlobContainersClient::new(mock_client(&server), SUBSCRIPTION);
        let container = assert_ok!(containers.get(GROUP, "acct1", "data").await);
        assert_eq!(container.properties.lease_state.as_deref(), Some("Available"));

        let mut update = BlobContainer::private();
        update
            .properties
            .metadata
            .insert("owner".to_string(), "samples".to_string());
        let updated = assert_ok!(containers.update(GROUP, "acct1", "data", &update).await);
        assert_eq!(updated.properties.metadata["owner"], "samples");

        let names: Vec<_> = assert_ok!(containers.list(GROUP, "acct1").collect_all().await)
            .into_iter()
            .filter_map(|c| c.name)
            .collect();
        assert_eq!(names, ["data", "logs"]);

        assert_ok!(containers.delete(GROUP, "acct1", "data").await);
    }
}

mod vaults {
    use super::*;

    #[tokio::test]
    async fn test_update_access_policy_uses_kind_in_path() {
        let server = MockServer::start().await;
        let policy = AccessPolicyEntry::secrets_manager("tenant-1", "object-1");
        let body = VaultAccessPolicyParameters {
            properties: VaultAccessPolicyProperties {
                access_policies: vec![policy.clone()],
            },
        };
        Mock::given(method("PUT"))
            .and(path(provider_path(
                GROUP,
                "Microsoft.KeyVault/vaults/kv1/accessPolicies/add",
            )))
            .and(body_json(serde_json::to_value(&body).unwrap()))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let vaults = VaultsClient::new(mock_client(&server), SUBSCRIPTION);
        let result = assert_ok!(
            vaults
                .update_access_policy(GROUP, "kv1", AccessPolicyUpdateKind::Add, vec![policy])
                .await
        );
        assert_eq!(result, body);
    }

    #[tokio::test]
    async fn test_delete_then_purge() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(provider_path(GROUP, "Microsoft.KeyVault/vaults")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{
                    "name": "kv1",
                    "location": "eastus",
                    "properties": {
                        "tenantId": "tenant-1",
                        "sku": {"family": "A", "name": "standard"},
                        "vaultUri": "https://kv1.vault.azure.net/"
                    }
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(provider_path(GROUP, "Microsoft.KeyVault/vaults/kv1")))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!(
                "/subscriptions/{SUBSCRIPTION}/providers/Microsoft.KeyVault/locations/eastus/deletedVaults/kv1/purge"
            )))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let vaults = VaultsClient::new(mock_client(&server), SUBSCRIPTION);
        let listed = assert_ok!(vaults.list_by_resource_group(GROUP).collect_all().await);
        let uri = listed[0].properties.as_ref().and_then(|p| p.vault_uri.as_deref());
        assert_eq!(uri, Some("https://kv1.vault.azure.net/"));

        assert_ok!(vaults.delete(GROUP, "kv1").await);
        let mut purge = assert_ok!(vaults.begin_purge_deleted("eastus", "kv1").await);
        assert!(purge.done());
        assert_ok!(purge.poll_until_done().await);
    }
}

mod providers {
    use super::*;

    #[tokio::test]
    async fn test_redis_name_conflict_means_unavailable() {
        let server = MockServer::start().await;
        let check_path =
            format!("/subscriptions/{SUBSCRIPTION}/providers/Microsoft.Cache/CheckNameAvailability");
        Mock::given(method("POST"))
            .and(path(check_path.clone()))
            .and(body_json(json!({"name": "taken", "type": "Microsoft.Cache/redis"})))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error": {"code": "NameNotAvailable", "message": "taken"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(check_path))
            .and(body_json(json!({"name": "free", "type": "Microsoft.Cache/redis"})))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let redis = RedisClient::new(mock_client(&server), SUBSCRIPTION);
        assert!(!assert_ok!(redis.check_name_availability("taken").await));
        assert!(assert_ok!(redis.check_name_availability("free").await));
    }

    #[tokio::test]
    async fn test_admin_kubeconfig_is_decoded() {
        let server = MockServer::start().await;
        let kubeconfig = "apiVersion: v1\nkind: Config\n";
        Mock::given(method("POST"))
            .and(path(provider_path(
                GROUP,
                "Microsoft.ContainerService/managedClusters/aks1/listClusterAdminCredential",
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kubeconfigs": [{"name": "clusterAdmin", "value": STANDARD.encode(kubeconfig)}]
            })))
            .mount(&server)
            .await;

        let clusters = ManagedClustersClient::new(mock_client(&server), SUBSCRIPTION);
        let credentials = assert_ok!(clusters.list_cluster_admin_credentials(GROUP, "aks1").await);
        assert_eq!(credentials.kubeconfigs.len(), 1);
        assert_eq!(assert_ok!(credentials.kubeconfigs[0].kubeconfig()), kubeconfig);
    }

    #[tokio::test]
    async fn test_firewall_rule_get_and_delete() {
        let server = MockServer::start().await;
        let rule_path = provider_path(
            GROUP,
            "Microsoft.Sql/servers/sql1/firewallRules/AllowAllWindowsAzureIps",
        );
        Mock::given(method("GET"))
            .and(path(rule_path.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "AllowAllWindowsAzureIps",
                "properties": {"startIpAddress": "0.0.0.0", "endIpAddress": "0.0.0.0"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(rule_path))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let rules = FirewallRulesClient::new(mock_client(&server), SUBSCRIPTION);
        let rule = assert_ok!(rules.get(GROUP, "sql1", "AllowAllWindowsAzureIps").await);
        assert_eq!(rule.properties.start_ip_address, "0.0.0.0");
        assert_ok!(rules.delete(GROUP, "sql1", "AllowAllWindowsAzureIps").await);
    }

    #[tokio::test]
    async fn test_api_delete_sends_if_match() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(provider_path(
                GROUP,
                "Microsoft.ApiManagement/service/apim1/apis/echo-api",
            )))
            .and(header("If-Match", "*"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let apis = ApisClient::new(mock_client(&server), SUBSCRIPTION);
        assert_ok!(apis.delete(GROUP, "apim1", "echo-api").await);
    }

    #[tokio::test]
    async fn test_virtual_networks_are_listed_per_group() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(provider_path(GROUP, "Microsoft.Network/virtualNetworks")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{
                    "name": "vnet1",
                    "location": "eastus",
                    "properties": {"addressSpace": {"addressPrefixes": ["10.0.0.0/16"]}}
                }]
            })))
            .mount(&server)
            .await;

        let networks = VirtualNetworksClient::new(mock_client(&server), SUBSCRIPTION);
        let listed = assert_ok!(networks.list(GROUP).collect_all().await);
        assert_eq!(listed[0].display_name(), "vnet1");
        let prefixes = listed[0]
            .properties
            .as_ref()
            .and_then(|p| p.address_space.as_ref())
            .map(|s| s.address_prefixes.clone());
        assert_eq!(prefixes, Some(vec!["10.0.0.0/16".to_string()]));
    }
}
