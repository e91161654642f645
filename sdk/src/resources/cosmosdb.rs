use super::{provider_url, segment};
use crate::client::ArmClient;
use crate::common::ArmResult;
use crate::lro::{NoContent, Poller};
use crate::model::{TagsPatch, TrackedResource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const API_VERSION: &str = "2024-05-15";

pub type DatabaseAccount = TrackedResource<DatabaseAccountProperties>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseAccountProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_account_offer_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<AccountLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistency_policy: Option<ConsistencyPolicy>,
    #[serde(default, skip_serializing)]
    pub document_endpoint: Option<String>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<String>,
}

impl DatabaseAccountProperties {
    /// Single-region `Standard` account with session consistency.
    pub fn single_region(location: &str) -> Self {
        Self {
            database_account_offer_type: Some("Standard".to_string()),
            locations: vec![AccountLocation {
                location_name: location.to_string(),
                failover_priority: 0,
                is_zone_redundant: Some(false),
            }],
            consistency_policy: Some(ConsistencyPolicy {
                default_consistency_level: "Session".to_string(),
            }),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountLocation {
    pub location_name: String,
    pub failover_priority: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_zone_redundant: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyPolicy {
    pub default_consistency_level: String,
}

#[derive(Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseAccountKeys {
    pub primary_master_key: String,
    pub secondary_master_key: String,
    #[serde(default)]
    pub primary_readonly_master_key: Option<String>,
    #[serde(default)]
    pub secondary_readonly_master_key: Option<String>,
}

impl std::fmt::Debug for DatabaseAccountKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseAccountKeys").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseAccountsClient {
    client: Arc<ArmClient>,
    subscription_id: String,
}

impl DatabaseAccountsClient {
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
            &format!("Microsoft.DocumentDB/databaseAccounts/{}{suffix}", segment(name)),
            API_VERSION,
        )
    }

    pub async fn begin_create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        account: &DatabaseAccount,
    ) -> ArmResult<Poller<DatabaseAccount>> {
        self.client
            .begin_put(
                "database_accounts.create_or_update",
                &self.url(resource_group, name, ""),
                account,
            )
            .await
    }

    pub async fn get(&self, resource_group: &str, name: &str) -> ArmResult<DatabaseAccount> {
        self.client
            .get_json("database_accounts.get", &self.url(resource_group, name, ""))
            .await
    }

    /// Tag updates on Cosmos DB accounts are themselves long-running.
    pub async fn begin_update(
        &self,
        resource_group: &str,
        name: &str,
        patch: &TagsPatch,
    ) -> ArmResult<Poller<DatabaseAccount>> {
        self.client
            .begin_patch(
                "database_accounts.update",
                &self.url(resource_group, name, ""),
                patch,
            )
            .await
    }

    pub async fn list_keys(&self, resource_group: &str, name: &str) -> ArmResult<DatabaseAccountKeys> {
        self.client
            .post_empty(
                "database_accounts.list_keys",
                &self.url(resource_group, name, "/listKeys"),
            )
            .await
    }

    pub async fn begin_delete(&self, resource_group: &str, name: &str) -> ArmResult<Poller<NoContent>> {
        self.client
            .begin_delete(
                "database_accounts.delete",
                &self.url(resource_group, name, ""),
            )
            .await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SqlDatabase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub properties: SqlDatabaseProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SqlDatabaseProperties {
    pub resource: SqlDatabaseResource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<CreateUpdateOptions>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SqlDatabaseResource {
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreateUpdateOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throughput: Option<u32>,
}

impl SqlDatabase {
    pub fn named(name: &str) -> Self {
        Self {
            id: None,
            name: None,
            properties: SqlDatabaseProperties {
                resource: SqlDatabaseResource {
                    id: name.to_string(),
                },
                options: Some(CreateUpdateOptions::default()),
            },
        }
    }
}

/// SQL API databases inside a Cosmos DB account.
#[derive(Debug, Clone)]
pub struct SqlResourcesClient {
    client: Arc<ArmClient>,
    subscription_id: String,
}

impl SqlResourcesClient {
    pub fn new(client: Arc<ArmClient>, subscription_id: &str) -> Self {
        Self {
            client,
            subscription_id: subscription_id.to_string(),
        }
    }

    fn url(&self, resource_group: &str, account: &str, database: &str) -> String {
        provider_url(
            &self.client,
            &self.subscription_id,
            resource_group,
            &format!(
                "Microsoft.DocumentDB/databaseAccounts/{}/sqlDatabases/{}",
                segment(account),
                segment(database)
            ),
            API_VERSION,
        )
    }

    pub async fn begin_create_update_sql_database(
        &self,
        resource_group: &str,
        account: &str,
        name: &str,
        database: &SqlDatabase,
    ) -> ArmResult<Poller<SqlDatabase>> {
        self.client
            .begin_put(
                "sql_resources.create_update_sql_database",
                &self.url(resource_group, account, name),
                database,
            )
            .await
    }

    pub async fn get_sql_database(
        &self,
        resource_group: &str,
        account: &str,
        name: &str,
    ) -> ArmResult<SqlDatabase> {
        self.client
            .get_json(
                "sql_resources.get_sql_database",
                &self.url(resource_group, account, name),
            )
            .await
    }

    pub async fn begin_delete_sql_database(
        &self,
        resource_group: &str,
        account: &str,
        name: &str,
    ) -> ArmResult<Poller<NoContent>> {
        self.client
            .begin_delete(
                "sql_resources.delete_sql_database",
                &self.url(resource_group, account, name),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_body_shape() {
        let account = DatabaseAccount::new(
            "eastus",
            DatabaseAccountProperties::single_region("eastus"),
        )
        .with_kind("GlobalDocumentDB");
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["kind"], "GlobalDocumentDB");
        assert_eq!(json["properties"]["databaseAccountOfferType"], "Standard");
        assert_eq!(json["properties"]["locations"][0]["locationName"], "eastus");
        assert_eq!(
            json["properties"]["consistencyPolicy"]["defaultConsistencyLevel"],
            "Session"
        );
    }

    #[test]
    fn sql_database_body_shape() {
        assert_eq!(
            serde_json::to_value(SqlDatabase::named("db1")).unwrap(),
            serde_json::json!({"properties": {"resource": {"id": "db1"}, "options": {}}})
        );
    }

    #[test]
    fn reads_database_response_with_system_fields() {
        let database: SqlDatabase = serde_json::from_str(
            r#"{"id":"/x/sqlDatabases/db1","name":"db1",
                "properties":{"resource":{"id":"db1","_rid":"abc","_ts":1700000000}}}"#,
        )
        .unwrap();
        assert_eq!(database.properties.resource.id, "db1");
        assert!(database.properties.options.is_none());
    }

    #[test]
    fn keys_are_not_printed() {
        let keys: DatabaseAccountKeys = serde_json::from_str(
            r#"{"primaryMasterKey":"p","secondaryMasterKey":"s"}"#,
        )
        .unwrap();
        assert_eq!(format!("{keys:?}"), "DatabaseAccountKeys { .. }");
    }
}
