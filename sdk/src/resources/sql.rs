use super::{provider_url, segment};
use crate::client::ArmClient;
use crate::common::ArmResult;
use crate::lro::{NoContent, Poller};
use crate::model::TrackedResource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const API_VERSION: &str = "2021-11-01";

pub type Server = TrackedResource<ServerProperties>;
pub type Database = TrackedResource<DatabaseProperties>;

#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServerProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administrator_login: Option<String>,
    /// Write-only; never returned by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administrator_login_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimal_tls_version: Option<String>,
    #[serde(default, skip_serializing)]
    pub fully_qualified_domain_name: Option<String>,
    #[serde(default, skip_serializing)]
    pub state: Option<String>,
}

impl std::fmt::Debug for ServerProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerProperties")
            .field("administrator_login", &self.administrator_login)
            .field("version", &self.version)
            .field("fully_qualified_domain_name", &self.fully_qualified_domain_name)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ServerProperties {
    pub fn with_admin(login: &str, password: &str) -> Self {
        Self {
            administrator_login: Some(login.to_string()),
            administrator_login_password: Some(password.to_string()),
            version: Some("12.0".to_string()),
            minimal_tls_version: Some("1.2".to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size_bytes: Option<u64>,
    #[serde(default, skip_serializing)]
    pub status: Option<String>,
    #[serde(default, skip_serializing)]
    pub database_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FirewallRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub properties: FirewallRuleProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FirewallRuleProperties {
    pub start_ip_address: String,
    pub end_ip_address: String,
}

impl FirewallRule {
    pub fn range(start: &str, end: &str) -> Self {
        Self {
            id: None,
            name: None,
            properties: FirewallRuleProperties {
                start_ip_address: start.to_string(),
                end_ip_address: end.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqlServersClient {
    client: Arc<ArmClient>,
    subscription_id: String,
}

impl SqlServersClient {
    pub fn new(client: Arc<ArmClient>, subscription_id: &str) -> Self {
        Self {
            client,
            subscription_id: subscription_id.to_string(),
        }
    }

    fn url(&self, resource_group: &str, name: &str) -> String {
        provider_url(
            &self.client,
            &self.subscription_id,
            resource_group,
            &format!("Microsoft.Sql/servers/{}", segment(name)),
            API_VERSION,
        )
    }

    pub async fn begin_create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        server: &Server,
    ) -> ArmResult<Poller<Server>> {
        self.client
            .begin_put(
                "sql_servers.create_or_update",
                &self.url(resource_group, name),
                server,
            )
            .await
    }

    pub async fn get(&self, resource_group: &str, name: &str) -> ArmResult<Server> {
        self.client
            .get_json("sql_servers.get", &self.url(resource_group, name))
            .await
    }

    pub async fn begin_delete(&self, resource_group: &str, name: &str) -> ArmResult<Poller<NoContent>> {
        self.client
            .begin_delete("sql_servers.delete", &self.url(resource_group, name))
            .await
    }
}

#[derive(Debug, Clone)]
pub struct SqlDatabasesClient {
    client: Arc<ArmClient>,
    subscription_id: String,
}

impl SqlDatabasesClient {
    pub fn new(client: Arc<ArmClient>, subscription_id: &str) -> Self {
        Self {
            client,
            subscription_id: subscription_id.to_string(),
        }
    }

    fn url(&self, resource_group: &str, server: &str, name: &str) -> String {
        provider_url(
            &self.client,
            &self.subscription_id,
            resource_group,
            &format!(
                "Microsoft.Sql/servers/{}/databases/{}",
                segment(server),
                segment(name)
            ),
            API_VERSION,
        )
    }

    pub async fn begin_create_or_update(
        &self,
        resource_group: &str,
        server: &str,
        name: &str,
        database: &Database,
    ) -> ArmResult<Poller<Database>> {
        self.client
            .begin_put(
                "sql_databases.create_or_update",
                &self.url(resource_group, server, name),
                database,
            )
            .await
    }

    pub async fn get(&self, resource_group: &str, server: &str, name: &str) -> ArmResult<Database> {
        self.client
            .get_json("sql_databases.get", &self.url(resource_group, server, name))
            .await
    }

    pub async fn begin_delete(
        &self,
        resource_group: &str,
        server: &str,
        name: &str,
    ) -> ArmResult<Poller<NoContent>> {
        self.client
            .begin_delete(
                "sql_databases.delete",
                &self.url(resource_group, server, name),
            )
            .await
    }
}

#[derive(Debug, Clone)]
pub struct FirewallRulesClient {
    client: Arc<ArmClient>,
    subscription_id: String,
}

impl FirewallRulesClient {
    pub fn new(client: Arc<ArmClient>, subscription_id: &str) -> Self {
        Self {
            client,
            subscription_id: subscription_id.to_string(),
        }
    }

    fn url(&self, resource_group: &str, server: &str, name: &str) -> String {
        provider_url(
            &self.client,
            &self.subscription_id,
            resource_group,
            &format!(
                "Microsoft.Sql/servers/{}/firewallRules/{}",
                segment(server),
                segment(name)
            ),
            API_VERSION,
        )
    }

    pub async fn create_or_update(
        &self,
        resource_group: &str,
        server: &str,
        name: &str,
        rule: &FirewallRule,
    ) -> ArmResult<FirewallRule> {
        self.client
            .put_json(
                "firewall_rules.create_or_update",
                &self.url(resource_group, server, name),
                rule,
            )
            .await
    }

    pub async fn get(&self, resource_group: &str, server: &str, name: &str) -> ArmResult<FirewallRule> {
        self.client
            .get_json("firewall_rules.get", &self.url(resource_group, server, name))
            .await
    }

    pub async fn delete(&self, resource_group: &str, server: &str, name: &str) -> ArmResult<()> {
        self.client
            .delete(
                "firewall_rules.delete",
                &self.url(resource_group, server, name),
            )
            .await
    }
}
