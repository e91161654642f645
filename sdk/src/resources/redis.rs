use super::{provider_url, segment, subscription_provider_url};
use crate::client::ArmClient;
use crate::common::ArmResult;
use crate::lro::{NoContent, Poller};
use crate::model::{CheckNameAvailabilityRequest, Sku, Tags, TrackedResource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const API_VERSION: &str = "2024-03-01";

pub type RedisResource = TrackedResource<RedisProperties>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RedisProperties {
    /// Redis keeps its SKU inside `properties`.
    pub sku: Sku,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_non_ssl_port: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_tls_version: Option<String>,
    #[serde(default, skip_serializing)]
    pub host_name: Option<String>,
    #[serde(default, skip_serializing)]
    pub ssl_port: Option<u16>,
    #[serde(default, skip_serializing)]
    pub redis_version: Option<String>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<String>,
}

impl RedisProperties {
    /// Smallest cache: Basic C0, TLS only.
    pub fn basic_c0() -> Self {
        Self {
            sku: Sku {
                name: "Basic".to_string(),
                tier: None,
                family: Some("C".to_string()),
                capacity: Some(0),
            },
            enable_non_ssl_port: Some(false),
            minimum_tls_version: Some("1.2".to_string()),
            host_name: None,
            ssl_port: None,
            redis_version: None,
            provisioning_state: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedisUpdateParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<RedisUpdateProperties>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedisUpdateProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_non_ssl_port: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_tls_version: Option<String>,
}

#[derive(Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RedisAccessKeys {
    pub primary_key: String,
    pub secondary_key: String,
}

impl std::fmt::Debug for RedisAccessKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisAccessKeys").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct RedisClient {
    client: Arc<ArmClient>,
    subscription_id: String,
}

impl RedisClient {
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
            &format!("Microsoft.Cache/redis/{}{suffix}", segment(name)),
            API_VERSION,
        )
    }

    /// The Redis provider answers `200` with no body when the name is free
    /// and an error status when it is taken.
    pub async fn check_name_availability(&self, name: &str) -> ArmResult<bool> {
        let url = subscription_provider_url(
            &self.client,
            &self.subscription_id,
            "Microsoft.Cache/CheckNameAvailability",
            API_VERSION,
        );
        let request = CheckNameAvailabilityRequest {
            name: name.to_string(),
            resource_type: "Microsoft.Cache/redis".to_string(),
        };
        let result: ArmResult<serde_json::Value> = self
            .client
            .post_json("redis.check_name_availability", &url, &request)
            .await;
        match result {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.status(), Some(400 | 409)) => {
                log::debug!("Redis name {name} is not available: {e}");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn begin_create(
        &self,
        resource_group: &str,
        name: &str,
        cache: &RedisResource,
    ) -> ArmResult<Poller<RedisResource>> {
        self.client
            .begin_put("redis.create", &self.url(resource_group, name, ""), cache)
            .await
    }

    pub async fn get(&self, resource_group: &str, name: &str) -> ArmResult<RedisResource> {
        self.client
            .get_json("redis.get", &self.url(resource_group, name, ""))
            .await
    }

    pub async fn update(
        &self,
        resource_group: &str,
        name: &str,
        update: &RedisUpdateParameters,
    ) -> ArmResult<RedisResource> {
        self.client
            .patch_json("redis.update", &self.url(resource_group, name, ""), update)
            .await
    }

    pub async fn list_keys(&self, resource_group: &str, name: &str) -> ArmResult<RedisAccessKeys> {
        self.client
            .post_empty("redis.list_keys", &self.url(resource_group, name, "/listKeys"))
            .await
    }

    pub async fn begin_delete(&self, resource_group: &str, name: &str) -> ArmResult<Poller<NoContent>> {
        self.client
            .begin_delete("redis.delete", &self.url(resource_group, name, ""))
            .await
    }
}
