use super::{provider_url, segment, subscription_provider_url};
use crate::client::{ArmClient, ArmRequest};
use crate::common::ArmResult;
use crate::lro::{NoContent, Poller};
use crate::model::{CheckNameAvailabilityResult, TagsPatch, TrackedResource};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const API_VERSION: &str = "2022-08-01";

pub type ApiManagementService = TrackedResource<ApiManagementServiceProperties>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiManagementServiceProperties {
    pub publisher_email: String,
    pub publisher_name: String,
    #[serde(default, skip_serializing)]
    pub gateway_url: Option<String>,
    #[serde(default, skip_serializing)]
    pub portal_url: Option<String>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Serialize)]
struct NameRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Clone)]
pub struct ApiManagementServiceClient {
    client: Arc<ArmClient>,
    subscription_id: String,
}

impl ApiManagementServiceClient {
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
            &format!("Microsoft.ApiManagement/service/{}", segment(name)),
            API_VERSION,
        )
    }

    pub async fn check_name_availability(&self, name: &str) -> ArmResult<CheckNameAvailabilityResult> {
        let url = subscription_provider_url(
            &self.client,
            &self.subscription_id,
            "Microsoft.ApiManagement/checkNameAvailability",
            API_VERSION,
        );
        self.client
            .post_json(
                "api_management.check_name_availability",
                &url,
                &NameRequest { name },
            )
            .await
    }

    /// Provisioning a new service commonly takes 30 minutes or more.
    pub async fn begin_create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        service: &ApiManagementService,
    ) -> ArmResult<Poller<ApiManagementService>> {
        self.client
            .begin_put(
                "api_management.create_or_update",
                &self.url(resource_group, name),
                service,
            )
            .await
    }

    pub async fn get(&self, resource_group: &str, name: &str) -> ArmResult<ApiManagementService> {
        self.client
            .get_json("api_management.get", &self.url(resource_group, name))
            .await
    }

    /// Updates tags and waits for the service to finish applying them.
    pub async fn update(
        &self,
        resource_group: &str,
        name: &str,
        patch: &TagsPatch,
    ) -> ArmResult<ApiManagementService> {
        let mut poller: Poller<ApiManagementService> = self
            .client
            .begin_patch("api_management.update", &self.url(resource_group, name), patch)
            .await?;
        poller.poll_until_done().await
    }

    pub async fn begin_delete(&self, resource_group: &str, name: &str) -> ArmResult<Poller<NoContent>> {
        self.client
            .begin_delete("api_management.delete", &self.url(resource_group, name))
            .await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiContract {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub properties: ApiProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiProperties {
    pub display_name: String,
    pub path: String,
    #[serde(default)]
    pub protocols: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ApiContract {
    pub fn https(display_name: &str, path: &str, service_url: &str) -> Self {
        Self {
            id: None,
            name: None,
            properties: ApiProperties {
                display_name: display_name.to_string(),
                path: path.to_string(),
                protocols: vec!["https".to_string()],
                service_url: Some(service_url.to_string()),
                description: None,
            },
        }
    }
}

/// APIs published by an API Management service.
#[derive(Debug, Clone)]
pub struct ApisClient {
    client: Arc<ArmClient>,
    subscription_id: String,
}

impl ApisClient {
    pub fn new(client: Arc<ArmClient>, subscription_id: &str) -> Self {
        Self {
            client,
            subscription_id: subscription_id.to_string(),
        }
    }

    fn url(&self, resource_group: &str, service: &str, api_id: &str) -> String {
        provider_url(
            &self.client,
            &self.subscription_id,
            resource_group,
            &format!(
                "Microsoft.ApiManagement/service/{}/apis/{}",
                segment(service),
                segment(api_id)
            ),
            API_VERSION,
        )
    }

    pub async fn begin_create_or_update(
        &self,
        resource_group: &str,
        service: &str,
        api_id: &str,
        api: &ApiContract,
    ) -> ArmResult<Poller<ApiContract>> {
        self.client
            .begin_put(
                "apis.create_or_update",
                &self.url(resource_group, service, api_id),
                api,
            )
            .await
    }

    pub async fn get(&self, resource_group: &str, service: &str, api_id: &str) -> ArmResult<ApiContract> {
        self.client
            .get_json("apis.get", &self.url(resource_group, service, api_id))
            .await
    }

    /// Unconditional delete (`If-Match: *`).
    pub async fn delete(&self, resource_group: &str, service: &str, api_id: &str) -> ArmResult<()> {
        let request = ArmRequest::new(
            "apis.delete",
            Method::DELETE,
            self.url(resource_group, service, api_id),
        )
        .header("If-Match", "*");
        self.client.send(&request).await.map(|_| ())
    }
}
