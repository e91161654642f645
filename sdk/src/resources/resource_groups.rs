use super::segment;
use crate::client::ArmClient;
use crate::common::ArmResult;
use crate::lro::{NoContent, Poller};
use crate::model::{GenericResource, Tags, TagsPatch};
use crate::pager::Pager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const API_VERSION: &str = "2021-04-01";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub location: String,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ResourceGroupProperties>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceGroupProperties {
    #[serde(rename = "provisioningState")]
    pub provisioning_state: String,
}

impl ResourceGroup {
    pub fn new(location: &str) -> Self {
        Self {
            id: None,
            name: None,
            location: location.to_string(),
            tags: Tags::new(),
            properties: None,
        }
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    pub fn provisioning_state(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .map(|p| p.provisioning_state.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ResourceGroupsClient {
    client: Arc<ArmClient>,
    subscription_id: String,
}

impl ResourceGroupsClient {
    pub fn new(client: Arc<ArmClient>, subscription_id: &str) -> Self {
        Self {
            client,
            subscription_id: subscription_id.to_string(),
        }
    }

    fn url(&self, name: &str, suffix: &str) -> String {
        self.client.subscription_url(
            &self.subscription_id,
            &format!(
                "/resourcegroups/{}{suffix}?api-version={API_VERSION}",
                segment(name)
            ),
        )
    }

    pub async fn create_or_update(
        &self,
        name: &str,
        group: &ResourceGroup,
    ) -> ArmResult<ResourceGroup> {
        self.client
            .put_json("resource_groups.create_or_update", &self.url(name, ""), group)
            .await
    }

    pub async fn get(&self, name: &str) -> ArmResult<ResourceGroup> {
        self.client
            .get_json("resource_groups.get", &self.url(name, ""))
            .await
    }

    pub async fn check_existence(&self, name: &str) -> ArmResult<bool> {
        self.client
            .head_exists("resource_groups.check_existence", &self.url(name, ""))
            .await
    }

    /// Replaces the group's tags.
    pub async fn update(&self, name: &str, tags: Tags) -> ArmResult<ResourceGroup> {
        self.client
            .patch_json(
                "resource_groups.update",
                &self.url(name, ""),
                &TagsPatch::new(tags),
            )
            .await
    }

    pub fn list(&self) -> Pager<ResourceGroup> {
        let url = self.client.subscription_url(
            &self.subscription_id,
            &format!("/resourcegroups?api-version={API_VERSION}"),
        );
        self.client.pager("resource_groups.list", &url)
    }

    /// Every resource inside the group, regardless of provider.
    pub fn list_resources(&self, name: &str) -> Pager<GenericResource> {
        self.client
            .pager("resource_groups.list_resources", &self.url(name, "/resources"))
    }

    /// Deletes the group and everything in it.
    pub async fn begin_delete(&self, name: &str) -> ArmResult<Poller<NoContent>> {
        self.client
            .begin_delete("resource_groups.delete", &self.url(name, ""))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_body_only_has_location_and_tags() {
        let group = ResourceGroup::new("eastus").with_tags(crate::model::tags([("a", "b")]));
        assert_eq!(
            serde_json::to_value(&group).unwrap(),
            serde_json::json!({"location": "eastus", "tags": {"a": "b"}})
        );
    }

    #[test]
    fn reads_provisioning_state() {
        let group: ResourceGroup = serde_json::from_str(
            r#"{"id":"/subscriptions/s/resourceGroups/rg","name":"rg","location":"eastus",
                "properties":{"provisioningState":"Succeeded"}}"#,
        )
        .unwrap();
        assert_eq!(group.provisioning_state(), Some("Succeeded"));
        assert!(group.tags.is_empty());
    }
}
