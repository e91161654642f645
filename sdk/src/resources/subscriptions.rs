use crate::client::ArmClient;
use crate::common::ArmResult;
use crate::model::ArmList;
use crate::pager::Pager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const API_VERSION: &str = "2022-12-01";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub id: String,
    #[serde(rename = "subscriptionId")]
    pub subscription_id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub state: String,
    #[serde(rename = "tenantId", default)]
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "regionalDisplayName", default)]
    pub regional_display_name: Option<String>,
}

/// Subscriptions visible to the signed-in identity.
#[derive(Debug, Clone)]
pub struct SubscriptionsClient {
    client: Arc<ArmClient>,
}

impl SubscriptionsClient {
    pub fn new(client: Arc<ArmClient>) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Pager<Subscription> {
        let url = format!(
            "{}/subscriptions?api-version={API_VERSION}",
            self.client.endpoint()
        );
        self.client.pager("subscriptions.list", &url)
    }

    pub async fn get(&self, subscription_id: &str) -> ArmResult<Subscription> {
        let url = self
            .client
            .subscription_url(subscription_id, &format!("?api-version={API_VERSION}"));
        self.client.get_json("subscriptions.get", &url).await
    }

    /// Regions available to the subscription.
    pub async fn list_locations(&self, subscription_id: &str) -> ArmResult<Vec<Location>> {
        let url = self.client.subscription_url(
            subscription_id,
            &format!("/locations?api-version={API_VERSION}"),
        );
        let page: ArmList<Location> = self
            .client
            .get_json("subscriptions.list_locations", &url)
            .await?;
        Ok(page.value)
    }
}
