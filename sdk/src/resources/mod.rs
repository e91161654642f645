//! Typed clients for the resource providers the samples use.
//!
//! Each client wraps a shared [`ArmClient`] and a subscription ID, and maps
//! its methods one-to-one onto ARM REST operations. Long-running operations
//! return a [`crate::Poller`], list operations a [`crate::Pager`].

pub mod apimanagement;
pub mod containerservice;
pub mod cosmosdb;
pub mod keyvault;
pub mod network;
pub mod redis;
pub mod resource_groups;
pub mod sql;
pub mod storage;
pub mod subscriptions;

pub use apimanagement::{ApiManagementServiceClient, ApisClient};
pub use containerservice::ManagedClustersClient;
pub use cosmosdb::{DatabaseAccountsClient, SqlResourcesClient};
pub use keyvault::VaultsClient;
pub use network::{
    NetworkSecurityGroupsClient, PublicIpAddressesClient, SubnetsClient, VirtualNetworksClient,
};
pub use redis::RedisClient;
pub use resource_groups::ResourceGroupsClient;
pub use sql::{FirewallRulesClient, SqlDatabasesClient, SqlServersClient};
pub use storage::{BlobContainersClient, StorageAccountsClient};
pub use subscriptions::SubscriptionsClient;

use crate::client::ArmClient;
use std::borrow::Cow;

/// `.../resourceGroups/{rg}/providers/{path}?api-version={api_version}`
///
/// `path` must already have its name segments encoded with [`segment`].
pub(crate) fn provider_url(
    client: &ArmClient,
    subscription_id: &str,
    resource_group: &str,
    path: &str,
    api_version: &str,
) -> String {
    client.resource_group_url(
        subscription_id,
        resource_group,
        &format!("/providers/{path}?api-version={api_version}"),
    )
}

/// `.../subscriptions/{sub}/providers/{path}?api-version={api_version}`
pub(crate) fn subscription_provider_url(
    client: &ArmClient,
    subscription_id: &str,
    path: &str,
    api_version: &str,
) -> String {
    client.subscription_url(
        subscription_id,
        &format!("/providers/{path}?api-version={api_version}"),
    )
}

pub(crate) fn segment(name: &str) -> Cow<'_, str> {
    urlencoding::encode(name)
}
