use super::{provider_url, segment};
use crate::client::ArmClient;
use crate::common::ArmResult;
use crate::lro::{NoContent, Poller};
use crate::model::{SubResource, TrackedResource};
use crate::pager::Pager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const API_VERSION: &str = "2023-09-01";

pub type VirtualNetwork = TrackedResource<VirtualNetworkProperties>;
pub type PublicIpAddress = TrackedResource<PublicIpAddressProperties>;
pub type NetworkSecurityGroup = TrackedResource<NetworkSecurityGroupProperties>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddressSpace {
    pub address_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetworkProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_space: Option<AddressSpace>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<Subnet>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<String>,
}

impl VirtualNetworkProperties {
    pub fn with_address_space(prefixes: &[&str]) -> Self {
        Self {
            address_space: Some(AddressSpace {
                address_prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
            }),
            ..Default::default()
        }
    }
}

/// Subnets are child resources without a location of their own.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Subnet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: SubnetProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubnetProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_security_group: Option<SubResource>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<String>,
}

impl Subnet {
    /// Inline subnet definition for a virtual network body.
    pub fn named(name: &str, address_prefix: &str) -> Self {
        Self {
            id: None,
            name: Some(name.to_string()),
            properties: SubnetProperties {
                address_prefix: Some(address_prefix.to_string()),
                ..Default::default()
            },
        }
    }

    pub fn with_network_security_group(mut self, id: &str) -> Self {
        self.properties.network_security_group = Some(SubResource { id: id.to_string() });
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpAddressProperties {
    #[serde(
        rename = "publicIPAllocationMethod",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub public_ip_allocation_method: Option<String>,
    #[serde(
        rename = "publicIPAddressVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub public_ip_address_version: Option<String>,
    #[serde(default, skip_serializing)]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSecurityGroupProperties {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_rules: Vec<SecurityRule>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecurityRule {
    pub name: String,
    pub properties: SecurityRuleProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecurityRuleProperties {
    pub protocol: String,
    pub source_port_range: String,
    pub destination_port_range: String,
    pub source_address_prefix: String,
    pub destination_address_prefix: String,
    pub access: String,
    pub priority: u32,
    pub direction: String,
}

impl SecurityRule {
    /// Inbound TCP allow rule for one port from any source.
    pub fn allow_inbound_tcp(name: &str, port: u16, priority: u32) -> Self {
        Self {
            name: name.to_string(),
            properties: SecurityRuleProperties {
                protocol: "Tcp".to_string(),
                source_port_range: "*".to_string(),
                destination_port_range: port.to_string(),
                source_address_prefix: "*".to_string(),
                destination_address_prefix: "*".to_string(),
                access: "Allow".to_string(),
                priority,
                direction: "Inbound".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct VirtualNetworksClient {
    client: Arc<ArmClient>,
    subscription_id: String,
}

impl VirtualNetworksClient {
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
            &format!("Microsoft.Network/virtualNetworks/{}", segment(name)),
            API_VERSION,
        )
    }

    pub async fn begin_create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        network: &VirtualNetwork,
    ) -> ArmResult<Poller<VirtualNetwork>> {
        self.client
            .begin_put(
                "virtual_networks.create_or_update",
                &self.url(resource_group, name),
                network,
            )
            .await
    }

    pub async fn get(&self, resource_group: &str, name: &str) -> ArmResult<VirtualNetwork> {
        self.client
            .get_json("virtual_networks.get", &self.url(resource_group, name))
            .await
    }

    pub async fn begin_delete(
        &self,
        resource_group: &str,
        name: &str,
    ) -> ArmResult<Poller<NoContent>> {
        self.client
            .begin_delete("virtual_networks.delete", &self.url(resource_group, name))
            .await
    }

    pub fn list(&self, resource_group: &str) -> Pager<VirtualNetwork> {
        let url = provider_url(
            &self.client,
            &self.subscription_id,
            resource_group,
            "Microsoft.Network/virtualNetworks",
            API_VERSION,
        );
        self.client.pager("virtual_networks.list", &url)
    }
}

#[derive(Debug, Clone)]
pub struct SubnetsClient {
    client: Arc<ArmClient>,
    subscription_id: String,
}

impl SubnetsClient {
    pub fn new(client: Arc<ArmClient>, subscription_id: &str) -> Self {
        Self {
            client,
            subscription_id: subscription_id.to_string(),
        }
    }

    fn url(&self, resource_group: &str, network: &str, name: &str) -> String {
        let mut path = format!("Microsoft.Network/virtualNetworks/{}/subnets", segment(network));
        if !name.is_empty() {
            path = format!("{path}/{}", segment(name));
        }
        provider_url(
            &self.client,
            &self.subscription_id,
            resource_group,
            &path,
            API_VERSION,
        )
    }

    pub async fn begin_create_or_update(
        &self,
        resource_group: &str,
        network: &str,
        name: &str,
        subnet: &Subnet,
    ) -> ArmResult<Poller<Subnet>> {
        self.client
            .begin_put(
                "subnets.create_or_update",
                &self.url(resource_group, network, name),
                subnet,
            )
            .await
    }

    pub async fn get(&self, resource_group: &str, network: &str, name: &str) -> ArmResult<Subnet> {
        self.client
            .get_json("subnets.get", &self.url(resource_group, network, name))
            .await
    }

    pub async fn begin_delete(
        &self,
        resource_group: &str,
        network: &str,
        name: &str,
    ) -> ArmResult<Poller<NoContent>> {
        self.client
            .begin_delete("subnets.delete", &self.url(resource_group, network, name))
            .await
    }

    pub fn list(&self, resource_group: &str, network: &str) -> Pager<Subnet> {
        self.client
            .pager("subnets.list", &self.url(resource_group, network, ""))
    }
}

#[derive(Debug, Clone)]
pub struct PublicIpAddressesClient {
    client: Arc<ArmClient>,
    subscription_id: String,
}

impl PublicIpAddressesClient {
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
            &format!("Microsoft.Network/publicIPAddresses/{}", segment(name)),
            API_VERSION,
        )
    }

    pub async fn begin_create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        address: &PublicIpAddress,
    ) -> ArmResult<Poller<PublicIpAddress>> {
        self.client
            .begin_put(
                "public_ip_addresses.create_or_update",
                &self.url(resource_group, name),
                address,
            )
            .await
    }

    pub async fn get(&self, resource_group: &str, name: &str) -> ArmResult<PublicIpAddress> {
        self.client
            .get_json("public_ip_addresses.get", &self.url(resource_group, name))
            .await
    }

    pub async fn begin_delete(
        &self,
        resource_group: &str,
        name: &str,
    ) -> ArmResult<Poller<NoContent>> {
        self.client
            .begin_delete("public_ip_addresses.delete", &self.url(resource_group, name))
            .await
    }

    pub fn list(&self, resource_group: &str) -> Pager<PublicIpAddress> {
        let url = provider_url(
            &self.client,
            &self.subscription_id,
            resource_group,
            "Microsoft.Network/publicIPAddresses",
            API_VERSION,
        );
        self.client.pager("public_ip_addresses.list", &url)
    }
}

#[derive(Debug, Clone)]
pub struct NetworkSecurityGroupsClient {
    client: Arc<ArmClient>,
    subscription_id: String,
}

impl NetworkSecurityGroupsClient {
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
            &format!("Microsoft.Network/networkSecurityGroups/{}", segment(name)),
            API_VERSION,
        )
    }

    pub async fn begin_create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        group: &NetworkSecurityGroup,
    ) -> ArmResult<Poller<NetworkSecurityGroup>> {
        self.client
            .begin_put(
                "network_security_groups.create_or_update",
                &self.url(resource_group, name),
                group,
            )
            .await
    }

    pub async fn get(&self, resource_group: &str, name: &str) -> ArmResult<NetworkSecurityGroup> {
        self.client
            .get_json("network_security_groups.get", &self.url(resource_group, name))
            .await
    }

    pub async fn begin_delete(
        &self,
        resource_group: &str,
        name: &str,
    ) -> ArmResult<Poller<NoContent>> {
        self.client
            .begin_delete(
                "network_security_groups.delete",
                &self.url(resource_group, name),
            )
            .await
    }

    pub fn list(&self, resource_group: &str) -> Pager<NetworkSecurityGroup> {
        let url = provider_url(
            &self.client,
            &self.subscription_id,
            resource_group,
            "Microsoft.Network/networkSecurityGroups",
            API_VERSION,
        );
        self.client.pager("network_security_groups.list", &url)
    }
}
