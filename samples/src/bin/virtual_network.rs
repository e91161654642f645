//! Provisions a network security group, a virtual network with two subnets
//! and a static public IP address.

use anyhow::Context;
use arm_samples::{SampleContext, bootstrap, finish};
use sdk::model::{Sku, TrackedResource};
use sdk::resources::network::{
    NetworkSecurityGroupProperties, PublicIpAddressProperties, SecurityRule, Subnet,
    VirtualNetworkProperties,
};
use sdk::resources::{
    NetworkSecurityGroupsClient, PublicIpAddressesClient, SubnetsClient, VirtualNetworksClient,
};
use sdk::scenario::Scenario;
use std::process::ExitCode;

const SAMPLE: &str = "virtual-network";
const NSG_NAME: &str = "sample-nsg";
const VNET_NAME: &str = "sample-vnet";
const FRONTEND_SUBNET: &str = "frontend";
const BACKEND_SUBNET: &str = "backend";
const PUBLIC_IP_NAME: &str = "sample-ip";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let context = bootstrap(SAMPLE);
    let result = context
        .scenario(SAMPLE)
        .run(|scenario| run(scenario, &context))
        .await;
    finish(SAMPLE, result)
}

async fn run(scenario: Scenario, context: &SampleContext) -> anyhow::Result<()> {
    let subscription = scenario.subscription_id();
    let group = scenario.resource_group();
    let location = scenario.location();

    let nsg_client = NetworkSecurityGroupsClient::new(context.client.clone(), subscription);
    let nsg = TrackedResource::new(
        location,
        NetworkSecurityGroupProperties {
            security_rules: vec![SecurityRule::allow_inbound_tcp("allow-https", 443, 100)],
            ..Default::default()
        },
    );
    let nsg = nsg_client
        .begin_create_or_update(group, NSG_NAME, &nsg)
        .await?
        .poll_until_done()
        .await?;
    let nsg_id = nsg.id.context("network security group has no ID")?;
    log::info!("Created network security group {nsg_id}");

    let vnets = VirtualNetworksClient::new(context.client.clone(), subscription);
    let mut properties = VirtualNetworkProperties::with_address_space(&["10.0.0.0/16"]);
    properties.subnets = vec![
        Subnet::named(FRONTEND_SUBNET, "10.0.0.0/24").with_network_security_group(&nsg_id),
        Subnet::named(BACKEND_SUBNET, "10.0.1.0/24"),
    ];
    let vnet = vnets
        .begin_create_or_update(group, VNET_NAME, &TrackedResource::new(location, properties))
        .await?
        .poll_until_done()
        .await?;
    log::info!(
        "Created virtual network {} with {} subnets",
        vnet.display_name(),
        vnet.properties.as_ref().map(|p| p.subnets.len()).unwrap_or_default()
    );

    let subnets = SubnetsClient::new(context.client.clone(), subscription);
    let backend = subnets.get(group, VNET_NAME, BACKEND_SUBNET).await?;
    log::info!(
        "Subnet {} uses {}",
        backend.name.as_deref().unwrap_or(BACKEND_SUBNET),
        backend.properties.address_prefix.as_deref().unwrap_or("-")
    );

    let addresses = PublicIpAddressesClient::new(context.client.clone(), subscription);
    let address = TrackedResource::new(
        location,
        PublicIpAddressProperties {
            public_ip_allocation_method: Some("Static".to_string()),
            public_ip_address_version: Some("IPv4".to_string()),
            ..Default::default()
        },
    )
    .with_sku(Sku::named("Standard"));
    let address = addresses
        .begin_create_or_update(group, PUBLIC_IP_NAME, &address)
        .await?
        .poll_until_done()
        .await?;
    log::info!(
        "Public IP {} allocated {}",
        address.display_name(),
        address
            .properties
            .as_ref()
            .and_then(|p| p.ip_address.as_deref())
            .unwrap_or("no address yet")
    );
    Ok(())
}
