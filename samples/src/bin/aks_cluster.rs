//! Creates a one-node AKS cluster backed by the service principal in
//! `AZURE_CLIENT_ID` / `AZURE_CLIENT_SECRET` and fetches its admin
//! kubeconfig.

use anyhow::Context;
use arm_samples::{SampleContext, bootstrap_requiring, finish};
use sdk::model::TrackedResource;
use sdk::resources::ManagedClustersClient;
use sdk::resources::containerservice::{
    AgentPoolProfile, ManagedClusterProperties, ServicePrincipalProfile,
};
use sdk::scenario::{Scenario, unique_name};
use sdk::utils::env::{AZURE_CLIENT_ID, AZURE_CLIENT_SECRET};
use std::process::ExitCode;

const SAMPLE: &str = "aks-cluster";
const NODE_POOL: &str = "nodepool1";
const NODE_SIZE: &str = "Standard_DS2_v2";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let context = bootstrap_requiring(SAMPLE, &[AZURE_CLIENT_ID, AZURE_CLIENT_SECRET]);
    let result = context
        .scenario(SAMPLE)
        .run(|scenario| run(scenario, &context))
        .await;
    finish(SAMPLE, result)
}

async fn run(scenario: Scenario, context: &SampleContext) -> anyhow::Result<()> {
    let client_id = context.env.require_client_id()?;
    let client_secret = context.env.require_client_secret()?;
    let group = scenario.resource_group();
    let clusters = ManagedClustersClient::new(context.client.clone(), scenario.subscription_id());
    let name = unique_name("sampleaks");

    let cluster = TrackedResource::new(
        scenario.location(),
        ManagedClusterProperties {
            dns_prefix: Some(name.clone()),
            agent_pool_profiles: vec![AgentPoolProfile::system(NODE_POOL, 1, NODE_SIZE)],
            service_principal_profile: Some(ServicePrincipalProfile {
                client_id: client_id.to_string(),
                secret: Some(client_secret.to_string()),
            }),
            ..Default::default()
        },
    );
    log::info!("Creating cluster {name}, this usually takes several minutes");
    let cluster = clusters
        .begin_create_or_update(group, &name, &cluster)
        .await?
        .poll_until_done()
        .await?;
    let properties = cluster.properties.unwrap_or_default();
    log::info!(
        "Created cluster {name}: Kubernetes {}, FQDN {}",
        properties.kubernetes_version.unwrap_or_default(),
        properties.fqdn.unwrap_or_default()
    );

    let credentials = clusters.list_cluster_admin_credentials(group, &name).await?;
    let admin = credentials
        .kubeconfigs
        .first()
        .context("cluster returned no admin kubeconfig")?;
    let kubeconfig = admin.kubeconfig()?;
    log::info!(
        "Fetched kubeconfig {} ({} lines)",
        admin.name,
        kubeconfig.lines().count()
    );

    let current = clusters.get(group, &name).await?;
    log::info!(
        "Cluster provisioning state: {}",
        current
            .properties
            .and_then(|p| p.provisioning_state)
            .unwrap_or_default()
    );
    Ok(())
}
