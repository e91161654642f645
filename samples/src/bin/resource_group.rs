//! Creates a resource group, reads it back, updates its tags and lists it
//! alongside the other groups in the subscription.

use anyhow::ensure;
use arm_samples::{SampleContext, bootstrap, finish};
use sdk::model::tags;
use sdk::resources::ResourceGroupsClient;
use sdk::scenario::Scenario;
use std::process::ExitCode;

const SAMPLE: &str = "resource-group";

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
    let groups = ResourceGroupsClient::new(context.client.clone(), scenario.subscription_id());
    let name = scenario.resource_group();

    let group = groups.get(name).await?;
    log::info!(
        "Resource group {} is {}",
        group.id.as_deref().unwrap_or(name),
        group.provisioning_state().unwrap_or("unknown")
    );

    ensure!(
        groups.check_existence(name).await?,
        "resource group {name} should exist after creation"
    );

    let updated = groups
        .update(name, tags([("sample", SAMPLE), ("stage", "updated")]))
        .await?;
    log::info!("Updated tags: {:?}", updated.tags);

    let all = groups.list().collect_all().await?;
    log::info!("Subscription has {} resource groups", all.len());

    let resources = groups.list_resources(name).collect_all().await?;
    log::info!("{name} contains {} resources", resources.len());
    Ok(())
}
