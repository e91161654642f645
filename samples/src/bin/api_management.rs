//! Creates a Developer tier API Management service, publishes one API on
//! it and retags the service.

use anyhow::bail;
use arm_samples::{SampleContext, bootstrap, finish};
use sdk::model::{Sku, TagsPatch, TrackedResource, tags};
use sdk::resources::apimanagement::{ApiContract, ApiManagementServiceProperties};
use sdk::resources::{ApiManagementServiceClient, ApisClient};
use sdk::scenario::{Scenario, unique_name};
use std::process::ExitCode;

const SAMPLE: &str = "api-management";
const PUBLISHER_EMAIL: &str = "admin@contoso.com";
const PUBLISHER_NAME: &str = "Contoso";
const API_ID: &str = "echo-api";
const API_BACKEND: &str = "https://echoapi.cloudapp.net/api";

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
    let group = scenario.resource_group();
    let services = ApiManagementServiceClient::new(context.client.clone(), scenario.subscription_id());
    let name = unique_name("sampleapim");

    let availability = services.check_name_availability(&name).await?;
    if !availability.name_available {
        bail!(
            "API Management name {name} is taken: {}",
            availability.reason.unwrap_or_default()
        );
    }

    let service = TrackedResource::new(
        scenario.location(),
        ApiManagementServiceProperties {
            publisher_email: PUBLISHER_EMAIL.to_string(),
            publisher_name: PUBLISHER_NAME.to_string(),
            ..Default::default()
        },
    )
    .with_sku(Sku {
        name: "Developer".to_string(),
        capacity: Some(1),
        ..Default::default()
    });
    log::info!("Creating API Management service {name}, this can take over half an hour");
    let service = services
        .begin_create_or_update(group, &name, &service)
        .await?
        .poll_until_done()
        .await?;
    log::info!(
        "Created service {name}, gateway {}",
        service
            .properties
            .and_then(|p| p.gateway_url)
            .unwrap_or_default()
    );

    let apis = ApisClient::new(context.client.clone(), scenario.subscription_id());
    apis.begin_create_or_update(
        group,
        &name,
        API_ID,
        &ApiContract::https("Echo API", "echo", API_BACKEND),
    )
    .await?
    .poll_until_done()
    .await?;
    let api = apis.get(group, &name, API_ID).await?;
    log::info!(
        "Published API {} at /{}",
        api.properties.display_name,
        api.properties.path
    );

    let patch = TagsPatch::new(tags([("sample", SAMPLE), ("stage", "verified")]));
    let updated = services.update(group, &name, &patch).await?;
    log::info!("Service tags: {:?}", updated.tags.unwrap_or_default());
    Ok(())
}
