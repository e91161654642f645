//! Creates a Cosmos DB account with one SQL database, reads its keys and
//! retags it.

use anyhow::ensure;
use arm_samples::{SampleContext, bootstrap, finish};
use sdk::model::{TagsPatch, TrackedResource, tags};
use sdk::resources::cosmosdb::{DatabaseAccountProperties, SqlDatabase};
use sdk::resources::{DatabaseAccountsClient, SqlResourcesClient};
use sdk::scenario::{Scenario, unique_name};
use std::process::ExitCode;

const SAMPLE: &str = "cosmos-db";
const DATABASE: &str = "samples";

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
    let accounts = DatabaseAccountsClient::new(context.client.clone(), scenario.subscription_id());
    let name = unique_name("samplecosmos");

    // Account creation regularly runs for several minutes
    let account = TrackedResource::new(
        scenario.location(),
        DatabaseAccountProperties::single_region(scenario.location()),
    )
    .with_kind("GlobalDocumentDB");
    let account = accounts
        .begin_create_or_update(group, &name, &account)
        .await?
        .poll_until_done()
        .await?;
    log::info!(
        "Created Cosmos DB account {name}, endpoint {}",
        account
            .properties
            .as_ref()
            .and_then(|p| p.document_endpoint.as_deref())
            .unwrap_or("unknown")
    );

    let sql = SqlResourcesClient::new(context.client.clone(), scenario.subscription_id());
    let database = sql
        .begin_create_update_sql_database(group, &name, DATABASE, &SqlDatabase::named(DATABASE))
        .await?
        .poll_until_done()
        .await?;
    log::info!("Created SQL database {}", database.properties.resource.id);

    let fetched = sql.get_sql_database(group, &name, DATABASE).await?;
    ensure!(
        fetched.properties.resource.id == DATABASE,
        "unexpected database id {}",
        fetched.properties.resource.id
    );

    let keys = accounts.list_keys(group, &name).await?;
    ensure!(!keys.primary_master_key.is_empty(), "primary key is empty");
    log::info!("Listed account keys");

    let patch = TagsPatch::new(tags([("sample", SAMPLE), ("stage", "verified")]));
    let updated = accounts
        .begin_update(group, &name, &patch)
        .await?
        .poll_until_done()
        .await?;
    log::info!("Account tags: {:?}", updated.tags.unwrap_or_default());

    let current = accounts.get(group, &name).await?;
    log::info!(
        "Account provisioning state: {}",
        current
            .properties
            .and_then(|p| p.provisioning_state)
            .unwrap_or_default()
    );
    Ok(())
}
