//! Creates a storage account and a private container, then uploads, lists
//! and downloads a blob through an account SAS.

use anyhow::{Context, bail, ensure};
use arm_samples::{SampleContext, bootstrap, finish};
use sdk::dataplane::{AccountSasBuilder, BlobClient};
use sdk::model::{Sku, TrackedResource, tags};
use sdk::resources::storage::{BlobContainer, StorageAccountProperties, StorageAccountUpdate};
use sdk::resources::{BlobContainersClient, StorageAccountsClient};
use sdk::scenario::{Scenario, unique_name};
use std::process::ExitCode;

const SAMPLE: &str = "storage-blob";
const CONTAINER: &str = "samples";
const BLOB: &str = "hello/world.txt";
const CONTENT: &str = "Hello from the storage sample";

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
    let accounts = StorageAccountsClient::new(context.client.clone(), scenario.subscription_id());

    let name = unique_name("samplestore");
    let availability = accounts.check_name_availability(&name).await?;
    if !availability.name_available {
        bail!(
            "storage account name {name} is taken: {}",
            availability.message.unwrap_or_default()
        );
    }

    let account = TrackedResource::new(
        scenario.location(),
        StorageAccountProperties {
            minimum_tls_version: Some("TLS1_2".to_string()),
            allow_blob_public_access: Some(false),
            supports_https_traffic_only: Some(true),
            ..Default::default()
        },
    )
    .with_sku(Sku::named("Standard_LRS"))
    .with_kind("StorageV2");
    let account = accounts
        .begin_create(group, &name, &account)
        .await?
        .poll_until_done()
        .await?;
    log::info!(
        "Created storage account {name}, blob endpoint {}",
        account
            .properties
            .as_ref()
            .and_then(|p| p.primary_endpoints.as_ref())
            .and_then(|e| e.blob.as_deref())
            .unwrap_or("unknown")
    );

    let keys = accounts.list_keys(group, &name).await?;
    let key = keys.first().context("storage account returned no keys")?;
    log::info!("Using account key {}", key.key_name);

    let containers = BlobContainersClient::new(context.client.clone(), scenario.subscription_id());
    containers
        .create(group, &name, CONTAINER, &BlobContainer::private())
        .await?;
    log::info!("Created container {CONTAINER}");

    let sas = AccountSasBuilder::new(&name, &key.value, chrono::Duration::hours(1)).sign()?;
    let blobs = BlobClient::new(&name, &sas)?;
    blobs
        .upload(CONTAINER, BLOB, CONTENT.as_bytes().to_vec(), "text/plain")
        .await?;
    log::info!("Uploaded {BLOB}");

    let names = blobs.list_blobs(CONTAINER).await?;
    log::info!("Container {CONTAINER} holds {names:?}");

    let downloaded = blobs.download(CONTAINER, BLOB).await?;
    ensure!(
        downloaded == CONTENT.as_bytes(),
        "downloaded blob does not match the uploaded content"
    );
    log::info!("Downloaded {} bytes", downloaded.len());

    let update = StorageAccountUpdate {
        tags: Some(tags([("sample", SAMPLE), ("stage", "verified")])),
        ..Default::default()
    };
    let updated = accounts.update(group, &name, &update).await?;
    log::info!("Storage account tags: {:?}", updated.tags.unwrap_or_default());
    Ok(())
}
