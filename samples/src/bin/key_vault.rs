//! Creates a Key Vault with an access policy for `AZURE_OBJECT_ID`, stores
//! and reads a secret, then purges the soft-deleted vault after cleanup.

use anyhow::{Context, ensure};
use arm_samples::{SampleContext, after_cleanup, bootstrap_requiring, finish};
use sdk::dataplane::SecretClient;
use sdk::model::TrackedResource;
use sdk::resources::VaultsClient;
use sdk::resources::keyvault::{AccessPolicyEntry, VaultProperties};
use sdk::scenario::{Scenario, unique_name};
use sdk::utils::env::{AZURE_OBJECT_ID, AZURE_TENANT_ID};
use std::cell::Cell;
use std::process::ExitCode;

const SAMPLE: &str = "key-vault";
const SECRET_NAME: &str = "sample-secret";
const SECRET_VALUE: &str = "sample-secret-value";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let context = bootstrap_requiring(SAMPLE, &[AZURE_TENANT_ID, AZURE_OBJECT_ID]);
    let scenario = context.scenario(SAMPLE);
    let vault_name = unique_name("samplekv");
    let created = Cell::new(false);

    let mut result = scenario
        .run(|scenario| run(scenario, &context, &vault_name, &created))
        .await;

    // Deleting the group only soft-deletes the vault
    if created.get() && !scenario.keep_resources() {
        let purged = purge(&context, scenario.location(), &vault_name).await;
        result = after_cleanup(result, purged);
    }
    finish(SAMPLE, result)
}

async fn run(
    scenario: Scenario,
    context: &SampleContext,
    vault_name: &str,
    created: &Cell<bool>,
) -> anyhow::Result<()> {
    let tenant_id = context.env.require_tenant_id()?;
    let object_id = context.env.require_object_id()?;
    let vaults = VaultsClient::new(context.client.clone(), scenario.subscription_id());

    let vault = TrackedResource::new(
        scenario.location(),
        VaultProperties::standard(tenant_id, AccessPolicyEntry::secrets_manager(tenant_id, object_id)),
    );
    let mut poller = vaults
        .begin_create_or_update(scenario.resource_group(), vault_name, &vault)
        .await?;
    created.set(true);
    let vault = poller.poll_until_done().await?;
    let vault_uri = vault
        .properties
        .and_then(|p| p.vault_uri)
        .context("vault has no URI")?;
    log::info!("Created vault {vault_name} at {vault_uri}");

    let secrets = SecretClient::new(&vault_uri, context.credential.clone())?;
    let stored = secrets.set_secret(SECRET_NAME, SECRET_VALUE).await?;
    log::info!(
        "Stored secret {SECRET_NAME} version {}",
        stored.version().unwrap_or("unknown")
    );

    let fetched = secrets.get_secret(SECRET_NAME).await?;
    ensure!(fetched.value == SECRET_VALUE, "secret value did not round-trip");
    log::info!("Read back secret {SECRET_NAME}");

    let deleted = secrets.delete_secret(SECRET_NAME).await?;
    log::info!(
        "Deleted secret {SECRET_NAME}, recoverable as {}",
        deleted.recovery_id.unwrap_or_default()
    );
    Ok(())
}

async fn purge(context: &SampleContext, location: &str, vault_name: &str) -> anyhow::Result<()> {
    log::info!("Purging deleted vault {vault_name}");
    VaultsClient::new(context.client.clone(), &context.env.subscription_id)
        .begin_purge_deleted(location, vault_name)
        .await?
        .poll_until_done()
        .await?;
    log::info!("Purged vault {vault_name}");
    Ok(())
}
