//! Creates a logical SQL server with a firewall rule for Azure services and
//! a Basic database on it.

use arm_samples::{SampleContext, bootstrap, finish};
use sdk::model::{Sku, TrackedResource};
use sdk::resources::sql::{DatabaseProperties, FirewallRule, ServerProperties};
use sdk::resources::{FirewallRulesClient, SqlDatabasesClient, SqlServersClient};
use sdk::scenario::{Scenario, unique_name};
use std::process::ExitCode;
use zeroize::Zeroizing;

const SAMPLE: &str = "sql-database";
const ADMIN_LOGIN: &str = "sampleadmin";
const DATABASE: &str = "sampledb";
// 0.0.0.0 to 0.0.0.0 admits Azure services only
const AZURE_SERVICES_RULE: &str = "AllowAllWindowsAzureIps";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let context = bootstrap(SAMPLE);
    let result = context
        .scenario(SAMPLE)
        .run(|scenario| run(scenario, &context))
        .await;
    finish(SAMPLE, result)
}

/// Throwaway admin password meeting the server's complexity rules.
fn admin_password() -> Zeroizing<String> {
    Zeroizing::new(format!("Pw1!{}", unique_name("x")))
}

async fn run(scenario: Scenario, context: &SampleContext) -> anyhow::Result<()> {
    let group = scenario.resource_group();
    let subscription = scenario.subscription_id();
    let servers = SqlServersClient::new(context.client.clone(), subscription);
    let name = unique_name("samplesql");

    let password = admin_password();
    let server = TrackedResource::new(
        scenario.location(),
        ServerProperties::with_admin(ADMIN_LOGIN, &password),
    );
    let server = servers
        .begin_create_or_update(group, &name, &server)
        .await?
        .poll_until_done()
        .await?;
    log::info!(
        "Created SQL server {}",
        server
            .properties
            .as_ref()
            .and_then(|p| p.fully_qualified_domain_name.as_deref())
            .unwrap_or(name.as_str())
    );

    let rules = FirewallRulesClient::new(context.client.clone(), subscription);
    let rule = rules
        .create_or_update(
            group,
            &name,
            AZURE_SERVICES_RULE,
            &FirewallRule::range("0.0.0.0", "0.0.0.0"),
        )
        .await?;
    log::info!(
        "Created firewall rule {} ({} - {})",
        AZURE_SERVICES_RULE,
        rule.properties.start_ip_address,
        rule.properties.end_ip_address
    );

    let databases = SqlDatabasesClient::new(context.client.clone(), subscription);
    let database = TrackedResource::new(scenario.location(), DatabaseProperties::default())
        .with_sku(Sku::named("Basic"));
    databases
        .begin_create_or_update(group, &name, DATABASE, &database)
        .await?
        .poll_until_done()
        .await?;

    let database = databases.get(group, &name, DATABASE).await?;
    log::info!(
        "Database {DATABASE} is {}",
        database
            .properties
            .and_then(|p| p.status)
            .unwrap_or_else(|| "unknown".to_string())
    );

    let server = servers.get(group, &name).await?;
    log::info!(
        "Server state: {}",
        server.properties.and_then(|p| p.state).unwrap_or_default()
    );
    Ok(())
}
