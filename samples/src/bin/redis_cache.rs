//! Creates a Basic C0 Redis cache, reads its access keys and tightens its
//! TLS settings.

use anyhow::{bail, ensure};
use arm_samples::{SampleContext, bootstrap, finish};
use sdk::model::{TrackedResource, tags};
use sdk::resources::RedisClient;
use sdk::resources::redis::{RedisProperties, RedisUpdateParameters, RedisUpdateProperties};
use sdk::scenario::{Scenario, unique_name};
use std::process::ExitCode;

const SAMPLE: &str = "redis-cache";

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
    let caches = RedisClient::new(context.client.clone(), scenario.subscription_id());

    let name = unique_name("sampleredis");
    if !caches.check_name_availability(&name).await? {
        bail!("Redis name {name} is taken");
    }

    let cache = TrackedResource::new(scenario.location(), RedisProperties::basic_c0());
    let cache = caches
        .begin_create(group, &name, &cache)
        .await?
        .poll_until_done()
        .await?;
    let properties = cache.properties.as_ref();
    log::info!(
        "Created cache {name} at {}:{}",
        properties
            .and_then(|p| p.host_name.as_deref())
            .unwrap_or("unknown"),
        properties.and_then(|p| p.ssl_port).unwrap_or_default()
    );

    let keys = caches.list_keys(group, &name).await?;
    ensure!(!keys.primary_key.is_empty(), "primary key is empty");
    log::info!("Listed access keys");

    let update = RedisUpdateParameters {
        tags: Some(tags([("sample", SAMPLE)])),
        properties: Some(RedisUpdateProperties {
            enable_non_ssl_port: Some(false),
            minimum_tls_version: Some("1.2".to_string()),
        }),
    };
    let updated = caches.update(group, &name, &update).await?;
    log::info!("Cache tags: {:?}", updated.tags.unwrap_or_default());

    let current = caches.get(group, &name).await?;
    log::info!(
        "Cache provisioning state: {}",
        current
            .properties
            .and_then(|p| p.provisioning_state)
            .unwrap_or_default()
    );
    Ok(())
}
