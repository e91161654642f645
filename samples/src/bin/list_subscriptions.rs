//! Lists the subscriptions the credential can see and the regions available
//! to `AZURE_SUBSCRIPTION_ID`.

use arm_samples::{SampleContext, bootstrap, finish};
use futures::TryStreamExt;
use sdk::resources::SubscriptionsClient;
use std::process::ExitCode;

const SAMPLE: &str = "list-subscriptions";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let context = bootstrap(SAMPLE);
    finish(SAMPLE, run(&context).await)
}

async fn run(context: &SampleContext) -> anyhow::Result<()> {
    let subscriptions = SubscriptionsClient::new(context.client.clone());

    let mut stream = Box::pin(subscriptions.list().into_stream());
    let mut count = 0;
    while let Some(subscription) = stream.try_next().await? {
        count += 1;
        log::info!(
            "Subscription {} ({}): {}",
            subscription.display_name,
            subscription.subscription_id,
            subscription.state
        );
    }
    log::info!("Found {count} subscriptions");

    let current = subscriptions.get(&context.env.subscription_id).await?;
    log::info!("Using subscription {}", current.display_name);

    let locations = subscriptions
        .list_locations(&context.env.subscription_id)
        .await?;
    for location in &locations {
        log::info!("Location {} ({})", location.name, location.display_name);
    }
    log::info!("{} locations available", locations.len());
    Ok(())
}
