use crate::config::SampleConfig;
use crate::logger;
use anyhow::Context;
use sdk::auth::{TokenCredential, create_credential};
use sdk::model::tags;
use sdk::scenario::{SampleEnv, Scenario};
use sdk::ArmClient;
use std::process::ExitCode;
use std::sync::Arc;

/// Everything a sample needs once startup succeeded.
pub struct SampleContext {
    pub config: SampleConfig,
    pub env: SampleEnv,
    pub credential: Arc<dyn TokenCredential>,
    pub client: Arc<ArmClient>,
}

impl SampleContext {
    /// Builds the credential and ARM client from already loaded settings.
    pub fn new(config: SampleConfig, env: SampleEnv) -> anyhow::Result<Self> {
        let method = config.auth().method()?;
        let credential = create_credential(&method, config.auth().client_id())
            .context("Failed to create credential")?;
        let client = ArmClient::with_options(Arc::clone(&credential), config.client_options())
            .context("Failed to create ARM client")?;

        Ok(Self {
            config,
            env,
            credential,
            client: Arc::new(client),
        })
    }

    /// Scenario in this sample's resource group, tagged with the sample name.
    pub fn scenario(&self, sample: &str) -> Scenario {
        Scenario::new(
            Arc::clone(&self.client),
            &self.env,
            &self.config.resource_group_name(sample),
            self.config.location(),
        )
        .with_tags(tags([("sample", sample), ("createdBy", "arm-samples")]))
    }
}

/// Checks the sample's own variables, then builds the context.
pub fn prepare(
    config: SampleConfig,
    env: SampleEnv,
    required: &[&str],
) -> anyhow::Result<SampleContext> {
    env.ensure_present(required)
        .context("Missing required environment")?;
    SampleContext::new(config, env)
}

/// Loads configuration, installs the logger and authenticates.
///
/// Exits the process with status 1 when any of these fail.
pub fn bootstrap(sample: &str) -> SampleContext {
    bootstrap_requiring(sample, &[])
}

/// [`bootstrap`] for samples that need more than `AZURE_SUBSCRIPTION_ID`.
///
/// Exits with status 1 when any of `required` is unset.
pub fn bootstrap_requiring(sample: &str, required: &[&str]) -> SampleContext {
    let config = match SampleConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{sample}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = logger::setup_logger(config.logging()) {
        eprintln!("{sample}: failed to initialize logger: {e}");
        std::process::exit(1);
    }

    let context = SampleEnv::from_env()
        .context("Missing required environment")
        .and_then(|env| prepare(config, env, required));

    match context {
        Ok(context) => {
            log::info!(
                "Starting {sample} in subscription {}",
                context.env.subscription_id
            );
            context
        }
        Err(e) => {
            log::error!("{sample}: {e:#}");
            std::process::exit(1);
        }
    }
}

/// Folds the result of a step that runs after the scenario into `result`.
///
/// The scenario's own error wins; a failing follow-up is only logged then.
pub fn after_cleanup(
    result: anyhow::Result<()>,
    followup: anyhow::Result<()>,
) -> anyhow::Result<()> {
    match (result, followup) {
        (Ok(()), followup) => followup,
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(followup)) => {
            log::error!("Post-cleanup step also failed: {followup:#}");
            Err(e)
        }
    }
}

/// Logs the outcome and maps it to the process exit code.
pub fn finish(sample: &str, result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => {
            log::info!("{sample} completed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{sample} failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
