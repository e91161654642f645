//! Resource group setup and cleanup shared by every sample.
//!
//! A sample creates a resource group, provisions into it, and deletes the
//! group at the end unless `KEEP_RESOURCE` is set. [`Scenario::run`] wraps
//! a sample body with those two steps and guarantees the cleanup runs even
//! when the body fails.

use crate::client::ArmClient;
use crate::common::{ArmError, ArmResult};
use crate::model::Tags;
use crate::resources::ResourceGroupsClient;
use crate::resources::resource_groups::ResourceGroup;
use crate::utils::env::{
    AZURE_CLIENT_ID, AZURE_CLIENT_SECRET, AZURE_OBJECT_ID, AZURE_SUBSCRIPTION_ID,
    AZURE_TENANT_ID, EnvUtils, EnvVarError, KEEP_RESOURCE,
};
use rand::Rng;
use std::ffi::OsString;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use zeroize::Zeroizing;

const NAME_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const NAME_SUFFIX_LEN: usize = 8;

/// Environment every sample reads at startup.
#[derive(Clone)]
pub struct SampleEnv {
    pub subscription_id: String,
    pub tenant_id: Option<String>,
    pub object_id: Option<String>,
    pub client_id: Option<String>,
    client_secret: Option<Zeroizing<String>>,
    /// `KEEP_RESOURCE` is set (to anything).
    pub keep_resources: bool,
}

impl std::fmt::Debug for SampleEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleEnv")
            .field("subscription_id", &self.subscription_id)
            .field("tenant_id", &self.tenant_id)
            .field("object_id", &self.object_id)
            .field("client_id", &self.client_id)
            .field("keep_resources", &self.keep_resources)
            .finish_non_exhaustive()
    }
}

impl SampleEnv {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Fails when `AZURE_SUBSCRIPTION_ID` is missing or empty.
    pub fn from_env() -> ArmResult<Self> {
        Self::from_lookup(|name| decode_var(name, std::env::var_os(name)))
    }

    /// Same as [`SampleEnv::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ArmResult<Self> {
        let subscription_id =
            EnvUtils::validate_value(AZURE_SUBSCRIPTION_ID, lookup(AZURE_SUBSCRIPTION_ID))?;
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            subscription_id,
            tenant_id: optional(AZURE_TENANT_ID),
            object_id: optional(AZURE_OBJECT_ID),
            client_id: optional(AZURE_CLIENT_ID),
            client_secret: optional(AZURE_CLIENT_SECRET).map(Zeroizing::new),
            keep_resources: lookup(KEEP_RESOURCE).is_some(),
        })
    }

    /// Fails on the first of `names` that is unset.
    ///
    /// Samples call this before any resource exists, so a missing variable
    /// stops the run without touching Azure.
    pub fn ensure_present(&self, names: &[&str]) -> ArmResult<()> {
        for &name in names {
            let present = match name {
                AZURE_SUBSCRIPTION_ID => true,
                AZURE_TENANT_ID => self.tenant_id.is_some(),
                AZURE_OBJECT_ID => self.object_id.is_some(),
                AZURE_CLIENT_ID => self.client_id.is_some(),
                AZURE_CLIENT_SECRET => self.client_secret.is_some(),
                other => {
                    return Err(ArmError::Configuration(format!(
                        "{other} is not a sample environment variable"
                    )));
                }
            };
            if !present {
                return Err(missing(name));
            }
        }
        Ok(())
    }

    pub fn require_tenant_id(&self) -> ArmResult<&str> {
        require(AZURE_TENANT_ID, &self.tenant_id)
    }

    pub fn require_object_id(&self) -> ArmResult<&str> {
        require(AZURE_OBJECT_ID, &self.object_id)
    }

    pub fn require_client_id(&self) -> ArmResult<&str> {
        require(AZURE_CLIENT_ID, &self.client_id)
    }

    pub fn require_client_secret(&self) -> ArmResult<&str> {
        self.client_secret
            .as_ref()
            .map(|s| s.as_str())
            .ok_or_else(|| missing(AZURE_CLIENT_SECRET))
    }
}

/// Non-Unicode values read as unset, except for `KEEP_RESOURCE` where
/// presence alone matters.
fn decode_var(name: &str, raw: Option<OsString>) -> Option<String> {
    match raw?.into_string() {
        Ok(value) => Some(value),
        Err(raw) if name == KEEP_RESOURCE => Some(raw.to_string_lossy().into_owned()),
        Err(_) => None,
    }
}

fn require<'a>(name: &str, value: &'a Option<String>) -> ArmResult<&'a str> {
    value.as_deref().ok_or_else(|| missing(name))
}

fn missing(name: &str) -> ArmError {
    ArmError::Environment(EnvVarError::NotFound {
        name: name.to_string(),
    })
}

/// `prefix` followed by a random lowercase alphanumeric suffix, for
/// resources whose names must be globally unique.
pub fn unique_name(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..NAME_SUFFIX_LEN)
        .map(|_| NAME_CHARSET[rng.gen_range(0..NAME_CHARSET.len())] as char)
        .collect();
    format!("{}{suffix}", prefix.to_ascii_lowercase())
}

/// One sample run against one resource group.
#[derive(Debug, Clone)]
pub struct Scenario {
    client: Arc<ArmClient>,
    groups: ResourceGroupsClient,
    subscription_id: String,
    resource_group: String,
    location: String,
    keep_resources: bool,
    tags: Tags,
}

impl Scenario {
    pub fn new(client: Arc<ArmClient>, env: &SampleEnv, resource_group: &str, location: &str) -> Self {
        Self {
            groups: ResourceGroupsClient::new(Arc::clone(&client), &env.subscription_id),
            client,
            subscription_id: env.subscription_id.clone(),
            resource_group: resource_group.to_string(),
            location: location.to_string(),
            keep_resources: env.keep_resources,
            tags: Tags::new(),
        }
    }

    /// Tags applied to the resource group on setup.
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    pub fn client(&self) -> &Arc<ArmClient> {
        &self.client
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    pub fn resource_group(&self) -> &str {
        &self.resource_group
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn keep_resources(&self) -> bool {
        self.keep_resources
    }

    /// Creates (or updates) the resource group.
    pub async fn setup(&self) -> ArmResult<ResourceGroup> {
        let group = ResourceGroup::new(&self.location).with_tags(self.tags.clone());
        let created = self
            .groups
            .create_or_update(&self.resource_group, &group)
            .await?;
        log::info!(
            "Created resource group {} in {}",
            self.resource_group,
            self.location
        );
        Ok(created)
    }

    /// Deletes the resource group and waits for the deletion to finish,
    /// unless resources are kept.
    pub async fn teardown(&self) -> ArmResult<()> {
        if self.keep_resources {
            log::info!(
                "{KEEP_RESOURCE} is set, leaving resource group {} in place",
                self.resource_group
            );
            return Ok(());
        }

        log::info!("Deleting resource group {}", self.resource_group);
        let mut poller = self.groups.begin_delete(&self.resource_group).await?;
        poller.poll_until_done().await?;
        log::info!("Deleted resource group {}", self.resource_group);
        Ok(())
    }

    /// `setup`, then `body`, then `teardown`.
    ///
    /// Teardown runs whether or not the body succeeds. A body error is
    /// returned after cleanup; a cleanup error is returned only when the body
    /// succeeded.
    pub async fn run<F, Fut, T, E>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce(Scenario) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<ArmError> + Display,
    {
        self.setup().await?;

        let outcome = body(self.clone()).await;
        if let Err(e) = &outcome {
            log::error!("Sample failed, cleaning up before exit: {e}");
        }

        match (outcome, self.teardown().await) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(cleanup)) => Err(cleanup.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(cleanup)) => {
                log::error!(
                    "Cleanup of resource group {} also failed: {cleanup}",
                    self.resource_group
                );
                Err(e)
            }
        }
    }
}
