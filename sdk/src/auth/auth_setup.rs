//! Credential creation from a configured authentication method.

use super::azure_cli::AzureCliCredential;
use super::client_secret::ClientSecretCredential;
use super::default::DefaultAzureCredential;
use super::device_code::DeviceCodeCredential;
use super::managed_identity::ManagedIdentityCredential;
use super::provider::TokenCredential;
use crate::common::{ArmError, ArmResult};
use crate::utils::env::{AZURE_TENANT_ID, EnvUtils};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;

/// Authentication method selected by configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    #[default]
    Default,
    ClientSecret,
    Cli,
    ManagedIdentity,
    DeviceCode,
}

impl FromStr for AuthMethod {
    type Err = ArmError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "" | "default" => Ok(AuthMethod::Default),
            "client_secret" => Ok(AuthMethod::ClientSecret),
            "cli" | "azure_cli" => Ok(AuthMethod::Cli),
            "managed_identity" => Ok(AuthMethod::ManagedIdentity),
            "device_code" => Ok(AuthMethod::DeviceCode),
            other => Err(ArmError::Configuration(format!(
                "Unknown authentication method '{other}'. Expected one of: default, client_secret, cli, managed_identity, device_code"
            ))),
        }
    }
}

/// Creates the credential for `method`.
///
/// `device_code_client_id` is the public client application used by the
/// device code flow; the other methods ignore it.
///
/// # Errors
///
/// Returns [`ArmError::Configuration`] or [`ArmError::Environment`] when the
/// values the method needs are missing.
pub fn create_credential(
    method: &AuthMethod,
    device_code_client_id: Option<&str>,
) -> ArmResult<Arc<dyn TokenCredential>> {
    let credential: Arc<dyn TokenCredential> = match method {
        AuthMethod::Default => Arc::new(DefaultAzureCredential::new()?),
        AuthMethod::ClientSecret => Arc::new(ClientSecretCredential::from_env()?),
        AuthMethod::Cli => Arc::new(
            AzureCliCredential::new().with_tenant_id(EnvUtils::get_optional_var(AZURE_TENANT_ID)),
        ),
        AuthMethod::ManagedIdentity => Arc::new(ManagedIdentityCredential::new()?),
        AuthMethod::DeviceCode => {
            let client_id = device_code_client_id.ok_or_else(|| {
                ArmError::Configuration(
                    "Device code authentication requires auth.client_id".to_string(),
                )
            })?;
            let tenant_id = EnvUtils::get_validated_var(AZURE_TENANT_ID)?;
            Arc::new(DeviceCodeCredential::new(tenant_id, client_id)?)
        }
    };

    log::debug!("Using {} for authentication", credential.kind());
    Ok(credential)
}
