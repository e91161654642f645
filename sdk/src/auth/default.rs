use super::azure_cli::AzureCliCredential;
use super::client_secret::ClientSecretCredential;
use super::managed_identity::ManagedIdentityCredential;
use super::provider::TokenCredential;
use super::types::{AccessToken, CredentialKind};
use crate::common::{ArmError, ArmResult};
use crate::utils::env::{AZURE_TENANT_ID, EnvUtils};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Tries environment, managed identity and Azure CLI credentials in order.
///
/// Only sources that report [`ArmError::CredentialUnavailable`] pass on to
/// the next one; any other failure ends the chain. The first credential
/// that returns a token is remembered and used for every later request.
pub struct DefaultAzureCredential {
    sources: Vec<Arc<dyn TokenCredential>>,
    skipped: Vec<String>,
    selected: RwLock<Option<usize>>,
}

impl DefaultAzureCredential {
    pub fn new() -> ArmResult<Self> {
        let mut sources: Vec<Arc<dyn TokenCredential>> = Vec::new();
        let mut skipped = Vec::new();

        match ClientSecretCredential::from_env() {
            Ok(credential) => sources.push(Arc::new(credential)),
            Err(e) => skipped.push(format!("EnvironmentCredential: {e}")),
        }
        sources.push(Arc::new(ManagedIdentityCredential::new()?));
        sources.push(Arc::new(
            AzureCliCredential::new().with_tenant_id(EnvUtils::get_optional_var(AZURE_TENANT_ID)),
        ));

        Ok(Self {
            sources,
            skipped,
            selected: RwLock::new(None),
        })
    }

    /// Chain over explicit sources, tried in the given order.
    pub fn with_sources(sources: Vec<Arc<dyn TokenCredential>>) -> Self {
        Self {
            sources,
            skipped: Vec::new(),
            selected: RwLock::new(None),
        }
    }

    /// Kind of the credential that produced the last token, if any.
    pub async fn selected_kind(&self) -> Option<CredentialKind> {
        let selected = *self.selected.read().await;
        selected.map(|index| self.sources[index].kind())
    }
}

#[async_trait]
impl TokenCredential for DefaultAzureCredential {
    async fn get_token(&self, scope: &str) -> ArmResult<AccessToken> {
        let selected = *self.selected.read().await;
        if let Some(index) = selected {
            return self.sources[index].get_token(scope).await;
        }

        let mut failures = self.skipped.clone();
        for (index, source) in self.sources.iter().enumerate() {
            match source.get_token(scope).await {
                Ok(token) => {
                    log::info!("Authenticated with {}", source.kind());
                    *self.selected.write().await = Some(index);
                    return Ok(token);
                }
                Err(e @ ArmError::CredentialUnavailable(_)) => {
                    log::debug!("{} did not provide a token: {e}", source.kind());
                    failures.push(format!("{}: {e}", source.kind()));
                }
                // A configured credential that was rejected must not fall
                // through to another identity
                Err(e) => {
                    log::error!("{} failed to authenticate: {e}", source.kind());
                    return Err(e);
                }
            }
        }

        Err(ArmError::CredentialUnavailable(format!(
            "DefaultAzureCredential failed to retrieve a token. Attempts: {}",
            failures.join("; ")
        )))
    }

    fn kind(&self) -> CredentialKind {
        CredentialKind::Default
    }
}
