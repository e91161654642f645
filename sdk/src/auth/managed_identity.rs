use super::oauth::read_token_response;
use super::provider::TokenCredential;
use super::token_cache::TokenCache;
use super::types::{AccessToken, CredentialKind};
use crate::common::{ArmError, ArmResult, HttpError};
use crate::utils::env::{AZURE_CLIENT_ID, EnvUtils};
use async_trait::async_trait;
use std::time::Duration;

/// Azure Instance Metadata Service token endpoint.
pub const IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";

/// Credential for code running on an Azure host with a managed identity.
#[derive(Clone, Debug)]
pub struct ManagedIdentityCredential {
    endpoint: String,
    client_id: Option<String>,
    http_client: reqwest::Client,
    cache: TokenCache,
}

impl ManagedIdentityCredential {
    /// System-assigned identity, or the user-assigned identity named by
    /// `AZURE_CLIENT_ID` when set.
    pub fn new() -> ArmResult<Self> {
        // IMDS answers in milliseconds when present; a short connect timeout
        // keeps the default chain fast on machines without it.
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(1))
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| HttpError::ClientCreation {
                reason: e.to_string(),
            })?;

        Ok(Self {
            endpoint: IMDS_ENDPOINT.to_string(),
            client_id: EnvUtils::get_optional_var(AZURE_CLIENT_ID),
            http_client,
            cache: TokenCache::new(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_client_id(mut self, client_id: Option<String>) -> Self {
        self.client_id = client_id;
        self
    }

    async fn request_token(&self, scope: &str) -> ArmResult<AccessToken> {
        let resource = scope_to_resource(scope);
        let mut query = vec![("api-version", IMDS_API_VERSION), ("resource", resource)];
        if let Some(client_id) = self.client_id.as_deref() {
            query.push(("client_id", client_id));
        }

        let response = self
            .http_client
            .get(&self.endpoint)
            .header("Metadata", "true")
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                ArmError::CredentialUnavailable(format!(
                    "managed identity endpoint is unreachable: {e}"
                ))
            })?;

        match response.status().as_u16() {
            // 400 means IMDS exists but no identity is assigned to this host
            400 => Err(ArmError::CredentialUnavailable(
                "no managed identity is assigned to this host".to_string(),
            )),
            _ => read_token_response(response, "Managed identity authentication failed").await,
        }
    }
}

/// IMDS takes a resource URI rather than a v2 scope.
pub(crate) fn scope_to_resource(scope: &str) -> &str {
    scope.strip_suffix("/.default").unwrap_or(scope)
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    async fn get_token(&self, scope: &str) -> ArmResult<AccessToken> {
        if let Some(token) = self.cache.get(scope).await {
            return Ok(token);
        }

        let token = self.request_token(scope).await?;
        self.cache.set(scope.to_string(), token.clone()).await;
        Ok(token)
    }

    fn kind(&self) -> CredentialKind {
        CredentialKind::ManagedIdentity
    }
}
