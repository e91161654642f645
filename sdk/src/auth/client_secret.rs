use super::oauth::{read_token_response, token_url};
use super::provider::TokenCredential;
use super::token_cache::TokenCache;
use super::types::{AccessToken, CredentialKind, DEFAULT_AUTHORITY_HOST};
use crate::common::{ArmError, ArmResult, HttpError};
use crate::utils::env::{
    AZURE_AUTHORITY_HOST, AZURE_CLIENT_ID, AZURE_CLIENT_SECRET, AZURE_TENANT_ID, EnvUtils,
};
use async_trait::async_trait;
use zeroize::Zeroizing;

/// Service principal credential using the OAuth2 client credentials grant.
///
/// # Examples
///
/// ```no_run
/// use sdk::auth::ClientSecretCredential;
///
/// // Reads AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET
/// let credential = ClientSecretCredential::from_env()?;
/// # Ok::<(), sdk::ArmError>(())
/// ```
#[derive(Clone)]
pub struct ClientSecretCredential {
    tenant_id: String,
    client_id: String,
    client_secret: Zeroizing<String>,
    authority_host: String,
    http_client: reqwest::Client,
    cache: TokenCache,
}

impl std::fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("authority_host", &self.authority_host)
            .finish_non_exhaustive()
    }
}

impl ClientSecretCredential {
    /// Creates a credential; all three values are required.
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> ArmResult<Self> {
        let tenant_id = tenant_id.into();
        let client_id = client_id.into();
        let client_secret = Zeroizing::new(client_secret.into());

        if tenant_id.trim().is_empty()
            || client_id.trim().is_empty()
            || client_secret.trim().is_empty()
        {
            return Err(ArmError::Configuration(
                "tenant_id, client_id, and client_secret are all required".to_string(),
            ));
        }

        Ok(Self {
            tenant_id,
            client_id,
            client_secret,
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            http_client: reqwest::Client::new(),
            cache: TokenCache::new(),
        })
    }

    /// Builds the credential from `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and
    /// `AZURE_CLIENT_SECRET`, honouring `AZURE_AUTHORITY_HOST`.
    pub fn from_env() -> ArmResult<Self> {
        let credential = Self::new(
            EnvUtils::get_validated_var(AZURE_TENANT_ID)?,
            EnvUtils::get_validated_var(AZURE_CLIENT_ID)?,
            EnvUtils::get_validated_var(AZURE_CLIENT_SECRET)?,
        )?;
        Ok(match EnvUtils::get_optional_var(AZURE_AUTHORITY_HOST) {
            Some(host) => credential.with_authority_host(host),
            None => credential,
        })
    }

    pub fn with_authority_host(mut self, authority_host: impl Into<String>) -> Self {
        self.authority_host = authority_host.into();
        self
    }

    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = http_client;
        self
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    async fn request_token(&self, scope: &str) -> ArmResult<AccessToken> {
        let url = token_url(&self.authority_host, &self.tenant_id);
        log::debug!("Requesting client credentials token for scope {scope}");

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", scope),
        ];

        let response = self
            .http_client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| HttpError::from_reqwest(&url, &e))?;

        read_token_response(response, "Client secret authentication failed").await
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn get_token(&self, scope: &str) -> ArmResult<AccessToken> {
        if let Some(token) = self.cache.get(scope).await {
            return Ok(token);
        }

        let token = self.request_token(scope).await?;
        self.cache.set(scope.to_string(), token.clone()).await;
        Ok(token)
    }

    fn kind(&self) -> CredentialKind {
        CredentialKind::ClientSecret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_values() {
        let result = ClientSecretCredential::new("tenant", "", "secret");
        assert!(matches!(result, Err(ArmError::Configuration(_))));
    }

    #[test]
    fn debug_output_hides_secret() {
        let credential = ClientSecretCredential::new("tenant", "client", "hunter2").unwrap();
        let debug = format!("{credential:?}");
        assert!(debug.contains("tenant"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn authority_host_override() {
        let credential = ClientSecretCredential::new("t", "c", "s")
            .unwrap()
            .with_authority_host("https://login.microsoftonline.us");
        assert_eq!(credential.authority_host, "https://login.microsoftonline.us");
        assert_eq!(credential.kind(), CredentialKind::ClientSecret);
    }
}
