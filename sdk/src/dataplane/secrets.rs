use super::{build_http_client, execute};
use crate::auth::TokenCredential;
use crate::client::read_json;
use crate::common::{ArmError, ArmResult, RetryOptions};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use zeroize::Zeroize;

const API_VERSION: &str = "7.4";
const VAULT_SCOPE: &str = "https://vault.azure.net/.default";

#[derive(Clone, Default, Deserialize, PartialEq)]
pub struct Secret {
    /// `https://{vault}.vault.azure.net/secrets/{name}/{version}`
    pub id: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, rename = "contentType")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub attributes: SecretAttributes,
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("id", &self.id)
            .field("content_type", &self.content_type)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

impl Secret {
    /// Version segment of the secret ID.
    pub fn version(&self) -> Option<&str> {
        self.id.rsplit('/').next().filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SecretAttributes {
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Unix seconds.
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub updated: Option<i64>,
    #[serde(default, rename = "recoveryLevel")]
    pub recovery_level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeletedSecret {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub recovery_id: Option<String>,
    #[serde(default)]
    pub scheduled_purge_date: Option<i64>,
    #[serde(default)]
    pub deleted_date: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SetSecretRequest<'a> {
    value: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<&'a str>,
}

/// Key Vault secrets client.
///
/// Uses the same credential as the ARM client but requests tokens for the
/// Key Vault audience.
#[derive(Clone)]
pub struct SecretClient {
    http: reqwest::Client,
    vault_url: String,
    credential: Arc<dyn TokenCredential>,
    retry: RetryOptions,
}

impl std::fmt::Debug for SecretClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretClient")
            .field("vault_url", &self.vault_url)
            .field("credential", &self.credential.kind())
            .finish_non_exhaustive()
    }
}

impl SecretClient {
    /// `vault_url` is the vault's `properties.vaultUri`.
    pub fn new(vault_url: &str, credential: Arc<dyn TokenCredential>) -> ArmResult<Self> {
        Ok(Self {
            http: build_http_client()?,
            vault_url: vault_url.trim_end_matches('/').to_string(),
            credential,
            retry: RetryOptions::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryOptions) -> Self {
        self.retry = retry;
        self
    }

    fn url(&self, name: &str) -> String {
        format!(
            "{}/secrets/{}?api-version={API_VERSION}",
            self.vault_url,
            urlencoding::encode(name)
        )
    }

    async fn authorization(&self) -> ArmResult<String> {
        Ok(self.credential.get_token(VAULT_SCOPE).await?.authorization())
    }

    /// Creates the secret or adds a new version of it.
    pub async fn set_secret(&self, name: &str, value: &str) -> ArmResult<Secret> {
        let body = serde_json::to_vec(&SetSecretRequest {
            value,
            content_type: None,
        })
        .map_err(|e| ArmError::deserialize("secrets.set", e))?;
        let request = self
            .http
            .put(self.url(name))
            .header(AUTHORIZATION, self.authorization().await?)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        let response = execute("secrets.set", request, &self.retry).await?;
        read_json("secrets.set", response).await
    }

    /// Latest version of the secret.
    pub async fn get_secret(&self, name: &str) -> ArmResult<Secret> {
        let request = self
            .http
            .get(self.url(name))
            .header(AUTHORIZATION, self.authorization().await?);
        let response = execute("secrets.get", request, &self.retry).await?;
        read_json("secrets.get", response).await
    }

    pub async fn delete_secret(&self, name: &str) -> ArmResult<DeletedSecret> {
        let request = self
            .http
            .delete(self.url(name))
            .header(AUTHORIZATION, self.authorization().await?);
        let response = execute("secrets.delete", request, &self.retry).await?;
        read_json("secrets.delete", response).await
    }
}
