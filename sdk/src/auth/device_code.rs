use super::oauth::{OAuthErrorResponse, describe_error, token_url};
use super::provider::TokenCredential;
use super::token_cache::TokenCache;
use super::types::{AccessToken, CredentialKind, DEFAULT_AUTHORITY_HOST, DeviceCodeInfo};
use crate::common::{ArmError, ArmResult, HttpError};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Callback that shows the sign-in instructions to the user.
pub type DeviceCodePrompt = Arc<dyn Fn(&DeviceCodeInfo) + Send + Sync>;

#[derive(Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: u64,
    interval: u64,
    message: String,
}

/// Interactive credential using the OAuth2 device authorization grant.
///
/// Not part of [`super::DefaultAzureCredential`]; samples select it through
/// configuration when no service principal is available.
#[derive(Clone)]
pub struct DeviceCodeCredential {
    tenant_id: String,
    client_id: String,
    authority_host: String,
    http_client: reqwest::Client,
    cache: TokenCache,
    prompt: DeviceCodePrompt,
}

impl DeviceCodeCredential {
    pub fn new(tenant_id: impl Into<String>, client_id: impl Into<String>) -> ArmResult<Self> {
        let tenant_id = tenant_id.into();
        let client_id = client_id.into();
        if tenant_id.trim().is_empty() {
            return Err(ArmError::Configuration(
                "Device code authentication requires a tenant_id".to_string(),
            ));
        }
        if client_id.trim().is_empty() {
            return Err(ArmError::Configuration(
                "Device code authentication requires a client_id".to_string(),
            ));
        }

        Ok(Self {
            tenant_id,
            client_id,
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            http_client: reqwest::Client::new(),
            cache: TokenCache::new(),
            prompt: Arc::new(|info: &DeviceCodeInfo| eprintln!("{}", info.message)),
        })
    }

    pub fn with_authority_host(mut self, authority_host: impl Into<String>) -> Self {
        self.authority_host = authority_host.into();
        self
    }

    /// Replaces the default prompt, which prints the message to stderr.
    pub fn with_prompt(mut self, prompt: DeviceCodePrompt) -> Self {
        self.prompt = prompt;
        self
    }

    fn device_code_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/devicecode",
            self.authority_host.trim_end_matches('/'),
            self.tenant_id
        )
    }

    async fn start(&self, scope: &str) -> ArmResult<DeviceCodeResponse> {
        let url = self.device_code_url();
        let params = [("client_id", self.client_id.as_str()), ("scope", scope)];

        let response = self
            .http_client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| HttpError::from_reqwest(&url, &e))?;

        if !response.status().is_success() {
            let error = response
                .json::<OAuthErrorResponse>()
                .await
                .unwrap_or_default();
            return Err(ArmError::Authentication(format!(
                "Device code flow could not start: {}",
                describe_error(&error)
            )));
        }

        response.json().await.map_err(|e| {
            ArmError::Authentication(format!("Failed to parse device code response: {e}"))
        })
    }

    async fn poll(&self, device: &DeviceCodeResponse) -> ArmResult<AccessToken> {
        let url = token_url(&self.authority_host, &self.tenant_id);
        let mut interval = Duration::from_secs(device.interval.max(1));
        let timeout = Duration::from_secs(device.expires_in);
        let start = Instant::now();

        loop {
            if start.elapsed() > timeout {
                return Err(ArmError::Authentication(
                    "The device code has expired. Please restart the authentication process."
                        .to_string(),
                ));
            }

            tokio::time::sleep(interval).await;

            let params = [
                ("grant_type", "urn:ietf:params:oauth:grant-type:device_code"),
                ("client_id", self.client_id.as_str()),
                ("device_code", device.device_code.as_str()),
            ];

            let response = self
                .http_client
                .post(&url)
                .form(&params)
                .send()
                .await
                .map_err(|e| HttpError::from_reqwest(&url, &e))?;

            if response.status().is_success() {
                let token: super::types::TokenResponse = response.json().await.map_err(|e| {
                    ArmError::Authentication(format!("Failed to parse token response: {e}"))
                })?;
                return Ok(token.into());
            }

            let error: OAuthErrorResponse = response.json().await.unwrap_or_default();
            match error.error.as_str() {
                "authorization_pending" => {
                    log::debug!("Waiting for user to complete authentication");
                }
                "slow_down" => {
                    log::debug!("Polling too frequently, increasing interval");
                    interval += Duration::from_secs(5);
                }
                _ => {
                    return Err(ArmError::Authentication(format!(
                        "Device code authentication failed: {}",
                        describe_error(&error)
                    )));
                }
            }
        }
    }
}

#[async_trait]
impl TokenCredential for DeviceCodeCredential {
    async fn get_token(&self, scope: &str) -> ArmResult<AccessToken> {
        if let Some(token) = self.cache.get(scope).await {
            return Ok(token);
        }

        let device = self.start(scope).await?;
        (self.prompt)(&DeviceCodeInfo {
            user_code: device.user_code.clone(),
            verification_uri: device.verification_uri.clone(),
            message: device.message.clone(),
        });
        log::info!("Device code authentication initiated - awaiting user action");

        let token = self.poll(&device).await?;
        self.cache.set(scope.to_string(), token.clone()).await;
        Ok(token)
    }

    fn kind(&self) -> CredentialKind {
        CredentialKind::DeviceCode
    }
}
