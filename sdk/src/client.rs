//! Authenticated HTTP pipeline for Azure Resource Manager.
//!
//! Every typed client in [`crate::resources`] goes through [`ArmClient`],
//! which attaches a bearer token, throttles and retries the request, and
//! turns error responses into [`ArmError::Api`].

use crate::auth::TokenCredential;
use crate::common::errors::error_from_response;
use crate::common::retry::{is_retryable_status, parse_retry_after};
use crate::common::{ArmError, ArmResult, HttpError, RateLimiter, RetryOptions};
use crate::lro::{LroMethod, NoContent, Poller};
use crate::pager::Pager;
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Public cloud Resource Manager endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

const DEFAULT_POLL_FREQUENCY: Duration = Duration::from_secs(10);
const DEFAULT_REQUESTS_PER_SECOND: u32 = 20;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Tunables for [`ArmClient`].
#[derive(Debug, Clone)]
pub struct ArmClientOptions {
    /// Resource Manager endpoint; also determines the token scope.
    pub endpoint: String,
    pub retry: RetryOptions,
    /// Interval between LRO status checks when the service sends no `Retry-After`.
    pub poll_frequency: Duration,
    pub requests_per_second: u32,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ArmClientOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            retry: RetryOptions::default(),
            poll_frequency: DEFAULT_POLL_FREQUENCY,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// A single logical request; retries resend it unchanged.
#[derive(Debug, Clone)]
pub struct ArmRequest {
    operation: String,
    method: Method,
    url: String,
    body: Option<Vec<u8>>,
    headers: Vec<(&'static str, String)>,
}

impl ArmRequest {
    /// `operation` names the call in logs and errors, e.g. `storage_accounts.get`.
    pub fn new(operation: &str, method: Method, url: impl Into<String>) -> Self {
        Self {
            operation: operation.to_string(),
            method,
            url: url.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ArmResult<Self> {
        let bytes = serde_json::to_vec(body).map_err(|e| ArmError::deserialize(&self.operation, e))?;
        self.body = Some(bytes);
        Ok(self)
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Resource Manager client shared by all typed resource clients.
pub struct ArmClient {
    http: reqwest::Client,
    credential: Arc<dyn TokenCredential>,
    options: ArmClientOptions,
    limiter: RateLimiter,
}

impl std::fmt::Debug for ArmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmClient")
            .field("credential", &self.credential.kind())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ArmClient {
    pub fn new(credential: Arc<dyn TokenCredential>) -> ArmResult<Self> {
        Self::with_options(credential, ArmClientOptions::default())
    }

    pub fn with_options(
        credential: Arc<dyn TokenCredential>,
        mut options: ArmClientOptions,
    ) -> ArmResult<Self> {
        options.endpoint = options.endpoint.trim_end_matches('/').to_string();

        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(concat!("arm-samples-sdk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::ClientCreation {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            credential,
            limiter: RateLimiter::new(options.requests_per_second),
            options,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.options.endpoint
    }

    pub fn poll_frequency(&self) -> Duration {
        self.options.poll_frequency
    }

    /// Token scope for this endpoint, e.g. `https://management.azure.com/.default`.
    pub fn scope(&self) -> String {
        format!("{}/.default", self.options.endpoint)
    }

    /// `{endpoint}/subscriptions/{subscription_id}{suffix}`
    pub fn subscription_url(&self, subscription_id: &str, suffix: &str) -> String {
        format!(
            "{}/subscriptions/{}{}",
            self.options.endpoint,
            urlencoding::encode(subscription_id),
            suffix
        )
    }

    /// `{endpoint}/subscriptions/{subscription_id}/resourceGroups/{resource_group}{suffix}`
    pub fn resource_group_url(
        &self,
        subscription_id: &str,
        resource_group: &str,
        suffix: &str,
    ) -> String {
        let path = format!("/resourceGroups/{}{}", urlencoding::encode(resource_group), suffix);
        self.subscription_url(subscription_id, &path)
    }

    /// Sends `request`, retrying throttled and transient failures.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Api`] for a non-success status that is not retried
    /// (or still fails after the last retry), [`ArmError::Http`] for
    /// transport failures, and any error the credential reports.
    pub async fn send(&self, request: &ArmRequest) -> ArmResult<reqwest::Response> {
        let scope = self.scope();
        let retry = &self.options.retry;
        let mut attempt = 0;

        loop {
            self.limiter.acquire().await;
            let token = self.credential.get_token(&scope).await?;

            let mut builder = self
                .http
                .request(request.method.clone(), &request.url)
                .header(AUTHORIZATION, token.authorization())
                .header("x-ms-client-request-id", Uuid::new_v4().to_string());
            for (name, value) in &request.headers {
                builder = builder.header(*name, value);
            }
            if let Some(body) = &request.body {
                builder = builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(body.clone());
            }

            log::debug!("{} {} ({})", request.method, request.url, request.operation);

            match builder.send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status().as_u16();
                    if is_retryable_status(status) && attempt < retry.max_retries {
                        let delay = retry.backoff(attempt, parse_retry_after(response.headers()));
                        log::warn!(
                            "{} returned HTTP {status}, retrying in {delay:?} (attempt {}/{})",
                            request.operation,
                            attempt + 1,
                            retry.max_retries
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(error_from_response(&request.operation, response).await);
                }
                Err(e) => {
                    if (e.is_connect() || e.is_timeout()) && attempt < retry.max_retries {
                        let delay = retry.backoff(attempt, None);
                        log::warn!(
                            "{} failed to reach the service, retrying in {delay:?}: {e}",
                            request.operation
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(HttpError::from_reqwest(&request.url, &e).into());
                }
            }
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, operation: &str, url: &str) -> ArmResult<T> {
        let request = ArmRequest::new(operation, Method::GET, url);
        let response = self.send(&request).await?;
        read_json(operation, response).await
    }

    pub async fn put_json<B, T>(&self, operation: &str, url: &str, body: &B) -> ArmResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ArmRequest::new(operation, Method::PUT, url).json(body)?;
        let response = self.send(&request).await?;
        read_json(operation, response).await
    }

    pub async fn patch_json<B, T>(&self, operation: &str, url: &str, body: &B) -> ArmResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ArmRequest::new(operation, Method::PATCH, url).json(body)?;
        let response = self.send(&request).await?;
        read_json(operation, response).await
    }

    pub async fn post_json<B, T>(&self, operation: &str, url: &str, body: &B) -> ArmResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ArmRequest::new(operation, Method::POST, url).json(body)?;
        let response = self.send(&request).await?;
        read_json(operation, response).await
    }

    /// POST with an empty JSON object, as used by `listKeys`-style actions.
    pub async fn post_empty<T: DeserializeOwned>(&self, operation: &str, url: &str) -> ArmResult<T> {
        self.post_json(operation, url, &serde_json::json!({})).await
    }

    pub async fn delete(&self, operation: &str, url: &str) -> ArmResult<()> {
        self.send(&ArmRequest::new(operation, Method::DELETE, url))
            .await
            .map(|_| ())
    }

    /// HEAD request; `404` means the resource does not exist.
    pub async fn head_exists(&self, operation: &str, url: &str) -> ArmResult<bool> {
        match self.send(&ArmRequest::new(operation, Method::HEAD, url)).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Sends the initial request of a long-running operation.
    pub async fn begin<T: DeserializeOwned>(
        self: &Arc<Self>,
        method: LroMethod,
        request: ArmRequest,
    ) -> ArmResult<Poller<T>> {
        let response = self.send(&request).await?;
        Poller::from_response(
            Arc::clone(self),
            request.operation,
            method,
            request.url,
            response,
        )
        .await
    }

    pub async fn begin_put<B, T>(
        self: &Arc<Self>,
        operation: &str,
        url: &str,
        body: &B,
    ) -> ArmResult<Poller<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ArmRequest::new(operation, Method::PUT, url).json(body)?;
        self.begin(LroMethod::Put, request).await
    }

    pub async fn begin_patch<B, T>(
        self: &Arc<Self>,
        operation: &str,
        url: &str,
        body: &B,
    ) -> ArmResult<Poller<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ArmRequest::new(operation, Method::PATCH, url).json(body)?;
        self.begin(LroMethod::Patch, request).await
    }

    pub async fn begin_post<B, T>(
        self: &Arc<Self>,
        operation: &str,
        url: &str,
        body: &B,
    ) -> ArmResult<Poller<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ArmRequest::new(operation, Method::POST, url).json(body)?;
        self.begin(LroMethod::Post, request).await
    }

    pub async fn begin_delete(
        self: &Arc<Self>,
        operation: &str,
        url: &str,
    ) -> ArmResult<Poller<NoContent>> {
        self.begin(LroMethod::Delete, ArmRequest::new(operation, Method::DELETE, url))
            .await
    }

    /// Pager over a list endpoint that follows `nextLink`.
    pub fn pager<T: DeserializeOwned>(self: &Arc<Self>, operation: &str, url: &str) -> Pager<T> {
        Pager::new(Arc::clone(self), operation, url)
    }
}

/// Reads a JSON body; an empty body deserializes as `null`.
pub(crate) async fn read_json<T: DeserializeOwned>(
    operation: &str,
    response: reqwest::Response,
) -> ArmResult<T> {
    let url = response.url().to_string();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| HttpError::from_reqwest(&url, &e))?;
    parse_json(operation, &bytes)
}

pub(crate) fn parse_json<T: DeserializeOwned>(operation: &str, bytes: &[u8]) -> ArmResult<T> {
    let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        bytes
    };
    serde_json::from_slice(bytes).map_err(|e| ArmError::deserialize(operation, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccessToken, CredentialKind};
    use async_trait::async_trait;

    struct Fixed;

    #[async_trait]
    impl TokenCredential for Fixed {
        async fn get_token(&self, _scope: &str) -> ArmResult<AccessToken> {
            Ok(AccessToken::expiring_in(
                "t".to_string(),
                "Bearer".to_string(),
                3600,
            ))
        }

        fn kind(&self) -> CredentialKind {
            CredentialKind::ClientSecret
        }
    }

    fn client(endpoint: &str) -> ArmClient {
        let options = ArmClientOptions {
            endpoint: endpoint.to_string(),
            ..Default::default()
        };
        ArmClient::with_options(Arc::new(Fixed), options).unwrap()
    }

    #[test]
    fn builds_urls_with_encoded_segments() {
        let client = client("https://management.azure.com/");
        assert_eq!(client.endpoint(), "https://management.azure.com");
        assert_eq!(client.scope(), "https://management.azure.com/.default");
        assert_eq!(
            client.subscription_url("sub-1", "/providers/Microsoft.Storage"),
            "https://management.azure.com/subscriptions/sub-1/providers/Microsoft.Storage"
        );
        assert_eq!(
            client.resource_group_url("sub-1", "my rg", "/providers/X"),
            "https://management.azure.com/subscriptions/sub-1/resourceGroups/my%20rg/providers/X"
        );
    }

    #[test]
    fn sovereign_cloud_scope_follows_endpoint() {
        let client = client("https://management.usgovcloudapi.net");
        assert_eq!(client.scope(), "https://management.usgovcloudapi.net/.default");
    }

    #[test]
    fn empty_body_parses_as_null() {
        let value: Option<serde_json::Value> = parse_json("op", b"").unwrap();
        assert!(value.is_none());
        let value: serde_json::Value = parse_json("op", br#"{"a":1}"#).unwrap();
        assert_eq!(value["a"], 1);
        assert!(matches!(
            parse_json::<serde_json::Value>("op", b"{not json"),
            Err(ArmError::Deserialize { .. })
        ));
    }

    #[test]
    fn request_builder_keeps_headers_and_body() {
        let request = ArmRequest::new("apis.delete", Method::DELETE, "https://x/y")
            .header("If-Match", "*")
            .json(&serde_json::json!({"k": "v"}))
            .unwrap();
        assert_eq!(request.operation(), "apis.delete");
        assert_eq!(request.url(), "https://x/y");
        assert_eq!(request.headers, vec![("If-Match", "*".to_string())]);
        assert_eq!(request.body.as_deref(), Some(br#"{"k":"v"}"#.as_slice()));
    }
}
