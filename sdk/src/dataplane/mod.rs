//! Data-plane clients: Blob storage through a SAS and Key Vault secrets.

pub mod blob;
pub mod sas;
pub mod secrets;

pub use blob::BlobClient;
pub use sas::{AccountSasBuilder, SAS_VERSION};
pub use secrets::{DeletedSecret, Secret, SecretClient};

use crate::common::errors::error_from_response;
use crate::common::retry::{is_retryable_status, parse_retry_after};
use crate::common::{ArmError, ArmResult, HttpError, RetryOptions};

/// Sends `request`, retrying throttled and transient failures like the ARM
/// pipeline does.
pub(crate) async fn execute(
    operation: &str,
    request: reqwest::RequestBuilder,
    retry: &RetryOptions,
) -> ArmResult<reqwest::Response> {
    let mut attempt = 0;
    loop {
        let current = request.try_clone().ok_or_else(|| {
            ArmError::InvalidState(format!("{operation}: request cannot be resent"))
        })?;

        match current.send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                let status = response.status().as_u16();
                if is_retryable_status(status) && attempt < retry.max_retries {
                    let delay = retry.backoff(attempt, parse_retry_after(response.headers()));
                    log::warn!("{operation} returned HTTP {status}, retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                    continue;
                }
                return Err(error_from_response(operation, response).await);
            }
            Err(e) => {
                if (e.is_connect() || e.is_timeout()) && attempt < retry.max_retries {
                    let delay = retry.backoff(attempt, None);
                    log::warn!("{operation} could not reach the service, retrying in {delay:?}: {e}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                    continue;
                }
                let url = e.url().map(|u| u.to_string()).unwrap_or_default();
                return Err(HttpError::from_reqwest(&url, &e).into());
            }
        }
    }
}

pub(crate) fn build_http_client() -> ArmResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("arm-samples-sdk/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| HttpError::ClientCreation {
            reason: e.to_string(),
        })?;
    Ok(client)
}
