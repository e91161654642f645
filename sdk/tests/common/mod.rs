// Not every suite uses every helper
#![allow(dead_code)]

use async_trait::async_trait;
use sdk::auth::{AccessToken, CredentialKind, TokenCredential};
use sdk::common::RetryOptions;
use sdk::{ArmClient, ArmClientOptions, ArmResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use wiremock::MockServer;

pub const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000001";
pub const TOKEN: &str = "test-token";

/// Credential that hands out a fixed token and counts the requests.
#[derive(Default)]
pub struct StaticTokenCredential {
    calls: AtomicUsize,
}

impl StaticTokenCredential {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _scope: &str) -> ArmResult<AccessToken> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AccessToken::expiring_in(
            TOKEN.to_string(),
            "Bearer".to_string(),
            3600,
        ))
    }

    fn kind(&self) -> CredentialKind {
        CredentialKind::ClientSecret
    }
}

/// Options with millisecond delays so retries and polls finish quickly.
pub fn fast_options(endpoint: &str) -> ArmClientOptions {
    ArmClientOptions {
        endpoint: endpoint.to_string(),
        retry: RetryOptions {
            max_retries: 2,
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(50),
        },
        poll_frequency: Duration::from_millis(5),
        requests_per_second: 1000,
        timeout: Duration::from_secs(5),
    }
}

pub fn mock_client(server: &MockServer) -> Arc<ArmClient> {
    let credential: Arc<dyn TokenCredential> = Arc::new(StaticTokenCredential::default());
    Arc::new(
        ArmClient::with_options(credential, fast_options(&server.uri()))
            .expect("client should build"),
    )
}

/// Path of a resource group as the typed clients build it.
pub fn group_path(resource_group: &str) -> String {
    format!("/subscriptions/{SUBSCRIPTION}/resourcegroups/{resource_group}")
}

/// Provider path under a resource group.
pub fn provider_path(resource_group: &str, path: &str) -> String {
    format!("/subscriptions/{SUBSCRIPTION}/resourceGroups/{resource_group}/providers/{path}")
}
