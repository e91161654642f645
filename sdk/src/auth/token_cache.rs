use super::types::AccessToken;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Per-scope token store shared by clones of a credential.
#[derive(Clone, Debug, Default)]
pub struct TokenCache {
    cache: Arc<RwLock<HashMap<String, AccessToken>>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached token for `scope` unless it is due for refresh.
    pub async fn get(&self, scope: &str) -> Option<AccessToken> {
        let cache = self.cache.read().await;
        cache
            .get(scope)
            .filter(|token| !token.needs_refresh())
            .cloned()
    }

    pub async fn set(&self, scope: String, token: AccessToken) {
        let mut cache = self.cache.write().await;
        cache.insert(scope, token);
    }
}
