use super::types::{AccessToken, CredentialKind};
use crate::common::ArmResult;
use async_trait::async_trait;

/// Trait for credentials that can obtain Microsoft Entra ID access tokens.
///
/// Implementations cache tokens per scope, so calling [`get_token`] before
/// every request is cheap.
///
/// # Examples
///
/// ```no_run
/// use sdk::auth::{AccessToken, CredentialKind, TokenCredential};
/// use sdk::ArmResult;
/// use async_trait::async_trait;
///
/// struct FixedToken;
///
/// #[async_trait]
/// impl TokenCredential for FixedToken {
///     async fn get_token(&self, _scope: &str) -> ArmResult<AccessToken> {
///         Ok(AccessToken::expiring_in("token".into(), "Bearer".into(), 3600))
///     }
///
///     fn kind(&self) -> CredentialKind {
///         CredentialKind::ClientSecret
///     }
/// }
/// ```
///
/// [`get_token`]: TokenCredential::get_token
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Returns a token valid for `scope` (for example
    /// `https://management.azure.com/.default`).
    ///
    /// # Errors
    ///
    /// Returns [`crate::ArmError::CredentialUnavailable`] when the credential
    /// cannot work in this environment and
    /// [`crate::ArmError::Authentication`] when the identity platform
    /// rejects the request.
    async fn get_token(&self, scope: &str) -> ArmResult<AccessToken>;

    /// Identifies the credential in logs and chained error messages.
    fn kind(&self) -> CredentialKind;
}
