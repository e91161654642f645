use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Default Microsoft Entra ID authority.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Tokens are renewed this long before they actually expire.
const REFRESH_BUFFER_SECS: i64 = 300;

/// The kinds of credential the SDK can build.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    /// Service principal using a client secret
    ClientSecret,
    /// Azure Instance Metadata Service identity
    ManagedIdentity,
    /// Token borrowed from a logged-in Azure CLI
    AzureCli,
    /// Interactive device code flow
    DeviceCode,
    /// Chain of the non-interactive credentials above
    Default,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CredentialKind::ClientSecret => "ClientSecretCredential",
            CredentialKind::ManagedIdentity => "ManagedIdentityCredential",
            CredentialKind::AzureCli => "AzureCliCredential",
            CredentialKind::DeviceCode => "DeviceCodeCredential",
            CredentialKind::Default => "DefaultAzureCredential",
        };
        f.write_str(name)
    }
}

/// A bearer token together with its absolute expiry.
#[derive(Clone, Debug, PartialEq)]
pub struct AccessToken {
    /// The authentication token string
    pub token: String,
    /// The type of token (e.g., "Bearer")
    pub token_type: String,
    /// When the token stops being accepted
    pub expires_on: DateTime<Utc>,
}

impl AccessToken {
    /// Creates a token that expires `expires_in_secs` from now.
    ///
    /// Lifetimes past the range of `DateTime` saturate at its maximum.
    pub fn expiring_in(token: String, token_type: String, expires_in_secs: u64) -> Self {
        let expires_on = i64::try_from(expires_in_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            token,
            token_type,
            expires_on,
        }
    }

    /// Checks if the token has passed its expiration time.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_on
    }

    /// Checks if the token needs to be refreshed soon.
    ///
    /// Uses a 5-minute buffer before expiration so a token is never sent
    /// just as it lapses.
    pub fn needs_refresh(&self) -> bool {
        Utc::now() + Duration::seconds(REFRESH_BUFFER_SECS) >= self.expires_on
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Information required to complete a device code sign-in.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DeviceCodeInfo {
    /// The user code to be entered on the verification page
    pub user_code: String,
    /// The URL where the user should enter the code
    pub verification_uri: String,
    /// Human-readable message with authentication instructions
    pub message: String,
}

/// Token endpoint response shared by the OAuth2 and IMDS flows.
///
/// IMDS encodes `expires_in` as a string, the identity platform as a number.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    #[serde(deserialize_with = "u64_from_number_or_string")]
    pub expires_in: u64,
}

impl From<TokenResponse> for AccessToken {
    fn from(response: TokenResponse) -> Self {
        AccessToken::expiring_in(
            response.access_token,
            response.token_type,
            response.expires_in,
        )
    }
}

fn bearer() -> String {
    "Bearer".to_string()
}

fn u64_from_number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
