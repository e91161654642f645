//! Shared handling of Microsoft identity platform token endpoint responses.

use super::types::{AccessToken, TokenResponse};
use crate::common::{ArmError, ArmResult};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OAuthErrorResponse {
    #[serde(default)]
    pub error: String,
    pub error_description: Option<String>,
}

/// Token endpoint URL for a tenant.
pub(crate) fn token_url(authority_host: &str, tenant_id: &str) -> String {
    format!(
        "{}/{}/oauth2/v2.0/token",
        authority_host.trim_end_matches('/'),
        tenant_id
    )
}

/// Turns an OAuth2 error code into guidance a person can act on.
pub(crate) fn describe_error(error: &OAuthErrorResponse) -> String {
    let friendly = match error.error.as_str() {
        "invalid_client" => {
            "Invalid client credentials. Check the client ID and secret of the app registration."
        }
        "unauthorized_client" => {
            "This application is not authorized for the requested flow. Check the app registration."
        }
        "invalid_request" => {
            "Invalid authentication request. Please check your client ID and tenant ID."
        }
        "invalid_scope" => "The requested scope is not valid for this application.",
        "access_denied" => "Access denied. Please ensure you have the necessary permissions.",
        "expired_token" => "Authentication expired. Please try again.",
        _ => error
            .error_description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(if error.error.is_empty() {
                "unknown error"
            } else {
                error.error.as_str()
            }),
    };
    friendly.to_string()
}

/// Reads a token endpoint response, mapping failures to
/// [`ArmError::Authentication`].
pub(crate) async fn read_token_response(
    response: reqwest::Response,
    context: &str,
) -> ArmResult<AccessToken> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let error: OAuthErrorResponse = serde_json::from_str(&body).unwrap_or_default();
        log::debug!("{context} token request rejected with HTTP {status}");
        return Err(ArmError::Authentication(format!(
            "{context}: {} (HTTP {})",
            describe_error(&error),
            status.as_u16()
        )));
    }

    let token: TokenResponse = response.json().await.map_err(|e| {
        ArmError::Authentication(format!("{context}: failed to parse token response: {e}"))
    })?;
    Ok(token.into())
}
