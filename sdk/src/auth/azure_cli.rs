use super::provider::TokenCredential;
use super::token_cache::TokenCache;
use super::types::{AccessToken, CredentialKind};
use crate::common::{ArmError, ArmResult};
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tokio::process::Command;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    /// Local time, e.g. `2024-05-01 10:30:00.000000`
    #[serde(default)]
    expires_on: Option<String>,
    /// Unix seconds; only emitted by Azure CLI 2.54 and later
    #[serde(default, rename = "expires_on")]
    expires_on_unix: Option<i64>,
}

/// Borrows a token from the signed-in Azure CLI (`az login`).
#[derive(Clone, Debug, Default)]
pub struct AzureCliCredential {
    tenant_id: Option<String>,
    cache: TokenCache,
}

impl AzureCliCredential {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests tokens for a specific tenant instead of the CLI default.
    pub fn with_tenant_id(mut self, tenant_id: Option<String>) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    fn command(&self, scope: &str) -> Command {
        let mut command = if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "az"]);
            cmd
        } else {
            Command::new("az")
        };
        command.args([
            "account",
            "get-access-token",
            "--output",
            "json",
            "--scope",
            scope,
        ]);
        if let Some(tenant_id) = self.tenant_id.as_deref() {
            command.args(["--tenant", tenant_id]);
        }
        command
    }

    async fn request_token(&self, scope: &str) -> ArmResult<AccessToken> {
        let output = self.command(scope).output().await.map_err(|e| {
            ArmError::CredentialUnavailable(format!("Azure CLI could not be started: {e}"))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if stderr.contains("az login") || stderr.contains("not recognized") {
                return Err(ArmError::CredentialUnavailable(format!(
                    "Azure CLI is not signed in: {stderr}"
                )));
            }
            return Err(ArmError::Authentication(format!(
                "Azure CLI failed to issue a token: {stderr}"
            )));
        }

        parse_cli_token(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parses `az account get-access-token --output json`.
pub(crate) fn parse_cli_token(stdout: &str) -> ArmResult<AccessToken> {
    let token: CliToken = serde_json::from_str(stdout).map_err(|e| {
        ArmError::Authentication(format!("Azure CLI returned an unexpected token format: {e}"))
    })?;

    let expires_on = match (token.expires_on_unix, token.expires_on.as_deref()) {
        (Some(unix), _) => DateTime::<Utc>::from_timestamp(unix, 0),
        (None, Some(local)) => parse_local_time(local),
        (None, None) => None,
    }
    .ok_or_else(|| {
        ArmError::Authentication("Azure CLI token has no usable expiry time".to_string())
    })?;

    Ok(AccessToken {
        token: token.access_token,
        token_type: token.token_type.unwrap_or_else(|| "Bearer".to_string()),
        expires_on,
    })
}

fn parse_local_time(value: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    async fn get_token(&self, scope: &str) -> ArmResult<AccessToken> {
        if let Some(token) = self.cache.get(scope).await {
            return Ok(token);
        }

        let token = self.request_token(scope).await?;
        self.cache.set(scope.to_string(), token.clone()).await;
        Ok(token)
    }

    fn kind(&self) -> CredentialKind {
        CredentialKind::AzureCli
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unix_expiry() {
        let json = r#"{
            "accessToken": "eyJ0eXAi",
            "expiresOn": "2024-05-01 10:30:00.000000",
            "expires_on": 1714559400,
            "subscription": "00000000-0000-0000-0000-000000000000",
            "tenant": "11111111-1111-1111-1111-111111111111",
            "tokenType": "Bearer"
        }"#;
        let token = parse_cli_token(json).unwrap();
        assert_eq!(token.token, "eyJ0eXAi");
        assert_eq!(token.expires_on.timestamp(), 1714559400);
    }

    #[test]
    fn parses_local_expiry_from_older_cli() {
        let json = r#"{"accessToken":"abc","expiresOn":"2030-01-01 00:00:00.123456","tokenType":"Bearer"}"#;
        let token = parse_cli_token(json).unwrap();
        assert!(!token.is_expired());
    }

    #[test]
    fn rejects_missing_expiry() {
        let result = parse_cli_token(r#"{"accessToken":"abc"}"#);
        assert!(matches!(result, Err(ArmError::Authentication(_))));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_cli_token("ERROR: Please run 'az login'").is_err());
    }
}
