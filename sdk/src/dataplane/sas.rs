use crate::common::{ArmError, ArmResult};
use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Storage service version the signature is computed for.
pub const SAS_VERSION: &str = "2022-11-02";

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Builder for Storage account Shared Access Signatures.
///
/// Signs the account SAS string-to-sign with HMAC-SHA256 using the
/// base64-decoded account key. Defaults grant the Blob service full
/// object/container/service access over HTTPS only:
/// `ss=b`, `srt=sco`, `sp=rwdlacup`, `spr=https`.
///
/// # Examples
///
/// ```no_run
/// use sdk::dataplane::AccountSasBuilder;
///
/// let sas = AccountSasBuilder::new("mystorageacct", "base64_account_key", chrono::Duration::hours(1))
///     .sign()?;
/// let url = format!("https://mystorageacct.blob.core.windows.net/?{sas}");
/// # Ok::<(), sdk::ArmError>(())
/// ```
#[derive(Clone)]
pub struct AccountSasBuilder {
    account: String,
    key: Zeroizing<String>,
    permissions: String,
    services: String,
    resource_types: String,
    start: Option<DateTime<Utc>>,
    expiry: DateTime<Utc>,
    ip: Option<String>,
    protocol: String,
}

impl std::fmt::Debug for AccountSasBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSasBuilder")
            .field("account", &self.account)
            .field("permissions", &self.permissions)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl AccountSasBuilder {
    pub fn new(account: &str, key: &str, valid_for: Duration) -> Self {
        let now = Utc::now();
        Self {
            account: account.to_string(),
            key: Zeroizing::new(key.to_string()),
            permissions: "rwdlacup".to_string(),
            services: "b".to_string(),
            resource_types: "sco".to_string(),
            // Tolerate clock skew between this machine and the service
            start: Some(now - Duration::minutes(5)),
            expiry: now + valid_for,
            ip: None,
            protocol: "https".to_string(),
        }
    }

    pub fn with_permissions(mut self, permissions: &str) -> Self {
        self.permissions = permissions.to_string();
        self
    }

    pub fn with_start(mut self, start: Option<DateTime<Utc>>) -> Self {
        self.start = start;
        self
    }

    pub fn with_expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn with_ip(mut self, ip: &str) -> Self {
        self.ip = Some(ip.to_string());
        self
    }

    /// Also allow plain HTTP (`spr=https,http`); used against local emulators.
    pub fn allow_http(mut self) -> Self {
        self.protocol = "https,http".to_string();
        self
    }

    fn start_str(&self) -> String {
        self.start
            .map(|s| s.format(TIME_FORMAT).to_string())
            .unwrap_or_default()
    }

    fn expiry_str(&self) -> String {
        self.expiry.format(TIME_FORMAT).to_string()
    }

    pub(crate) fn string_to_sign(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n\n",
            self.account,
            self.permissions,
            self.services,
            self.resource_types,
            self.start_str(),
            self.expiry_str(),
            self.ip.as_deref().unwrap_or_default(),
            self.protocol,
            SAS_VERSION,
        )
    }

    /// Returns the SAS query string (without a leading `?`).
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Authentication`] if the key is not valid base64.
    pub fn sign(&self) -> ArmResult<String> {
        let key_bytes = Zeroizing::new(general_purpose::STANDARD.decode(self.key.as_bytes()).map_err(
            |e| ArmError::Authentication(format!("Failed to decode storage account key: {e}")),
        )?);

        let mut mac = HmacSha256::new_from_slice(&key_bytes)
            .map_err(|e| ArmError::Authentication(format!("Failed to create HMAC: {e}")))?;
        mac.update(self.string_to_sign().as_bytes());
        let signature = general_purpose::STANDARD.encode(mac.finalize().into_bytes());

        let mut query = vec![
            ("sv", SAS_VERSION.to_string()),
            ("ss", self.services.clone()),
            ("srt", self.resource_types.clone()),
            ("sp", self.permissions.clone()),
            ("se", self.expiry_str()),
        ];
        if self.start.is_some() {
            query.push(("st", self.start_str()));
        }
        if let Some(ip) = &self.ip {
            query.push(("sip", ip.clone()));
        }
        query.push(("spr", self.protocol.clone()));
        query.push(("sig", signature));

        Ok(query
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&"))
    }
}
