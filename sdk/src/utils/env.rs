//! Environment variable utilities for safe and validated access.
//!
//! Every sample is configured through a handful of `AZURE_*` variables.
//! This module names them in one place and validates that required ones
//! are present and non-empty before any network call is made.

use thiserror::Error;

pub const AZURE_SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";
pub const AZURE_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const AZURE_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const AZURE_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
pub const AZURE_OBJECT_ID: &str = "AZURE_OBJECT_ID";
pub const AZURE_AUTHORITY_HOST: &str = "AZURE_AUTHORITY_HOST";
/// Presence alone (any value, even empty) suppresses resource cleanup.
pub const KEEP_RESOURCE: &str = "KEEP_RESOURCE";

/// Why a required variable could not be used.
#[derive(Debug, Error)]
pub enum EnvVarError {
    #[error("{name} is not set; export it or add it to a .env file")]
    NotFound { name: String },

    #[error("{name} is not valid UTF-8")]
    InvalidUtf8 { name: String },

    /// Set, but blank after trimming.
    #[error("{name} is set but empty")]
    Empty { name: String },
}

/// Reads `AZURE_*` settings; values are trimmed and blank ones rejected.
///
/// # Examples
///
/// ```no_run
/// use sdk::utils::EnvUtils;
///
/// let subscription = EnvUtils::get_validated_var("AZURE_SUBSCRIPTION_ID")?;
/// let tenant = EnvUtils::get_optional_var("AZURE_TENANT_ID");
/// # Ok::<(), sdk::utils::EnvVarError>(())
/// ```
pub struct EnvUtils;

impl EnvUtils {
    /// # Errors
    ///
    /// Returns [`EnvVarError`] if the variable is not set, is blank, or
    /// contains invalid UTF-8.
    pub fn get_validated_var(name: &str) -> Result<String, EnvVarError> {
        match std::env::var(name) {
            Ok(value) => Self::validate_value(name, Some(value)),
            Err(std::env::VarError::NotPresent) => Self::validate_value(name, None),
            Err(std::env::VarError::NotUnicode(_)) => Err(EnvVarError::InvalidUtf8 {
                name: name.to_string(),
            }),
        }
    }

    /// Validates a value obtained from any lookup source.
    pub fn validate_value(name: &str, value: Option<String>) -> Result<String, EnvVarError> {
        let value = value.ok_or_else(|| EnvVarError::NotFound {
            name: name.to_string(),
        })?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Err(EnvVarError::Empty {
                name: name.to_string(),
            })
        } else {
            Ok(trimmed.to_string())
        }
    }

    /// `None` unless the variable holds a usable value.
    pub fn get_optional_var(name: &str) -> Option<String> {
        Self::get_validated_var(name).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_trims_value() {
        let value = EnvUtils::validate_value("X", Some("  sub-1 \n".to_string())).unwrap();
        assert_eq!(value, "sub-1");
    }

    #[test]
    fn validate_rejects_blank() {
        let err = EnvUtils::validate_value("X", Some("   ".to_string())).unwrap_err();
        assert!(matches!(err, EnvVarError::Empty { ref name } if name == "X"));
    }

    #[test]
    fn validate_rejects_missing() {
        let err = EnvUtils::validate_value(AZURE_SUBSCRIPTION_ID, None).unwrap_err();
        assert!(err.to_string().contains(AZURE_SUBSCRIPTION_ID));
    }

    #[test]
    fn unset_variable_is_not_found() {
        let name = "ARM_SAMPLES_TEST_SURELY_UNSET_VARIABLE";
        assert!(matches!(
            EnvUtils::get_validated_var(name),
            Err(EnvVarError::NotFound { .. })
        ));
        assert!(EnvUtils::get_optional_var(name).is_none());
    }
}
