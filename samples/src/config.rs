use config::{Config, Environment, File, FileFormat};
use sdk::ArmClientOptions;
use sdk::auth::AuthMethod;
use sdk::common::RetryOptions;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// File looked up in the working directory.
pub const CONFIG_FILE: &str = "arm-samples.toml";
pub const ENV_PREFIX: &str = "ARM_SAMPLES";

const DEFAULT_LOCATION: &str = "westus2";
const DEFAULT_GROUP_PREFIX: &str = "arm-samples";
const DEFAULT_POLL_FREQUENCY_SECS: u64 = 10;
const DEFAULT_RATE_LIMIT_RPS: u32 = 20;
const MAX_POLL_FREQUENCY_SECS: u64 = 300;
const MAX_RETRIES_LIMIT: u32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Configuration validation failed:\n{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"))]
    Invalid(Vec<ConfigValidationError>),
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("Invalid poll_frequency_secs: {configured} (min: 1, max: {max})")]
    PollFrequency { configured: u64, max: u64 },
    #[error("Invalid rate_limit_rps: {configured} (must be at least 1)")]
    RateLimit { configured: u32 },
    #[error("Invalid retry.max_retries: {configured} (limit: {limit})")]
    MaxRetries { configured: u32, limit: u32 },
    #[error("Invalid auth.method: {0}")]
    AuthMethod(String),
    #[error("auth.client_id is required when auth.method is device_code")]
    DeviceCodeClientId,
    #[error("Invalid location: must not be empty")]
    Location,
}

/// Settings shared by every sample binary.
///
/// Every value is optional; accessors fall back to defaults.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct SampleConfig {
    location: Option<String>,
    resource_group_prefix: Option<String>,
    poll_frequency_secs: Option<u64>,
    rate_limit_rps: Option<u32>,
    #[serde(default)]
    retry: RetryConfig,
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    auth: AuthConfig,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RetryConfig {
    max_retries: Option<u32>,
    base_delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LoggingConfig {
    level: Option<String>,
    file: Option<String>,
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or("info")
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct AuthConfig {
    method: Option<String>,
    client_id: Option<String>,
}

impl AuthConfig {
    /// Configured method; unset means the default credential chain.
    pub fn method(&self) -> Result<AuthMethod, sdk::ArmError> {
        self.method.as_deref().unwrap_or_default().parse()
    }

    /// Public client used by the device code flow.
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

impl SampleConfig {
    /// Loads `.env`, then `arm-samples.toml` from the working directory and
    /// the user config directory, then `ARM_SAMPLES__*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let files = [Some(PathBuf::from(CONFIG_FILE)), user_config_file()];
        let files: Vec<PathBuf> = files.into_iter().flatten().collect();
        Self::load_from(&files, environment())
    }

    /// Loads from explicit files (missing ones are skipped) and an
    /// environment source.
    ///
    /// The first file wins over later ones; the environment wins over all.
    pub fn load_from(files: &[PathBuf], env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        for path in files.iter().rev() {
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let config: SampleConfig = builder.add_source(env).build()?.try_deserialize()?;
        config.validate().map_err(ConfigError::Invalid)?;
        log::debug!("Loaded sample configuration: {config:?}");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        let poll = self.poll_frequency_secs();
        if poll == 0 || poll > MAX_POLL_FREQUENCY_SECS {
            errors.push(ConfigValidationError::PollFrequency {
                configured: poll,
                max: MAX_POLL_FREQUENCY_SECS,
            });
        }
        if self.rate_limit_rps() == 0 {
            errors.push(ConfigValidationError::RateLimit { configured: 0 });
        }
        let retries = self.retry_options().max_retries;
        if retries > MAX_RETRIES_LIMIT {
            errors.push(ConfigValidationError::MaxRetries {
                configured: retries,
                limit: MAX_RETRIES_LIMIT,
            });
        }
        if self.location().trim().is_empty() {
            errors.push(ConfigValidationError::Location);
        }
        match self.auth.method() {
            Ok(AuthMethod::DeviceCode) if self.auth.client_id().is_none() => {
                errors.push(ConfigValidationError::DeviceCodeClientId);
            }
            Ok(_) => {}
            Err(e) => errors.push(ConfigValidationError::AuthMethod(e.to_string())),
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    pub fn location(&self) -> &str {
        self.location.as_deref().unwrap_or(DEFAULT_LOCATION)
    }

    pub fn resource_group_prefix(&self) -> &str {
        self.resource_group_prefix
            .as_deref()
            .unwrap_or(DEFAULT_GROUP_PREFIX)
    }

    /// Resource group a sample runs in, e.g. `arm-samples-key-vault`.
    pub fn resource_group_name(&self, sample: &str) -> String {
        format!("{}-{sample}", self.resource_group_prefix())
    }

    pub fn poll_frequency_secs(&self) -> u64 {
        self.poll_frequency_secs
            .unwrap_or(DEFAULT_POLL_FREQUENCY_SECS)
    }

    pub fn rate_limit_rps(&self) -> u32 {
        self.rate_limit_rps.unwrap_or(DEFAULT_RATE_LIMIT_RPS)
    }

    pub fn retry_options(&self) -> RetryOptions {
        let defaults = RetryOptions::default();
        RetryOptions {
            max_retries: self.retry.max_retries.unwrap_or(defaults.max_retries),
            base_delay: self
                .retry
                .base_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.base_delay),
            max_delay: defaults.max_delay,
        }
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    pub fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    /// Pipeline options derived from these settings.
    pub fn client_options(&self) -> ArmClientOptions {
        ArmClientOptions {
            retry: self.retry_options(),
            poll_frequency: Duration::from_secs(self.poll_frequency_secs()),
            requests_per_second: self.rate_limit_rps(),
            ..ArmClientOptions::default()
        }
    }
}

/// `ARM_SAMPLES__LOCATION`, `ARM_SAMPLES__RETRY__MAX_RETRIES`, ...
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("arm-samples").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_configured() {
        let config = SampleConfig::default();
        assert_eq!(config.location(), "westus2");
        assert_eq!(config.resource_group_name("redis-cache"), "arm-samples-redis-cache");
        assert_eq!(config.poll_frequency_secs(), 10);
        assert_eq!(config.retry_options(), RetryOptions::default());
        assert_eq!(config.logging().level(), "info");
        assert_eq!(config.auth().method().unwrap(), AuthMethod::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn client_options_follow_settings() {
        let config = SampleConfig {
            poll_frequency_secs: Some(3),
            rate_limit_rps: Some(5),
            retry: RetryConfig {
                max_retries: Some(1),
                base_delay_ms: Some(250),
            },
            ..Default::default()
        };
        let options = config.client_options();
        assert_eq!(options.poll_frequency, Duration::from_secs(3));
        assert_eq!(options.requests_per_second, 5);
        assert_eq!(options.retry.max_retries, 1);
        assert_eq!(options.retry.base_delay, Duration::from_millis(250));
        assert_eq!(options.endpoint, sdk::client::DEFAULT_ENDPOINT);
    }

    #[test]
    fn validation_collects_every_problem() {
        let config = SampleConfig {
            location: Some(" ".to_string()),
            poll_frequency_secs: Some(0),
            rate_limit_rps: Some(0),
            auth: AuthConfig {
                method: Some("device_code".to_string()),
                client_id: None,
            },
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ConfigValidationError::DeviceCodeClientId));
        assert!(errors.contains(&ConfigValidationError::Location));
    }
}
