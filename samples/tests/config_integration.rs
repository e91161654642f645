//! Layered loading of the sample configuration: TOML files plus
//! `ARM_SAMPLES__*` overrides.

use arm_samples::config::{ConfigError, ConfigValidationError, SampleConfig, environment};
use claims::{assert_err, assert_ok};
use config::Environment;
use sdk::auth::AuthMethod;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write config file");
    path
}

/// Environment source backed by a fixed map instead of the process.
fn env_with(vars: &[(&str, &str)]) -> Environment {
    let map: config::Map<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    environment().source(Some(map))
}

fn no_env() -> Environment {
    env_with(&[])
}

#[test]
fn missing_files_fall_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let config = assert_ok!(SampleConfig::load_from(
        &[dir.path().join("absent.toml")],
        no_env()
    ));
    assert_eq!(config.location(), "westus2");
    assert_eq!(config.resource_group_name("key-vault"), "arm-samples-key-vault");
    assert_eq!(config.client_options().poll_frequency, Duration::from_secs(10));
}

#[test]
fn reads_nested_sections_from_toml() {
    let dir = TempDir::new().unwrap();
    let file = write_config(
        &dir,
        "arm-samples.toml",
        r#"
location = "northeurope"
resource_group_prefix = "demo"
poll_frequency_secs = 5
rate_limit_rps = 8

[retry]
max_retries = 5
base_delay_ms = 200

[logging]
level = "debug"
file = "samples.log"

[auth]
method = "cli"
"#,
    );

    let config = assert_ok!(SampleConfig::load_from(&[file], no_env()));
    assert_eq!(config.location(), "northeurope");
    assert_eq!(config.resource_group_name("sql-database"), "demo-sql-database");
    assert_eq!(config.logging().level(), "debug");
    assert_eq!(config.logging().file(), Some("samples.log"));
    assert_eq!(config.auth().method().unwrap(), AuthMethod::Cli);

    let options = config.client_options();
    assert_eq!(options.poll_frequency, Duration::from_secs(5));
    assert_eq!(options.requests_per_second, 8);
    assert_eq!(options.retry.max_retries, 5);
    assert_eq!(options.retry.base_delay, Duration::from_millis(200));
}

#[test]
fn first_file_wins_over_later_files() {
    let dir = TempDir::new().unwrap();
    let local = write_config(&dir, "local.toml", "location = \"eastus\"\n");
    let user = write_config(
        &dir,
        "user.toml",
        "location = \"westeurope\"\nresource_group_prefix = \"mine\"\n",
    );

    let config = assert_ok!(SampleConfig::load_from(&[local, user], no_env()));
    assert_eq!(config.location(), "eastus");
    // Keys the first file leaves unset still come from the second
    assert_eq!(config.resource_group_prefix(), "mine");
}

#[test]
fn environment_overrides_files() {
    let dir = TempDir::new().unwrap();
    let file = write_config(
        &dir,
        "arm-samples.toml",
        "location = \"eastus\"\n[retry]\nmax_retries = 2\n",
    );

    let env = env_with(&[
        ("ARM_SAMPLES__LOCATION", "uksouth"),
        ("ARM_SAMPLES__RETRY__MAX_RETRIES", "7"),
        ("ARM_SAMPLES__POLL_FREQUENCY_SECS", "30"),
        ("UNRELATED__LOCATION", "ignored"),
    ]);
    let config = assert_ok!(SampleConfig::load_from(&[file], env));
    assert_eq!(config.location(), "uksouth");
    assert_eq!(config.retry_options().max_retries, 7);
    assert_eq!(config.poll_frequency_secs(), 30);
}

#[test]
fn invalid_values_are_reported_together() {
    let dir = TempDir::new().unwrap();
    let file = write_config(
        &dir,
        "arm-samples.toml",
        "poll_frequency_secs = 900\n[retry]\nmax_retries = 50\n[auth]\nmethod = \"kerberos\"\n",
    );

    let error = assert_err!(SampleConfig::load_from(&[file], no_env()));
    let ConfigError::Invalid(errors) = &error else {
        panic!("expected validation errors, got {error}");
    };
    assert_eq!(errors.len(), 3);
    assert!(errors.contains(&ConfigValidationError::PollFrequency {
        configured: 900,
        max: 300
    }));
    assert!(errors.contains(&ConfigValidationError::MaxRetries {
        configured: 50,
        limit: 10
    }));
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigValidationError::AuthMethod(m) if m.contains("kerberos")))
    );

    let message = error.to_string();
    assert!(message.starts_with("Configuration validation failed"));
    assert!(message.contains("poll_frequency_secs: 900"));
}

#[test]
fn device_code_needs_a_client_id() {
    let dir = TempDir::new().unwrap();
    let file = write_config(&dir, "arm-samples.toml", "[auth]\nmethod = \"device_code\"\n");
    let error = assert_err!(SampleConfig::load_from(&[file.clone()], no_env()));
    assert!(matches!(
        error,
        ConfigError::Invalid(ref errors) if errors == &[ConfigValidationError::DeviceCodeClientId]
    ));

    let env = env_with(&[("ARM_SAMPLES__AUTH__CLIENT_ID", "public-client")]);
    let config = assert_ok!(SampleConfig::load_from(&[file], env));
    assert_eq!(config.auth().method().unwrap(), AuthMethod::DeviceCode);
    assert_eq!(config.auth().client_id(), Some("public-client"));
}

#[test]
fn malformed_toml_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let file = write_config(&dir, "arm-samples.toml", "location = \n[retry\n");
    let error = assert_err!(SampleConfig::load_from(&[file], no_env()));
    assert!(matches!(error, ConfigError::Load(_)));
}
