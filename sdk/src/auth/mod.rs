pub mod auth_setup;
pub mod azure_cli;
pub mod client_secret;
pub mod default;
pub mod device_code;
pub mod managed_identity;
mod oauth;
pub mod provider;
pub mod token_cache;
pub mod types;

pub use auth_setup::{AuthMethod, create_credential};
pub use azure_cli::AzureCliCredential;
pub use client_secret::ClientSecretCredential;
pub use default::DefaultAzureCredential;
pub use device_code::{DeviceCodeCredential, DeviceCodePrompt};
pub use managed_identity::ManagedIdentityCredential;
pub use provider::TokenCredential;
pub use token_cache::TokenCache;
pub use types::{AccessToken, CredentialKind, DeviceCodeInfo};
