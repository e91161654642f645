//! Shared plumbing for the sample binaries: configuration, logging and the
//! bootstrap that turns both into an authenticated [`sdk::ArmClient`].

pub mod config;
pub mod logger;
pub mod runner;

pub use config::SampleConfig;
pub use runner::{SampleContext, after_cleanup, bootstrap, bootstrap_requiring, finish, prepare};
