//! # SDK Utilities
//!
//! Helpers shared by the credentials and the sample scenario. The
//! [`env`] module provides validated access to the `AZURE_*` variables
//! every sample reads:
//!
//! ```no_run
//! use sdk::utils::env::{EnvUtils, AZURE_SUBSCRIPTION_ID};
//!
//! let subscription = EnvUtils::get_validated_var(AZURE_SUBSCRIPTION_ID)?;
//! # Ok::<(), sdk::utils::EnvVarError>(())
//! ```

pub mod env;

pub use env::{EnvUtils, EnvVarError};
