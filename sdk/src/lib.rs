//! # ARM Samples SDK
//!
//! Thin Azure Resource Manager client shared by the sample programs.
//! This library provides credential acquisition, an authenticated HTTP
//! pipeline, long-running operation polling, paged listing, typed clients
//! for the resource providers the samples touch, and the setup/teardown
//! scenario every sample runs inside.
//!
//! ## Modules
//!
//! - [`auth`] - Credentials and token caching
//! - [`client`] - Authenticated ARM pipeline with retry and rate limiting
//! - [`common`] - Error types, retry policy and rate limiter
//! - [`dataplane`] - Blob storage and Key Vault secret clients
//! - [`lro`] - Long-running operation poller
//! - [`model`] - Shared ARM payload types
//! - [`pager`] - `nextLink` pagination
//! - [`resources`] - Typed clients per resource provider
//! - [`scenario`] - Resource group setup and cleanup around a sample body
//! - [`utils`] - Environment variable helpers

pub mod auth;
pub mod client;
pub mod common;
pub mod dataplane;
pub mod lro;
pub mod model;
pub mod pager;
pub mod resources;
pub mod scenario;
pub mod utils;

pub use client::{ArmClient, ArmClientOptions};
pub use common::{ArmError, ArmResult};
pub use lro::{NoContent, OperationStatus, Poller};
pub use pager::Pager;
