//! Google Cloud API clients built on discovery documents
//!
//! A generic [`discovery::Dispatcher`] loads an API's discovery document once
//! and validates every resource / method name against it before calling the
//! service. The [`bigquery`] and [`pubsub`] clients add defaults, pagination,
//! job polling and typed errors on top.
//!
//! # Module Structure
//!
//! - [`gcp`] - Credentials and the authenticated HTTP transport
//! - [`discovery`] - Discovery document model and dispatcher
//! - [`pagination`] - Page-token accumulation
//! - [`bigquery`] - BigQuery client
//! - [`pubsub`] - Pub/Sub client
//! - [`config`] - Persisted settings used by the `gapi` binary

pub mod bigquery;
pub mod config;
pub mod discovery;
pub mod gcp;
pub mod pagination;
pub mod pubsub;

pub use bigquery::BigQuery;
pub use discovery::{Dispatcher, Params};
pub use gcp::GcpCredentials;
pub use pubsub::PubSub;

/// Version injected at compile time via GAPI_VERSION env var, or "dev" for local builds.
pub const VERSION: &str = match option_env!("GAPI_VERSION") {
    Some(v) => v,
    None => "dev",
};
