//! Generic discovery-driven API client
//!
//! Google publishes a machine-readable description of every REST API. The
//! [`Dispatcher`] fetches one at build time and uses it to validate resource
//! and method names locally before any call goes out.
//!
//! # Module Structure
//!
//! - [`document`] - Discovery document model and the resource lookup table
//! - [`params`] - Caller parameters and the filtered bag forwarded to a method
//! - [`dispatcher`] - Name resolution, URL building and request execution
//!
//! # Example
//!
//! ```ignore
//! use gcp_api_clients::discovery::{Dispatcher, Params};
//! use gcp_api_clients::gcp::GcpCredentials;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let credentials = GcpCredentials::application_default(&[]).await?;
//!     let pubsub = Dispatcher::build("pubsub", "v1", credentials).await?;
//!     let topics = pubsub
//!         .request(["projects", "topics"], "list", Params::new().with("project", "projects/my-project"))
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod dispatcher;
pub mod document;
pub mod params;

pub(crate) use dispatcher::is_non_empty;
pub use dispatcher::{DispatchError, Dispatcher, RequestPath, DISCOVERY_BASE_URL};
pub use document::{DiscoveryDocument, MethodDescriptor, ParameterDescriptor, ParameterLocation};
pub use params::{ParameterBag, Params};
