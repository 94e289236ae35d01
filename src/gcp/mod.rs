//! GCP plumbing shared by every API client
//!
//! # Module Structure
//!
//! - [`auth`] - Credential acquisition (ADC, service account key, static token)
//! - [`http`] - Authenticated HTTP transport and the HTTP error type

pub mod auth;
pub mod http;

pub use auth::{AuthError, GcpCredentials};
pub use http::{GcpHttpClient, HttpError, HttpRequest, MediaBody, RequestBody, TransportError};
