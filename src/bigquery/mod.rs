//! BigQuery client
//!
//! Convenience layer over the `bigquery` v2 discovery API: idempotent
//! dataset and table helpers, paginated listings, streaming inserts, load /
//! query / extract jobs and job polling.
//!
//! # Module Structure
//!
//! - [`error`] - Error taxonomy and response classification
//! - [`options`] - Per-call options
//! - [`format`] - File-format sniffing
//! - [`dataset`] / [`table`] - Dataset, table and table-data helpers
//! - [`job`] - Jobs, polling and query results
//!
//! # Example
//!
//! ```ignore
//! use gcp_api_clients::bigquery::{BigQuery, SelectOptions, BIGQUERY_SCOPE};
//! use gcp_api_clients::gcp::GcpCredentials;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let credentials = GcpCredentials::application_default(&[BIGQUERY_SCOPE]).await?;
//!     let bq = BigQuery::build("my-project", credentials).await?.with_dataset("analytics");
//!     bq.create_dataset("analytics", &Default::default()).await?;
//!     let rows = bq.select("SELECT 1", &SelectOptions::default()).await?;
//!     Ok(())
//! }
//! ```

pub mod dataset;
pub mod error;
pub mod format;
pub mod job;
pub mod options;
pub mod table;

pub use error::{Error, Result};
pub use format::{detect_file_format, Compression, FileFormat, SourceFormat};
pub use job::{JobHandle, JobOutcome, JobWaitPolicy, LoadData, QueryOutcome, Row};
pub use options::*;

use crate::discovery::{Dispatcher, Params, RequestPath, DISCOVERY_BASE_URL};
use crate::gcp::auth::GcpCredentials;
use error::check_embedded_errors;
use serde_json::Value;

/// OAuth scope requested when no explicit scope is configured
pub const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";

/// BigQuery client bound to a default project and, optionally, a default dataset.
///
/// Defaults are fixed at construction. Per-call overrides go through the
/// option structs and never change the client.
#[derive(Debug, Clone)]
pub struct BigQuery {
    dispatcher: Dispatcher,
    project_id: String,
    dataset_id: Option<String>,
    wait: JobWaitPolicy,
}

impl BigQuery {
    /// Fetch the `bigquery` v2 discovery document and build a client
    pub async fn build(project_id: impl Into<String>, credentials: GcpCredentials) -> Result<Self> {
        Self::build_from(DISCOVERY_BASE_URL, project_id, credentials).await
    }

    /// Same as [`BigQuery::build`] with a custom discovery directory
    pub async fn build_from(
        discovery_base: &str,
        project_id: impl Into<String>,
        credentials: GcpCredentials,
    ) -> Result<Self> {
        let dispatcher = Dispatcher::build_from(discovery_base, "bigquery", "v2", credentials).await?;
        Ok(Self::from_dispatcher(dispatcher, project_id))
    }

    pub fn from_dispatcher(dispatcher: Dispatcher, project_id: impl Into<String>) -> Self {
        Self {
            dispatcher,
            project_id: project_id.into(),
            dataset_id: None,
            wait: JobWaitPolicy::default(),
        }
    }

    /// Set the dataset used when a call does not name one
    pub fn with_dataset(mut self, dataset_id: impl Into<String>) -> Self {
        self.dataset_id = Some(dataset_id.into());
        self
    }

    pub fn with_wait_policy(mut self, wait: JobWaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn dataset_id(&self) -> Option<&str> {
        self.dataset_id.as_deref()
    }

    pub fn wait_policy(&self) -> &JobWaitPolicy {
        &self.wait
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Call a BigQuery method and classify the outcome.
    ///
    /// Non-2xx responses become the typed errors in [`Error`]; 2xx responses
    /// that carry `insertErrors`, `errors` or `status.errors` become
    /// [`Error::BigQuery`].
    pub async fn request(
        &self,
        path: impl Into<RequestPath>,
        method: &str,
        params: Params,
    ) -> Result<Value> {
        let path = path.into();
        let skip_invalid_rows = params
            .body()
            .and_then(|body| body.get("skipInvalidRows"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let response = self
            .dispatcher
            .request(path.clone(), method, params)
            .await
            .map_err(|e| Error::classify(&path, method, e))?;

        check_embedded_errors(&response, skip_invalid_rows)?;
        Ok(response)
    }

    fn project<'a>(&'a self, project_id: &'a Option<String>) -> &'a str {
        project_id.as_deref().unwrap_or(&self.project_id)
    }

    fn dataset<'a>(&'a self, dataset_id: &'a Option<String>) -> Option<&'a str> {
        dataset_id.as_deref().or(self.dataset_id.as_deref())
    }
}
