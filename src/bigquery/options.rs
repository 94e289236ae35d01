//! Per-call options for the BigQuery client.
//!
//! Every `project_id` / `dataset_id` here overrides the client default for
//! one call only. Fields left as `None` are omitted from the request or
//! replaced by the documented default.

use serde_json::Value;
use std::time::Duration;

/// Page size used when the caller does not set one
pub const MAX_RESULTS: u32 = 100_000;
/// Location for new datasets
pub const DEFAULT_LOCATION: &str = "US";

/// Override of the project / dataset a call targets
#[derive(Debug, Clone, Default)]
pub struct Target {
    pub project_id: Option<String>,
    pub dataset_id: Option<String>,
}

impl Target {
    pub fn project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            dataset_id: None,
        }
    }

    pub fn dataset(dataset_id: impl Into<String>) -> Self {
        Self {
            project_id: None,
            dataset_id: Some(dataset_id.into()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateDatasetOptions {
    pub project_id: Option<String>,
    pub access: Option<Value>,
    pub default_table_expiration_ms: Option<i64>,
    pub description: Option<String>,
    pub friendly_name: Option<String>,
    /// Defaults to [`DEFAULT_LOCATION`]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DropDatasetOptions {
    pub project_id: Option<String>,
    pub delete_contents: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub project_id: Option<String>,
    pub dataset_id: Option<String>,
    /// Include hidden datasets
    pub all: Option<bool>,
    pub max_results: Option<u32>,
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateTableOptions {
    pub project_id: Option<String>,
    pub dataset_id: Option<String>,
    pub description: Option<String>,
    pub expiration_time: Option<i64>,
    pub external_data_configuration: Option<Value>,
    pub friendly_name: Option<String>,
    /// Field list, sent as `schema.fields`
    pub schema: Option<Value>,
    /// Makes the table a view
    pub query: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InsertOptions {
    pub project_id: Option<String>,
    pub dataset_id: Option<String>,
    pub ignore_unknown_values: bool,
    pub skip_invalid_rows: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DumpOptions {
    pub project_id: Option<String>,
    pub dataset_id: Option<String>,
    pub max_results: Option<u32>,
    pub page_token: Option<String>,
    pub start_index: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub project_id: Option<String>,
    pub dataset_id: Option<String>,
    pub allow_jagged_rows: Option<bool>,
    pub allow_quoted_newlines: Option<bool>,
    pub create_disposition: Option<String>,
    pub encoding: Option<String>,
    pub field_delimiter: Option<String>,
    pub ignore_unknown_values: bool,
    pub max_bad_records: Option<u32>,
    pub projection_fields: Option<Vec<String>>,
    pub quote: Option<String>,
    pub skip_leading_rows: Option<u32>,
    pub source_format: Option<String>,
    pub source_uris: Option<Vec<String>>,
    pub write_disposition: Option<String>,
    pub schema: Option<Value>,
    pub dry_run: bool,
    /// Return the job handle without waiting
    pub asynchronous: bool,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct InsertFromSelectOptions {
    pub dest_project_id: Option<String>,
    pub dest_dataset_id: Option<String>,
    pub src_project_id: Option<String>,
    /// Sets `defaultDataset` for unqualified table names in the query
    pub src_dataset_id: Option<String>,
    pub allow_large_results: Option<bool>,
    pub create_disposition: Option<String>,
    pub flatten_results: Option<bool>,
    pub priority: Option<String>,
    pub table_definitions: Option<Value>,
    pub use_query_cache: Option<bool>,
    pub user_defined_function_resources: Option<Value>,
    pub write_disposition: Option<String>,
    pub dry_run: bool,
    pub asynchronous: bool,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub project_id: Option<String>,
    pub dataset_id: Option<String>,
    pub compression: Option<String>,
    pub destination_format: Option<String>,
    pub field_delimiter: Option<String>,
    pub print_header: Option<bool>,
    pub asynchronous: bool,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    pub project_id: Option<String>,
    /// Sets `defaultDataset`; the client's default dataset is not applied here
    pub dataset_id: Option<String>,
    pub max_results: Option<u32>,
    pub timeout_ms: Option<u64>,
    pub dry_run: bool,
    pub use_query_cache: Option<bool>,
    pub asynchronous: bool,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct QueryResultsOptions {
    pub max_results: Option<u32>,
    pub page_token: Option<String>,
    pub start_index: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub asynchronous: bool,
    pub timeout: Option<Duration>,
}
