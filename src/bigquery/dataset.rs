//! Dataset helpers

use super::error::{Error, Result};
use super::options::{
    CreateDatasetOptions, DropDatasetOptions, ListOptions, Target, DEFAULT_LOCATION, MAX_RESULTS,
};
use super::BigQuery;
use crate::discovery::{is_non_empty, Params};
use crate::pagination::{collect_pages, Page};
use serde_json::{json, Value};

impl BigQuery {
    /// Create a dataset. Returns `None` when it already exists.
    pub async fn create_dataset(
        &self,
        dataset_id: &str,
        opts: &CreateDatasetOptions,
    ) -> Result<Option<Value>> {
        match self
            .request("datasets", "insert", self.dataset_insert_params(dataset_id, opts))
            .await
        {
            Ok(created) => Ok(Some(created)),
            Err(Error::AlreadyExists(e)) => {
                tracing::warn!("dataset {} already exists: {}", dataset_id, e.message);
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }

    fn dataset_insert_params(&self, dataset_id: &str, opts: &CreateDatasetOptions) -> Params {
        Params::new()
            .with("projectId", self.project_id.as_str())
            .with_body(json!({
                "access": opts.access,
                "datasetReference": {
                    "projectId": self.project(&opts.project_id),
                    "datasetId": dataset_id,
                },
                "defaultTableExpirationMs": opts.default_table_expiration_ms,
                "description": opts.description,
                "friendlyName": opts.friendly_name,
                "location": opts.location.as_deref().unwrap_or(DEFAULT_LOCATION),
            }))
    }

    /// Delete a dataset. Returns `false` when it did not exist.
    ///
    /// A dataset that still holds tables fails with
    /// [`Error::DatasetIsNotEmpty`] unless `delete_contents` is set.
    pub async fn drop_dataset(&self, dataset_id: &str, opts: &DropDatasetOptions) -> Result<bool> {
        let params = Params::new()
            .with("projectId", self.project(&opts.project_id))
            .with("datasetId", dataset_id)
            .with("deleteContents", opts.delete_contents);

        match self.request("datasets", "delete", params).await {
            Ok(_) => Ok(true),
            Err(Error::NotFound(e)) => {
                tracing::warn!("dataset {} not found: {}", dataset_id, e.message);
                Ok(false)
            },
            Err(e) => Err(e),
        }
    }

    /// Dataset resource, or `None` when it does not exist
    pub async fn info_dataset(&self, dataset_id: &str, target: &Target) -> Result<Option<Value>> {
        let params = Params::new()
            .with("projectId", self.project(&target.project_id))
            .with("datasetId", dataset_id);

        match self.request("datasets", "get", params).await {
            Ok(dataset) => Ok(Some(dataset)),
            Err(Error::NotFound(e)) => {
                tracing::warn!("dataset {} not found: {}", dataset_id, e.message);
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }

    pub async fn exists_dataset(&self, dataset_id: &str, target: &Target) -> Result<bool> {
        Ok(self
            .info_dataset(dataset_id, target)
            .await?
            .is_some_and(|dataset| is_non_empty(&dataset)))
    }

    /// Ids of every dataset in the project, following page tokens
    pub async fn show_datasets(&self, opts: &ListOptions) -> Result<Vec<String>> {
        collect_pages(opts.page_token.clone(), move |cursor| async move {
            let params = Params::new()
                .with("projectId", self.project(&opts.project_id))
                .with_opt("all", opts.all)
                .with("maxResults", opts.max_results.unwrap_or(MAX_RESULTS))
                .with_opt("pageToken", cursor.token);

            let response = self.request("datasets", "list", params).await?;
            Ok::<_, Error>(Page::from_response(&response, "nextPageToken", |r| {
                reference_ids(r, "datasets", "/datasetReference/datasetId")
            }))
        })
        .await
    }
}

/// Collect `pointer` out of each element of `response[list_key]`
pub(crate) fn reference_ids(response: &Value, list_key: &str, pointer: &str) -> Vec<String> {
    response
        .get(list_key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.pointer(pointer).and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
