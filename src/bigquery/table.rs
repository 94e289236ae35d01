//! Table and table-data helpers

use super::dataset::reference_ids;
use super::error::{Error, Result};
use super::options::{CreateTableOptions, DumpOptions, InsertOptions, ListOptions, Target, MAX_RESULTS};
use super::BigQuery;
use crate::discovery::{is_non_empty, Params};
use crate::pagination::{collect_pages, Page};
use serde_json::{json, Value};

impl BigQuery {
    /// Create a table, or a view when `opts.query` is set. Returns `None` when it already exists.
    pub async fn create_table(
        &self,
        table_id: &str,
        opts: &CreateTableOptions,
    ) -> Result<Option<Value>> {
        match self
            .request("tables", "insert", self.table_insert_params(table_id, opts))
            .await
        {
            Ok(created) => Ok(Some(created)),
            Err(Error::AlreadyExists(e)) => {
                tracing::warn!("table {} already exists: {}", table_id, e.message);
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }

    pub async fn create_view(
        &self,
        table_id: &str,
        query: &str,
        opts: &CreateTableOptions,
    ) -> Result<Option<Value>> {
        let opts = CreateTableOptions {
            query: Some(query.to_string()),
            ..opts.clone()
        };
        self.create_table(table_id, &opts).await
    }

    fn table_insert_params(&self, table_id: &str, opts: &CreateTableOptions) -> Params {
        let project_id = self.project(&opts.project_id);
        let dataset_id = self.dataset(&opts.dataset_id);

        let mut body = json!({
            "description": opts.description,
            "expirationTime": opts.expiration_time,
            "externalDataConfiguration": opts.external_data_configuration,
            "friendlyName": opts.friendly_name,
            "tableReference": {
                "projectId": project_id,
                "datasetId": dataset_id,
                "tableId": table_id,
            },
        });
        if let Some(fields) = &opts.schema {
            body["schema"] = json!({ "fields": fields });
        }
        if let Some(query) = &opts.query {
            body["view"] = json!({ "query": query });
        }

        Params::new()
            .with("projectId", project_id)
            .with_opt("datasetId", dataset_id)
            .with_body(body)
    }

    /// Delete a table. Returns `false` when it did not exist.
    pub async fn drop_table(&self, table_id: &str, target: &Target) -> Result<bool> {
        match self
            .request("tables", "delete", self.table_params(table_id, target))
            .await
        {
            Ok(_) => Ok(true),
            Err(Error::NotFound(e)) => {
                tracing::warn!("table {} not found: {}", table_id, e.message);
                Ok(false)
            },
            Err(e) => Err(e),
        }
    }

    /// Table resource, or `None` when it does not exist
    pub async fn info_table(&self, table_id: &str, target: &Target) -> Result<Option<Value>> {
        match self
            .request("tables", "get", self.table_params(table_id, target))
            .await
        {
            Ok(table) => Ok(Some(table)),
            Err(Error::NotFound(e)) => {
                tracing::warn!("table {} not found: {}", table_id, e.message);
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }

    pub async fn exists_table(&self, table_id: &str, target: &Target) -> Result<bool> {
        Ok(self
            .info_table(table_id, target)
            .await?
            .is_some_and(|table| is_non_empty(&table)))
    }

    fn table_params(&self, table_id: &str, target: &Target) -> Params {
        Params::new()
            .with("projectId", self.project(&target.project_id))
            .with_opt("datasetId", self.dataset(&target.dataset_id))
            .with("tableId", table_id)
    }

    /// Ids of every table in the dataset, following page tokens
    pub async fn show_tables(&self, opts: &ListOptions) -> Result<Vec<String>> {
        collect_pages(opts.page_token.clone(), move |cursor| async move {
            let params = Params::new()
                .with("projectId", self.project(&opts.project_id))
                .with_opt("datasetId", self.dataset(&opts.dataset_id))
                .with("maxResults", opts.max_results.unwrap_or(MAX_RESULTS))
                .with_opt("pageToken", cursor.token);

            let response = self.request("tables", "list", params).await?;
            Ok::<_, Error>(Page::from_response(&response, "nextPageToken", |r| {
                reference_ids(r, "tables", "/tableReference/tableId")
            }))
        })
        .await
    }

    /// Stream rows into a table with `tabledata.insertAll`.
    ///
    /// Row errors naming an unknown field always fail. Other row errors are
    /// tolerated only with `skip_invalid_rows`.
    pub async fn insert(&self, table_id: &str, rows: &[Value], opts: &InsertOptions) -> Result<Value> {
        let params = self
            .table_params(
                table_id,
                &Target {
                    project_id: opts.project_id.clone(),
                    dataset_id: opts.dataset_id.clone(),
                },
            )
            .with_body(insert_all_body(rows, opts));

        self.request("tabledata", "insertAll", params).await
    }

    /// Every row of a table in its raw `{"f": [{"v": ..}]}` form.
    ///
    /// Each continuation page starts at the caller's `start_index` plus the
    /// number of rows already read.
    pub async fn dump_table(&self, table_id: &str, opts: &DumpOptions) -> Result<Vec<Value>> {
        let target = Target {
            project_id: opts.project_id.clone(),
            dataset_id: opts.dataset_id.clone(),
        };
        let target = &target;
        let initial = opts.start_index;

        collect_pages(opts.page_token.clone(), move |cursor| async move {
            let start_index = match (initial, cursor.fetched) {
                (initial, 0) => initial,
                (initial, fetched) => Some(initial.unwrap_or(0) + fetched as u64),
            };
            let params = self
                .table_params(table_id, target)
                .with("maxResults", opts.max_results.unwrap_or(MAX_RESULTS))
                .with_opt("pageToken", cursor.token)
                .with_opt("startIndex", start_index);

            let response = self.request("tabledata", "list", params).await?;
            Ok::<_, Error>(Page::from_response(&response, "pageToken", |r| {
                r.get("rows")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default()
            }))
        })
        .await
    }
}

fn insert_all_body(rows: &[Value], opts: &InsertOptions) -> Value {
    json!({
        "rows": rows.iter().map(|row| json!({ "json": row })).collect::<Vec<_>>(),
        "ignoreUnknownValues": opts.ignore_unknown_values,
        "skipInvalidRows": opts.skip_invalid_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigquery::tests::client;

    #[test]
    fn test_table_body_uses_default_dataset() {
        let params = client().with_dataset("ds").table_insert_params(
            "events",
            &CreateTableOptions {
                schema: Some(json!([{"name": "id", "type": "INTEGER"}])),
                ..Default::default()
            },
        );

        assert_eq!(params.get("datasetId"), Some(&json!("ds")));
        let body = params.body().unwrap();
        assert_eq!(body["tableReference"]["tableId"], "events");
        assert_eq!(body["tableReference"]["datasetId"], "ds");
        assert_eq!(body["schema"]["fields"][0]["name"], "id");
        assert!(body.get("view").is_none());
    }

    #[test]
    fn test_view_body() {
        let params = client().table_insert_params(
            "v",
            &CreateTableOptions {
                dataset_id: Some("ds".into()),
                query: Some("SELECT 1".into()),
                ..Default::default()
            },
        );
        let body = params.body().unwrap();
        assert_eq!(body["view"]["query"], "SELECT 1");
        assert!(body.get("schema").is_none());
    }

    #[test]
    fn test_insert_all_body() {
        let body = insert_all_body(
            &[json!({"id": 1}), json!({"id": 2})],
            &InsertOptions {
                skip_invalid_rows: true,
                ..Default::default()
            },
        );
        assert_eq!(
            body,
            json!({
                "rows": [{"json": {"id": 1}}, {"json": {"id": 2}}],
                "ignoreUnknownValues": false,
                "skipInvalidRows": true,
            })
        );
    }

    #[test]
    fn test_missing_dataset_is_left_to_the_service() {
        let params = client().table_params("t", &Target::default());
        assert!(params.get("datasetId").is_none());
    }
}
