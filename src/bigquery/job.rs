//! Jobs: load, query, extract, polling and query results

use super::error::{Error, Result};
use super::format::{detect_file_format, SourceFormat};
use super::options::{
    ExtractOptions, InsertFromSelectOptions, LoadOptions, QueryResultsOptions, SelectOptions,
    MAX_RESULTS,
};
use super::BigQuery;
use crate::discovery::Params;
use crate::gcp::http::MediaBody;
use crate::pagination::{collect_pages, Page};
use serde_json::{json, Value};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;

/// Default upper bound on [`BigQuery::wait_job`]
pub const JOB_WAIT_TIMEOUT: Duration = Duration::from_secs(600);
/// Default delay between two job status checks
pub const JOB_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// One query result row: column values in schema order
pub type Row = Vec<Value>;

/// How long and how often to poll a running job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobWaitPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for JobWaitPolicy {
    fn default() -> Self {
        Self {
            interval: JOB_POLL_INTERVAL,
            timeout: JOB_WAIT_TIMEOUT,
        }
    }
}

/// Id of a job created by this client. The job itself lives server-side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self(job_id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    fn from_response(response: &Value) -> Result<Self> {
        response
            .pointer("/jobReference/jobId")
            .and_then(Value::as_str)
            .map(Self::new)
            .ok_or_else(|| Error::UnexpectedResponse("response has no jobReference.jobId".into()))
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a job-creating call
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// Returned when the call was asynchronous
    Pending(JobHandle),
    /// The final job resource
    Done(Value),
}

/// Result of a query call
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Pending(JobHandle),
    Rows(Vec<Row>),
}

impl QueryOutcome {
    /// Rows of a finished query; empty for a pending one
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Self::Rows(rows) => rows,
            Self::Pending(_) => Vec::new(),
        }
    }
}

/// Data handed to [`BigQuery::load`]
#[derive(Debug, Clone, PartialEq)]
pub enum LoadData {
    /// JSON objects, uploaded as newline-delimited JSON
    Rows(Vec<Value>),
    /// CSV lines, uploaded as-is
    Lines(Vec<String>),
    /// `gs://` URIs the service reads directly
    Uris(Vec<String>),
    /// Local file uploaded from disk
    LocalPath(PathBuf),
    /// Literal file contents
    Raw(String),
}

/// What a [`LoadData`] turns into on the wire
#[derive(Debug)]
struct LoadSource {
    media: Option<MediaBody>,
    source_uris: Option<Vec<String>>,
    source_format: Option<SourceFormat>,
    field_delimiter: Option<&'static str>,
}

impl LoadData {
    /// Classify a free-form string: a `gs://` URI, an existing local path,
    /// or otherwise literal contents.
    pub fn infer(input: &str) -> Self {
        if input.starts_with("gs://") {
            Self::Uris(vec![input.to_string()])
        } else if std::path::Path::new(input).exists() {
            Self::LocalPath(PathBuf::from(input))
        } else {
            Self::Raw(input.to_string())
        }
    }

    fn into_source(self) -> Result<LoadSource> {
        let source = match self {
            Self::Rows(rows) => {
                if rows.is_empty() {
                    return Err(Error::Load("no rows to load".into()));
                }
                if let Some(index) = rows.iter().position(|row| !row.is_object()) {
                    return Err(Error::Load(format!("row {} is not a JSON object", index)));
                }
                let ndjson: Vec<String> = rows.iter().map(Value::to_string).collect();
                LoadSource {
                    media: Some(MediaBody::bytes(ndjson.join("\n"))),
                    source_uris: None,
                    source_format: Some(SourceFormat::NewlineDelimitedJson),
                    field_delimiter: None,
                }
            },
            Self::Lines(lines) => {
                if lines.is_empty() {
                    return Err(Error::Load("no lines to load".into()));
                }
                LoadSource {
                    media: Some(MediaBody::bytes(lines.join("\n"))),
                    source_uris: None,
                    source_format: Some(SourceFormat::Csv),
                    field_delimiter: None,
                }
            },
            Self::Uris(uris) => {
                let Some(first) = uris.first() else {
                    return Err(Error::Load("no source URIs".into()));
                };
                if let Some(bad) = uris.iter().find(|uri| !uri.starts_with("gs://")) {
                    return Err(Error::Load(format!("not a Cloud Storage URI: {}", bad)));
                }
                let detected = detect_file_format(first);
                LoadSource {
                    media: None,
                    source_format: detected.format,
                    field_delimiter: detected.field_delimiter,
                    source_uris: Some(uris),
                }
            },
            Self::LocalPath(path) => {
                if !path.is_file() {
                    return Err(Error::Load(format!("no such file: {}", path.display())));
                }
                let detected = detect_file_format(&path.to_string_lossy());
                LoadSource {
                    media: Some(MediaBody::file(path)),
                    source_uris: None,
                    source_format: detected.format,
                    field_delimiter: detected.field_delimiter,
                }
            },
            Self::Raw(contents) => LoadSource {
                media: Some(MediaBody::bytes(contents)),
                source_uris: None,
                source_format: None,
                field_delimiter: None,
            },
        };
        Ok(source)
    }
}

fn job_state(job: &Value) -> Option<&str> {
    job.pointer("/status/state").and_then(Value::as_str)
}

/// Only an explicit `jobComplete: false` means the rows are not ready
fn job_complete(response: &Value) -> bool {
    response.get("jobComplete").and_then(Value::as_bool) != Some(false)
}

fn page_token(response: &Value) -> Option<String> {
    response
        .get("pageToken")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Strip the `{"f": [{"v": ..}]}` wrapper from result rows
pub(crate) fn flatten_rows(response: &Value) -> Vec<Row> {
    let Some(rows) = response.get("rows").and_then(Value::as_array) else {
        return Vec::new();
    };

    rows.iter()
        .map(|row| {
            row.get("f")
                .and_then(Value::as_array)
                .map(|cells| {
                    cells
                        .iter()
                        .map(|cell| cell.get("v").cloned().unwrap_or(Value::Null))
                        .collect()
                })
                .unwrap_or_default()
        })
        .collect()
}

impl BigQuery {
    pub async fn info_job(&self, job_id: &str) -> Result<Value> {
        let params = Params::new()
            .with("projectId", self.project_id.as_str())
            .with("jobId", job_id);
        self.request("jobs", "get", params).await
    }

    pub async fn done_job(&self, job_id: &str) -> Result<bool> {
        let job = self.info_job(job_id).await?;
        Ok(job_state(&job) == Some("DONE"))
    }

    /// Poll a job until its state is `DONE`.
    ///
    /// The deadline is fixed before the first poll. Dropping the returned
    /// future stops polling; the remote job keeps running.
    pub async fn wait_job(&self, job_id: &str, timeout: Option<Duration>) -> Result<Value> {
        let timeout = timeout.unwrap_or(self.wait.timeout);
        // `None` when the timeout is too large to represent as an instant
        let deadline = Instant::now().checked_add(timeout);
        let mut polls = 0u32;

        loop {
            let job = self.info_job(job_id).await?;
            polls += 1;

            match job_state(&job) {
                Some("DONE") => {
                    tracing::info!("job {} done after {} polls", job_id, polls);
                    return Ok(job);
                },
                state => tracing::debug!("job {} state {:?}", job_id, state),
            }

            let now = Instant::now();
            if deadline.is_some_and(|deadline| now >= deadline) {
                return Err(Error::JobWaitTimeout {
                    job_id: job_id.to_string(),
                    timeout,
                });
            }
            match (now.checked_add(self.wait.interval), deadline) {
                (Some(next), Some(deadline)) => tokio::time::sleep_until(next.min(deadline)).await,
                (Some(next), None) => tokio::time::sleep_until(next).await,
                (None, _) => tokio::time::sleep(self.wait.interval).await,
            }
        }
    }

    async fn finish_job(
        &self,
        response: Value,
        asynchronous: bool,
        timeout: Option<Duration>,
    ) -> Result<JobOutcome> {
        let job = JobHandle::from_response(&response)?;
        if asynchronous {
            return Ok(JobOutcome::Pending(job));
        }
        Ok(JobOutcome::Done(self.wait_job(job.id(), timeout).await?))
    }

    /// Load data into a table with a load job.
    ///
    /// Explicit `source_format`, `field_delimiter` and `source_uris` options
    /// win over what was derived from `data`.
    pub async fn load(&self, table_id: &str, data: LoadData, opts: &LoadOptions) -> Result<JobOutcome> {
        let LoadSource {
            media,
            source_uris,
            source_format,
            field_delimiter,
        } = data.into_source()?;

        let mut configuration = json!({
            "allowJaggedRows": opts.allow_jagged_rows,
            "allowQuotedNewlines": opts.allow_quoted_newlines,
            "createDisposition": opts.create_disposition.as_deref().unwrap_or("CREATE_IF_NEEDED"),
            "destinationTable": {
                "projectId": self.project(&opts.project_id),
                "datasetId": self.dataset(&opts.dataset_id),
                "tableId": table_id,
            },
            "encoding": opts.encoding.as_deref().unwrap_or("UTF-8"),
            "fieldDelimiter": opts.field_delimiter.as_deref().or(field_delimiter),
            "ignoreUnknownValues": opts.ignore_unknown_values,
            "maxBadRecords": opts.max_bad_records,
            "projectionFields": opts.projection_fields,
            "quote": opts.quote,
            "skipLeadingRows": opts.skip_leading_rows,
            "sourceFormat": opts
                .source_format
                .as_deref()
                .or(source_format.as_ref().map(SourceFormat::as_str)),
            "sourceUris": opts.source_uris.as_ref().or(source_uris.as_ref()),
            "writeDisposition": opts.write_disposition.as_deref().unwrap_or("WRITE_APPEND"),
        });
        if let Some(fields) = &opts.schema {
            configuration["schema"] = json!({ "fields": fields });
        }

        let mut params = Params::new()
            .with("projectId", self.project_id.as_str())
            .with_body(json!({
                "configuration": { "load": configuration },
                "dryRun": opts.dry_run,
            }));
        if let Some(media) = media {
            params = params.with_media(media);
        }

        let response = self.request("jobs", "insert", params).await?;
        if opts.dry_run {
            return Ok(JobOutcome::Done(response));
        }
        self.finish_job(response, opts.asynchronous, opts.timeout).await
    }

    /// Run a query job whose results are written to `dest_table_id`
    pub async fn insert_from_select(
        &self,
        dest_table_id: &str,
        query: &str,
        opts: &InsertFromSelectOptions,
    ) -> Result<JobOutcome> {
        let params = Params::new()
            .with("projectId", self.project_id.as_str())
            .with_body(json!({
                "configuration": { "query": self.insert_from_select_configuration(dest_table_id, query, opts) },
                "dryRun": opts.dry_run,
            }));

        let response = self.request("jobs", "insert", params).await?;
        if opts.dry_run {
            return Ok(JobOutcome::Done(response));
        }
        self.finish_job(response, opts.asynchronous, opts.timeout).await
    }

    fn insert_from_select_configuration(
        &self,
        dest_table_id: &str,
        query: &str,
        opts: &InsertFromSelectOptions,
    ) -> Value {
        let mut configuration = json!({
            "allowLargeResults": opts.allow_large_results,
            "createDisposition": opts.create_disposition.as_deref().unwrap_or("CREATE_IF_NEEDED"),
            "destinationTable": {
                "projectId": self.project(&opts.dest_project_id),
                "datasetId": self.dataset(&opts.dest_dataset_id),
                "tableId": dest_table_id,
            },
            "flattenResults": opts.flatten_results.unwrap_or(true),
            "priority": opts.priority.as_deref().unwrap_or("INTERACTIVE"),
            "query": query,
            "tableDefinitions": opts.table_definitions,
            "useQueryCache": opts.use_query_cache,
            "userDefinedFunctionResources": opts.user_defined_function_resources,
            "writeDisposition": opts.write_disposition.as_deref().unwrap_or("WRITE_EMPTY"),
        });
        if let Some(dataset_id) = &opts.src_dataset_id {
            configuration["defaultDataset"] = json!({
                "projectId": self.project(&opts.src_project_id),
                "datasetId": dataset_id,
            });
        }
        configuration
    }

    /// Export a table to Cloud Storage.
    ///
    /// Format, delimiter and compression are derived from the first URI
    /// unless set explicitly.
    pub async fn extract(
        &self,
        table_id: &str,
        destination_uris: &[String],
        opts: &ExtractOptions,
    ) -> Result<JobOutcome> {
        let configuration = self.extract_configuration(table_id, destination_uris, opts)?;
        let params = Params::new()
            .with("projectId", self.project_id.as_str())
            .with_body(json!({ "configuration": { "extract": configuration } }));

        let response = self.request("jobs", "insert", params).await?;
        self.finish_job(response, opts.asynchronous, opts.timeout).await
    }

    fn extract_configuration(
        &self,
        table_id: &str,
        destination_uris: &[String],
        opts: &ExtractOptions,
    ) -> Result<Value> {
        let first = destination_uris
            .first()
            .ok_or_else(|| Error::Load("no destination URI".into()))?;
        let detected = detect_file_format(first);

        Ok(json!({
            "compression": opts.compression.as_deref().unwrap_or(detected.compression.as_str()),
            "destinationFormat": opts
                .destination_format
                .as_deref()
                .or(detected.format.as_ref().map(SourceFormat::as_str)),
            "destinationUris": destination_uris,
            "fieldDelimiter": opts.field_delimiter.as_deref().or(detected.field_delimiter),
            "printHeader": opts.print_header.unwrap_or(true),
            "sourceTable": {
                "projectId": self.project(&opts.project_id),
                "datasetId": self.dataset(&opts.dataset_id),
                "tableId": table_id,
            },
        }))
    }

    /// Run a query and return its rows, following result pages.
    ///
    /// When the query outlives the request timeout the job is polled to
    /// completion and the rows are read through `getQueryResults`.
    pub async fn select(&self, query: &str, opts: &SelectOptions) -> Result<QueryOutcome> {
        let response = self
            .request("jobs", "query", self.select_params(query, opts))
            .await?;

        if opts.asynchronous {
            return Ok(QueryOutcome::Pending(JobHandle::from_response(&response)?));
        }

        if !job_complete(&response) {
            let job = JobHandle::from_response(&response)?;
            self.wait_job(job.id(), opts.timeout).await?;
            let results = QueryResultsOptions {
                max_results: opts.max_results,
                timeout: opts.timeout,
                ..Default::default()
            };
            return self.get_query_results(job.id(), &results).await;
        }

        let mut rows = flatten_rows(&response);
        if let Some(token) = page_token(&response) {
            let job = JobHandle::from_response(&response)?;
            let start = rows.len() as u64;
            rows.extend(
                self.result_pages(job.id(), opts.max_results, None, token, start)
                    .await?,
            );
        }
        Ok(QueryOutcome::Rows(rows))
    }

    /// Alias of [`BigQuery::select`]
    pub async fn query(&self, query: &str, opts: &SelectOptions) -> Result<QueryOutcome> {
        self.select(query, opts).await
    }

    fn select_params(&self, query: &str, opts: &SelectOptions) -> Params {
        let mut body = json!({
            "query": query,
            "maxResults": opts.max_results.unwrap_or(MAX_RESULTS),
            "timeoutMs": opts.timeout_ms,
            "dryRun": opts.dry_run,
            "useQueryCache": opts.use_query_cache.unwrap_or(true),
        });
        if let Some(dataset_id) = &opts.dataset_id {
            body["defaultDataset"] = json!({
                "projectId": self.project(&opts.project_id),
                "datasetId": dataset_id,
            });
        }

        Params::new()
            .with("projectId", self.project_id.as_str())
            .with_body(body)
    }

    /// Rows of a query job, starting at `opts.page_token` / `opts.start_index`
    pub async fn get_query_results(
        &self,
        job_id: &str,
        opts: &QueryResultsOptions,
    ) -> Result<QueryOutcome> {
        let first_page = move || {
            self.query_results_page(
                job_id,
                opts.max_results,
                opts.timeout_ms,
                opts.page_token.clone(),
                opts.start_index,
            )
        };

        let mut response = first_page().await?;
        if opts.asynchronous {
            return Ok(QueryOutcome::Pending(JobHandle::new(job_id)));
        }
        if !job_complete(&response) {
            self.wait_job(job_id, opts.timeout).await?;
            response = first_page().await?;
        }

        let mut rows = flatten_rows(&response);
        if let Some(token) = page_token(&response) {
            let start = opts.start_index.unwrap_or(0) + rows.len() as u64;
            rows.extend(
                self.result_pages(job_id, opts.max_results, opts.timeout_ms, token, start)
                    .await?,
            );
        }
        Ok(QueryOutcome::Rows(rows))
    }

    /// Continuation pages after the first: page `n` starts at `start` plus
    /// the rows read before it.
    async fn result_pages(
        &self,
        job_id: &str,
        max_results: Option<u32>,
        timeout_ms: Option<u64>,
        token: String,
        start: u64,
    ) -> Result<Vec<Row>> {
        collect_pages(Some(token), move |cursor| async move {
            let response = self
                .query_results_page(
                    job_id,
                    max_results,
                    timeout_ms,
                    cursor.token,
                    Some(start + cursor.fetched as u64),
                )
                .await?;
            Ok::<_, Error>(Page::from_response(&response, "pageToken", flatten_rows))
        })
        .await
    }

    async fn query_results_page(
        &self,
        job_id: &str,
        max_results: Option<u32>,
        timeout_ms: Option<u64>,
        page_token: Option<String>,
        start_index: Option<u64>,
    ) -> Result<Value> {
        let params = Params::new()
            .with("projectId", self.project_id.as_str())
            .with("jobId", job_id)
            .with("maxResults", max_results.unwrap_or(MAX_RESULTS))
            .with_opt("pageToken", page_token)
            .with_opt("startIndex", start_index)
            .with_opt("timeoutMs", timeout_ms);
        self.request("jobs", "getQueryResults", params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigquery::tests::client;
    use std::io::Write;

    #[test]
    fn test_flatten_rows() {
        let response = json!({"rows": [
            {"f": [{"v": "1"}, {"v": "alice"}]},
            {"f": [{"v": "2"}, {"v": null}]},
        ]});
        assert_eq!(
            flatten_rows(&response),
            vec![vec![json!("1"), json!("alice")], vec![json!("2"), Value::Null]]
        );
        assert!(flatten_rows(&json!({"jobComplete": true})).is_empty());
    }

    #[test]
    fn test_job_complete_and_state() {
        assert!(job_complete(&json!({})));
        assert!(job_complete(&json!({"jobComplete": true})));
        assert!(!job_complete(&json!({"jobComplete": false})));
        assert_eq!(job_state(&json!({"status": {"state": "RUNNING"}})), Some("RUNNING"));
        assert_eq!(page_token(&json!({"pageToken": ""})), None);
    }

    #[test]
    fn test_job_handle_from_response() {
        let handle = JobHandle::from_response(&json!({"jobReference": {"jobId": "job_1"}})).unwrap();
        assert_eq!(handle.id(), "job_1");
        assert_eq!(handle.to_string(), "job_1");
        assert!(matches!(
            JobHandle::from_response(&json!({})),
            Err(Error::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_rows_become_ndjson() {
        let source = LoadData::Rows(vec![json!({"a": 1}), json!({"a": 2})])
            .into_source()
            .unwrap();
        assert_eq!(source.media, Some(MediaBody::bytes("{\"a\":1}\n{\"a\":2}")));
        assert_eq!(source.source_format, Some(SourceFormat::NewlineDelimitedJson));
    }

    #[test]
    fn test_unsupported_load_data() {
        assert!(matches!(
            LoadData::Rows(vec![json!("not an object")]).into_source(),
            Err(Error::Load(_))
        ));
        assert!(matches!(LoadData::Rows(vec![]).into_source(), Err(Error::Load(_))));
        assert!(matches!(LoadData::Uris(vec![]).into_source(), Err(Error::Load(_))));
        assert!(matches!(
            LoadData::Uris(vec!["https://example.com/x.csv".into()]).into_source(),
            Err(Error::Load(_))
        ));
        assert!(matches!(
            LoadData::LocalPath("/definitely/not/here.csv".into()).into_source(),
            Err(Error::Load(_))
        ));
    }

    #[test]
    fn test_uris_are_sniffed_from_the_first() {
        let source = LoadData::Uris(vec!["gs://b/a.tsv.gz".into(), "gs://b/b.tsv.gz".into()])
            .into_source()
            .unwrap();
        assert!(source.media.is_none());
        assert_eq!(source.source_format, Some(SourceFormat::Csv));
        assert_eq!(source.field_delimiter, Some("\t"));
        assert_eq!(source.source_uris.unwrap().len(), 2);
    }

    #[test]
    fn test_infer() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "1,alice").unwrap();
        let path = file.path().to_string_lossy().to_string();

        assert_eq!(LoadData::infer(&path), LoadData::LocalPath(PathBuf::from(&path)));
        assert_eq!(
            LoadData::infer("gs://bucket/x.json"),
            LoadData::Uris(vec!["gs://bucket/x.json".into()])
        );
        assert_eq!(LoadData::infer("1,alice\n2,bob"), LoadData::Raw("1,alice\n2,bob".into()));

        let source = LoadData::infer(&path).into_source().unwrap();
        assert_eq!(source.source_format, Some(SourceFormat::Csv));
        assert!(matches!(source.media, Some(MediaBody::File { .. })));
    }

    #[test]
    fn test_insert_from_select_configuration() {
        let bq = client().with_dataset("ds");
        let config = bq.insert_from_select_configuration(
            "summary",
            "SELECT 1",
            &InsertFromSelectOptions {
                src_dataset_id: Some("raw".into()),
                ..Default::default()
            },
        );

        assert_eq!(config["destinationTable"]["datasetId"], "ds");
        assert_eq!(config["destinationTable"]["projectId"], "default-project");
        assert_eq!(config["priority"], "INTERACTIVE");
        assert_eq!(config["createDisposition"], "CREATE_IF_NEEDED");
        assert_eq!(config["writeDisposition"], "WRITE_EMPTY");
        assert_eq!(config["flattenResults"], true);
        assert_eq!(config["defaultDataset"]["datasetId"], "raw");

        let config = bq.insert_from_select_configuration("t", "SELECT 1", &Default::default());
        assert!(config.get("defaultDataset").is_none());
    }

    #[test]
    fn test_extract_configuration() {
        let bq = client().with_dataset("ds");
        let config = bq
            .extract_configuration(
                "events",
                &["gs://bucket/events-*.csv.gz".to_string()],
                &ExtractOptions::default(),
            )
            .unwrap();

        assert_eq!(config["compression"], "GZIP");
        assert_eq!(config["destinationFormat"], "CSV");
        assert_eq!(config["fieldDelimiter"], ",");
        assert_eq!(config["printHeader"], true);
        assert_eq!(config["sourceTable"]["tableId"], "events");

        let config = bq
            .extract_configuration(
                "events",
                &["gs://bucket/events.csv".to_string()],
                &ExtractOptions {
                    field_delimiter: Some("|".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(config["fieldDelimiter"], "|");
        assert_eq!(config["compression"], "NONE");

        assert!(bq
            .extract_configuration("events", &[], &ExtractOptions::default())
            .is_err());
    }

    #[test]
    fn test_select_body() {
        let params = client().select_params("SELECT 1", &SelectOptions::default());
        let body = params.body().unwrap();
        assert_eq!(body["maxResults"], 100_000);
        assert_eq!(body["useQueryCache"], true);
        assert_eq!(body["dryRun"], false);
        assert!(body.get("defaultDataset").is_none());

        // The client default dataset is not applied to ad-hoc queries
        let params = client()
            .with_dataset("ds")
            .select_params("SELECT 1", &SelectOptions::default());
        assert!(params.body().unwrap().get("defaultDataset").is_none());

        let params = client().select_params(
            "SELECT 1",
            &SelectOptions {
                dataset_id: Some("ds".into()),
                ..Default::default()
            },
        );
        assert_eq!(params.body().unwrap()["defaultDataset"]["datasetId"], "ds");
    }

    #[test]
    fn test_default_wait_policy() {
        let policy = JobWaitPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(2));
        assert_eq!(policy.timeout, Duration::from_secs(600));
    }
}
