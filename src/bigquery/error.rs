use crate::discovery::{DispatchError, RequestPath};
use crate::gcp::auth::AuthError;
use crate::gcp::http::{HttpError, TransportError};
use serde_json::Value;
use std::time::Duration;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("already exists: {0}")]
    AlreadyExists(#[source] HttpError),
    #[error("not found: {0}")]
    NotFound(#[source] HttpError),
    #[error("required parameter is missing: {0}")]
    Parameter(#[source] HttpError),
    #[error("dataset is not empty: {0}")]
    DatasetIsNotEmpty(#[source] HttpError),
    #[error("client error: {0}")]
    Http4xx(#[source] HttpError),
    #[error("server error: {0}")]
    Http5xx(#[source] HttpError),
    /// Errors reported inside a 2xx response body
    #[error("BigQuery reported errors: {0}")]
    BigQuery(Value),
    #[error("cannot load data: {0}")]
    Load(String),
    #[error("job {job_id} did not finish within {timeout:?}")]
    JobWaitTimeout { job_id: String, timeout: Duration },
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Dispatch(DispatchError),
}

impl Error {
    /// Classify a dispatcher failure by HTTP status and message.
    ///
    /// `DatasetIsNotEmpty` only applies to `datasets.delete`. Token failures
    /// become [`Error::Auth`]; any other non-HTTP error is passed through.
    pub(crate) fn classify(path: &RequestPath, method: &str, err: DispatchError) -> Self {
        let err = match err {
            DispatchError::Transport(TransportError::Auth(e)) => return Self::Auth(e),
            err => err,
        };
        let Some(http) = err.http_error() else {
            return Self::Dispatch(err);
        };
        let http = http.clone();

        match http.status_code() {
            409 if http.mentions("already exists") => Self::AlreadyExists(http),
            404 if http.mentions("not found") => Self::NotFound(http),
            400 if http.mentions("required parameter is missing") => Self::Parameter(http),
            400 if http.mentions("still in use") && path.is("datasets") && method == "delete" => {
                Self::DatasetIsNotEmpty(http)
            },
            400..=499 => Self::Http4xx(http),
            500..=599 => Self::Http5xx(http),
            _ => Self::Dispatch(err),
        }
    }

    /// The underlying HTTP error, if the service produced one
    pub fn http_error(&self) -> Option<&HttpError> {
        match self {
            Self::AlreadyExists(e)
            | Self::NotFound(e)
            | Self::Parameter(e)
            | Self::DatasetIsNotEmpty(e)
            | Self::Http4xx(e)
            | Self::Http5xx(e) => Some(e),
            Self::Dispatch(e) => e.http_error(),
            _ => None,
        }
    }
}

impl From<DispatchError> for Error {
    fn from(err: DispatchError) -> Self {
        Self::Dispatch(err)
    }
}

/// Inspect a 2xx response for errors BigQuery embeds in the body.
///
/// Row-insert errors mentioning an unknown field always fail; other row
/// errors fail unless the request asked to skip invalid rows.
pub(crate) fn check_embedded_errors(response: &Value, skip_invalid_rows: bool) -> Result<()> {
    if let Some(insert_errors) = response.get("insertErrors").and_then(Value::as_array) {
        let row_errors = insert_errors
            .iter()
            .filter_map(|row| row.get("errors").and_then(Value::as_array))
            .flatten();

        for error in row_errors {
            let unknown_field = error
                .get("message")
                .and_then(Value::as_str)
                .map(|m| m.to_lowercase().contains("no such field"))
                .unwrap_or(false);

            if unknown_field || !skip_invalid_rows {
                return Err(Error::BigQuery(error.clone()));
            }
            tracing::debug!("skipping invalid row: {}", error);
        }
    } else if let Some(errors) = response.get("errors") {
        return Err(Error::BigQuery(errors.clone()));
    } else if let Some(errors) = response.pointer("/status/errors") {
        return Err(Error::BigQuery(errors.clone()));
    }

    Ok(())
}
