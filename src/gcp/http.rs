//! HTTP utilities for GCP REST API calls

use super::auth::AuthError;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::path::PathBuf;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Mime type used for uploads when the caller does not name one
pub const DEFAULT_MEDIA_MIME_TYPE: &str = "application/octet-stream";

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// A non-2xx response from a Google API.
#[derive(Debug, Clone, thiserror::Error)]
#[error("HTTP {status}: {message}")]
pub struct HttpError {
    pub status: StatusCode,
    /// `error.message` from the JSON error body, or the raw body
    pub message: String,
    pub body: String,
}

impl HttpError {
    fn from_response(status: StatusCode, body: String) -> Self {
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.clone());

        Self {
            status,
            message,
            body,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Case-insensitive search over the message and the raw body
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.message.to_lowercase().contains(&needle) || self.body.to_lowercase().contains(&needle)
    }
}

/// Errors surfaced by the transport layer
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("API request failed: {0}")]
    Http(#[from] HttpError),
    #[error("failed to send request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to read media file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl TransportError {
    /// The HTTP error, when the server answered with a non-2xx status
    pub fn http_error(&self) -> Option<&HttpError> {
        match self {
            Self::Http(err) => Some(err),
            _ => None,
        }
    }
}

/// Media payload attached to an upload request
#[derive(Debug, Clone, PartialEq)]
pub enum MediaBody {
    Bytes { data: Vec<u8>, mime_type: String },
    File { path: PathBuf, mime_type: String },
}

impl MediaBody {
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::Bytes {
            data: data.into(),
            mime_type: DEFAULT_MEDIA_MIME_TYPE.to_string(),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            mime_type: DEFAULT_MEDIA_MIME_TYPE.to_string(),
        }
    }

    pub fn mime_type(&self) -> &str {
        match self {
            Self::Bytes { mime_type, .. } | Self::File { mime_type, .. } => mime_type,
        }
    }

    async fn read(&self) -> std::io::Result<Vec<u8>> {
        match self {
            Self::Bytes { data, .. } => Ok(data.clone()),
            Self::File { path, .. } => tokio::fs::read(path).await,
        }
    }
}

/// Body of an outgoing request
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    /// `uploadType=media`: the payload alone
    Media(MediaBody),
    /// `uploadType=multipart`: JSON metadata followed by the payload
    Multipart { metadata: Value, media: MediaBody },
}

/// A fully resolved request ready to be sent
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub body: RequestBody,
}

/// Build a `multipart/related` payload; returns (content type, bytes)
fn multipart_related(metadata: &Value, mime_type: &str, media: &[u8]) -> (String, Vec<u8>) {
    let boundary = format!("==============={}==", uuid::Uuid::new_v4().simple());
    let mut out = Vec::with_capacity(media.len() + 256);

    out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    out.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    out.extend_from_slice(metadata.to_string().as_bytes());
    out.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    out.extend_from_slice(format!("Content-Type: {mime_type}\r\n\r\n").as_bytes());
    out.extend_from_slice(media);
    out.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    (format!("multipart/related; boundary={boundary}"), out)
}

/// HTTP client wrapper for GCP API calls
#[derive(Clone, Debug)]
pub struct GcpHttpClient {
    client: Client,
}

impl GcpHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("gcp-api-clients/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Unauthenticated GET returning JSON (used for discovery documents)
    pub async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        Self::decode(response).await
    }

    /// Send a request, attaching the bearer token when one is given
    pub async fn send(
        &self,
        request: HttpRequest,
        token: Option<&str>,
    ) -> Result<Value, TransportError> {
        tracing::debug!("{} {}", request.method, request.url);

        let mut builder = self.client.request(request.method, request.url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Media(media) => builder
                .header(reqwest::header::CONTENT_TYPE, media.mime_type())
                .body(media.read().await?),
            RequestBody::Multipart { metadata, media } => {
                let data = media.read().await?;
                let (content_type, payload) =
                    multipart_related(&metadata, media.mime_type(), &data);
                builder
                    .header(reqwest::header::CONTENT_TYPE, content_type)
                    .body(payload)
            },
        };

        let response = builder.send().await?;
        Self::decode(response).await
    }

    async fn decode(response: reqwest::Response) -> Result<Value, TransportError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(HttpError::from_response(status, body).into());
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Format a GCP API error for display
/// Security: Sanitizes error messages to avoid leaking sensitive API details
pub fn format_gcp_error(error: &anyhow::Error) -> String {
    let status = error
        .chain()
        .find_map(|e| e.downcast_ref::<HttpError>())
        .map(HttpError::status_code);

    match status {
        Some(401) => {
            return "Authentication failed. Run 'gcloud auth application-default login'."
                .to_string()
        },
        Some(403) => return "Permission denied. Check your GCP IAM permissions.".to_string(),
        Some(429) => return "Rate limit exceeded. Please try again later.".to_string(),
        Some(500..=599) => {
            return "GCP service temporarily unavailable. Please try again.".to_string()
        },
        _ => {},
    }

    // Truncate long error messages and remove potential sensitive data
    let error_str = format!("{:#}", error);
    let sanitized = error_str
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(160)
        .collect::<String>();

    if sanitized.len() < error_str.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}
