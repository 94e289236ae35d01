//! Discovery-backed dispatcher
//!
//! Resolves a resource path and method name against a fetched discovery
//! document, then turns the filtered parameters into a concrete HTTP request.

use super::document::{DiscoveryDocument, MethodDescriptor, MethodTable, ParameterLocation};
use super::params::{ParameterBag, Params};
use crate::gcp::auth::GcpCredentials;
use crate::gcp::http::{GcpHttpClient, HttpError, HttpRequest, RequestBody, TransportError};
use reqwest::Method;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Where discovery documents are fetched from
pub const DISCOVERY_BASE_URL: &str = "https://www.googleapis.com/discovery/v1/apis";

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown resource name: {0}")]
    ResourceName(String),
    #[error("unknown method name: {0}")]
    MethodName(String),
    #[error("failed to fetch discovery document for {api} {version}: {source}")]
    DiscoveryFetch {
        api: String,
        version: String,
        #[source]
        source: TransportError,
    },
    #[error("method {0} does not accept media uploads")]
    MediaUnsupported(String),
    #[error("invalid discovery document: {0}")]
    InvalidDocument(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl DispatchError {
    /// The HTTP error, when the service answered with a non-2xx status
    pub fn http_error(&self) -> Option<&HttpError> {
        match self {
            Self::Transport(err) => err.http_error(),
            _ => None,
        }
    }
}

/// Ordered resource names locating a nested resource, e.g. `projects.topics`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath(Vec<String>);

impl RequestPath {
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is(&self, dotted: &str) -> bool {
        self.to_string() == dotted
    }
}

impl fmt::Display for RequestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl From<&str> for RequestPath {
    fn from(resource: &str) -> Self {
        Self(vec![resource.to_string()])
    }
}

impl From<String> for RequestPath {
    fn from(resource: String) -> Self {
        Self(vec![resource])
    }
}

impl From<&[&str]> for RequestPath {
    fn from(segments: &[&str]) -> Self {
        Self(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RequestPath {
    fn from(segments: [&str; N]) -> Self {
        Self(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<String>> for RequestPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

/// One (api, version) worth of discovery metadata plus an authenticated transport.
///
/// The document is read-only after construction; clones share it.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    api: String,
    version: String,
    document: Arc<DiscoveryDocument>,
    methods: Arc<MethodTable>,
    http: GcpHttpClient,
    credentials: GcpCredentials,
}

impl Dispatcher {
    /// Fetch the discovery document for `api`/`version` from the public directory
    pub async fn build(
        api: &str,
        version: &str,
        credentials: GcpCredentials,
    ) -> Result<Self, DispatchError> {
        Self::build_from(DISCOVERY_BASE_URL, api, version, credentials).await
    }

    /// Fetch the discovery document from `{discovery_base}/{api}/{version}/rest`
    pub async fn build_from(
        discovery_base: &str,
        api: &str,
        version: &str,
        credentials: GcpCredentials,
    ) -> Result<Self, DispatchError> {
        let fetch_error = |source| DispatchError::DiscoveryFetch {
            api: api.to_string(),
            version: version.to_string(),
            source,
        };

        let http = GcpHttpClient::new()?;
        let url = format!(
            "{}/{}/{}/rest",
            discovery_base.trim_end_matches('/'),
            api,
            version
        );
        let raw = http.get_json(&url).await.map_err(fetch_error)?;
        let document: DiscoveryDocument = serde_json::from_value(raw)
            .map_err(|e| fetch_error(TransportError::Decode(e)))?;

        Ok(Self::with_parts(document, http, credentials))
    }

    /// Use an already parsed document
    pub fn from_document(
        document: DiscoveryDocument,
        credentials: GcpCredentials,
    ) -> Result<Self, DispatchError> {
        Ok(Self::with_parts(document, GcpHttpClient::new()?, credentials))
    }

    fn with_parts(
        document: DiscoveryDocument,
        http: GcpHttpClient,
        credentials: GcpCredentials,
    ) -> Self {
        let methods = MethodTable::build(&document);
        tracing::info!(
            "Loaded discovery document for {} {} ({} resources)",
            document.name,
            document.version,
            methods.len()
        );

        Self {
            api: document.name.clone(),
            version: document.version.clone(),
            document: Arc::new(document),
            methods: Arc::new(methods),
            http,
            credentials,
        }
    }

    pub fn api(&self) -> &str {
        &self.api
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn document(&self) -> &DiscoveryDocument {
        &self.document
    }

    /// Look up `method` on the resource at `path`.
    ///
    /// Segments are checked left to right; the first one the document does
    /// not declare is reported.
    pub fn resolve(
        &self,
        path: &RequestPath,
        method: &str,
    ) -> Result<&MethodDescriptor, DispatchError> {
        let mut key = String::new();
        for segment in path.segments() {
            if !key.is_empty() {
                key.push('.');
            }
            key.push_str(segment);
            if self.methods.methods(&key).is_none() {
                return Err(DispatchError::ResourceName(segment.clone()));
            }
        }

        self.methods
            .methods(&key)
            .ok_or_else(|| DispatchError::ResourceName(key.clone()))?
            .get(method)
            .ok_or_else(|| DispatchError::MethodName(method.to_string()))
    }

    /// Turn a resolved method and its parameter bag into an HTTP request
    pub fn prepare(
        &self,
        method: &MethodDescriptor,
        bag: ParameterBag,
    ) -> Result<HttpRequest, DispatchError> {
        let http_method = Method::from_bytes(method.http_method.as_bytes()).map_err(|_| {
            DispatchError::InvalidDocument(format!(
                "{} has HTTP method {}",
                method.id, method.http_method
            ))
        })?;

        let ParameterBag {
            values,
            body,
            media_body,
        } = bag;

        let (base, template, upload_type) = match (&media_body, method.simple_upload_path()) {
            (Some(_), Some(upload_path)) => {
                let upload_type = if body.is_some() { "multipart" } else { "media" };
                (
                    self.document.root_url.trim_end_matches('/').to_string(),
                    upload_path,
                    Some(upload_type),
                )
            },
            (Some(_), None) => return Err(DispatchError::MediaUnsupported(method.id.clone())),
            (None, _) => (
                format!("{}{}", self.document.root_url, self.document.service_path),
                method.path.as_str(),
                None,
            ),
        };

        let mut url = Url::parse(&format!("{}{}", base, expand_template(template, &values)))
            .map_err(TransportError::from)?;

        let mut query: Vec<(String, String)> = Vec::new();
        for (name, value) in &values {
            let is_query = method
                .parameters
                .get(name)
                .map(|p| p.location == ParameterLocation::Query)
                .unwrap_or(false);
            if !is_query {
                continue;
            }
            match value {
                Value::Array(items) => {
                    for item in items {
                        query.push((name.clone(), render_value(item)));
                    }
                },
                other => query.push((name.clone(), render_value(other))),
            }
        }
        if let Some(upload_type) = upload_type {
            query.push(("uploadType".to_string(), upload_type.to_string()));
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let body = match (body, media_body) {
            (Some(metadata), Some(media)) => RequestBody::Multipart { metadata, media },
            (None, Some(media)) => RequestBody::Media(media),
            (Some(body), None) => RequestBody::Json(body),
            (None, None) => RequestBody::Empty,
        };

        Ok(HttpRequest {
            method: http_method,
            url,
            body,
        })
    }

    /// Resolve, filter parameters, and call the remote method.
    ///
    /// Transport errors come back unclassified; the domain clients decide
    /// what a 404 or 409 means for them.
    pub async fn request(
        &self,
        path: impl Into<RequestPath>,
        method: &str,
        params: Params,
    ) -> Result<Value, DispatchError> {
        let path = path.into();
        let descriptor = self.resolve(&path, method)?;
        tracing::debug!("dispatch {}.{} ({})", path, method, descriptor.id);

        let bag = ParameterBag::filter(descriptor, params);
        let request = self.prepare(descriptor, bag)?;

        let token = self
            .credentials
            .get_token()
            .await
            .map_err(TransportError::from)?;

        Ok(self.http.send(request, token.as_deref()).await?)
    }
}

/// Whether a response carries anything. `null`, `{}` and `[]` count as empty.
pub(crate) fn is_non_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Render a parameter value the way it appears in a URL
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Expand a discovery path template such as `projects/{+projectId}/jobs/{jobId}`.
///
/// `{+name}` keeps `/` separators, `{name}` encodes the whole value. Missing
/// values expand to nothing.
fn expand_template(template: &str, values: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let Some(len) = rest[start..].find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let expr = &rest[start + 1..start + len];
        let (reserved, name) = match expr.strip_prefix('+') {
            Some(name) => (true, name),
            None => (false, expr),
        };

        if let Some(value) = values.get(name) {
            let raw = render_value(value);
            if reserved {
                let encoded: Vec<_> = raw.split('/').map(urlencoding::encode).collect();
                out.push_str(&encoded.join("/"));
            } else {
                out.push_str(&urlencoding::encode(&raw));
            }
        }

        rest = &rest[start + len + 1..];
    }

    out.push_str(rest);
    out
}
