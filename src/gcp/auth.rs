//! GCP Authentication
//!
//! Handles authentication using Application Default Credentials (ADC) or an
//! explicit service account key file. A static bearer token and an anonymous
//! mode are available for emulators and tests.

use gcp_auth::{CustomServiceAccount, TokenProvider};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Default scopes for GCP API access
pub const DEFAULT_SCOPES: &[&str] = &["https://www.googleapis.com/auth/cloud-platform"];

/// Token expiry buffer - refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL if we can't determine expiry (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Errors raised while acquiring credentials or tokens.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("failed to initialize application default credentials: {0}")]
    ApplicationDefault(#[source] gcp_auth::Error),
    #[error("failed to load service account key {path}: {source}")]
    ServiceAccountKey {
        path: PathBuf,
        #[source]
        source: gcp_auth::Error,
    },
    #[error("failed to get access token: {0}")]
    Token(#[source] gcp_auth::Error),
}

#[derive(Clone)]
enum TokenSource {
    Provider(Arc<dyn TokenProvider>),
    Static(String),
    Anonymous,
}

/// GCP credentials holder with token caching
#[derive(Clone)]
pub struct GcpCredentials {
    source: TokenSource,
    scopes: Vec<String>,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl std::fmt::Debug for GcpCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.source {
            TokenSource::Provider(_) => "provider",
            TokenSource::Static(_) => "static",
            TokenSource::Anonymous => "anonymous",
        };
        f.debug_struct("GcpCredentials")
            .field("source", &kind)
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl GcpCredentials {
    fn with_source(source: TokenSource, scopes: &[&str]) -> Self {
        let scopes = if scopes.is_empty() {
            DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
        } else {
            scopes.iter().map(|s| s.to_string()).collect()
        };

        Self {
            source,
            scopes,
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Create credentials using Application Default Credentials
    pub async fn application_default(scopes: &[&str]) -> Result<Self, AuthError> {
        let provider = gcp_auth::provider()
            .await
            .map_err(AuthError::ApplicationDefault)?;

        tracing::debug!("Using application default credentials");
        Ok(Self::with_source(TokenSource::Provider(provider), scopes))
    }

    /// Create credentials from a service account JSON key file
    pub fn service_account(key_path: &Path, scopes: &[&str]) -> Result<Self, AuthError> {
        let account =
            CustomServiceAccount::from_file(key_path).map_err(|source| {
                AuthError::ServiceAccountKey {
                    path: key_path.to_path_buf(),
                    source,
                }
            })?;

        tracing::debug!("Using service account key {:?}", key_path);
        Ok(Self::with_source(
            TokenSource::Provider(Arc::new(account)),
            scopes,
        ))
    }

    /// Use a fixed bearer token (emulators, tests, tokens minted elsewhere)
    pub fn from_static_token(token: impl Into<String>) -> Self {
        Self::with_source(TokenSource::Static(token.into()), &[])
    }

    /// Send requests without an Authorization header
    pub fn anonymous() -> Self {
        Self::with_source(TokenSource::Anonymous, &[])
    }

    /// Scopes requested for each token
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Get an access token for API calls, `None` for anonymous credentials
    pub async fn get_token(&self) -> Result<Option<String>, AuthError> {
        let provider = match &self.source {
            TokenSource::Anonymous => return Ok(None),
            TokenSource::Static(token) => return Ok(Some(token.clone())),
            TokenSource::Provider(provider) => provider,
        };

        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(Some(cached.token.clone()));
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let scopes: Vec<&str> = self.scopes.iter().map(String::as_str).collect();
        let token = provider.token(&scopes).await.map_err(AuthError::Token)?;
        let token_str = token.as_str().to_string();

        // gcp_auth refreshes on its own; this cache only saves the provider round trip
        let expires_at = Instant::now() + DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER;

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token_str.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            (DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(Some(token_str))
    }
}

/// Get the gcloud configuration directory
pub fn get_gcloud_config_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CLOUDSDK_CONFIG") {
        return Some(PathBuf::from(path));
    }

    // Default to ~/.config/gcloud on Linux/macOS
    dirs::config_dir().map(|p| p.join("gcloud"))
}

/// Validate a GCP project ID format
/// Project IDs must be 6-30 characters, lowercase letters, digits, and hyphens
/// Must start with a letter and cannot end with a hyphen
pub fn validate_project_id(project: &str) -> bool {
    if project.len() < 6 || project.len() > 30 {
        return false;
    }

    match project.chars().next() {
        Some(c) if c.is_ascii_lowercase() => {},
        _ => return false,
    }

    if project.ends_with('-') {
        return false;
    }

    project
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Parse the `project = ...` entry out of a gcloud ini file.
/// With `section` set, only lines inside that section count.
fn read_project_from_ini(content: &str, section: Option<&str>) -> Option<String> {
    let mut in_section = section.is_none();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            in_section = section.map(|s| line == s).unwrap_or(true);
            continue;
        }
        if in_section && line.starts_with("project") && line.contains('=') {
            if let Some(value) = line.split('=').nth(1) {
                let project = value.trim().to_string();
                if validate_project_id(&project) {
                    return Some(project);
                }
            }
        }
    }
    None
}

/// Read the default project from the environment or gcloud configuration
/// Security: Validates project ID format before returning
pub fn get_default_project() -> Option<String> {
    for var in ["CLOUDSDK_CORE_PROJECT", "GOOGLE_CLOUD_PROJECT", "GCLOUD_PROJECT"] {
        if let Ok(project) = std::env::var(var) {
            if validate_project_id(&project) {
                return Some(project);
            }
            tracing::warn!("Invalid project ID format in {}", var);
        }
    }

    let config_dir = get_gcloud_config_dir()?;

    if let Ok(content) = std::fs::read_to_string(config_dir.join("properties")) {
        if let Some(project) = read_project_from_ini(&content, None) {
            return Some(project);
        }
    }

    let active_config = std::fs::read_to_string(config_dir.join("active_config")).ok()?;
    let config_name = active_config.trim();

    // Security: Validate config name to prevent path traversal
    if !config_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        tracing::warn!("Invalid characters in active_config name");
        return None;
    }

    let config_path = config_dir
        .join("configurations")
        .join(format!("config_{}", config_name));
    let content = std::fs::read_to_string(config_path).ok()?;
    read_project_from_ini(&content, Some("[core]"))
}
