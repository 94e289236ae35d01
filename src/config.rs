//! Configuration Management
//!
//! Persistent settings for the `gapi` command line, with environment and
//! gcloud fallbacks for the project.

use crate::discovery::DISCOVERY_BASE_URL;
use crate::gcp::auth::{self, GcpCredentials};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Default project ID
    #[serde(default)]
    pub project_id: Option<String>,
    /// Default BigQuery dataset
    #[serde(default)]
    pub dataset_id: Option<String>,
    /// Service account email, informational
    #[serde(default)]
    pub service_account: Option<String>,
    /// Path to a service account JSON key
    #[serde(default)]
    pub private_key: Option<PathBuf>,
    /// OAuth scopes; each client's default when empty
    #[serde(default)]
    pub scope: Vec<String>,
    /// Override of the discovery directory
    #[serde(default)]
    pub discovery_url: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gapi").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Missing or unreadable files yield the default configuration
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;

        Ok(())
    }

    /// Get effective project (CLI > config > environment / gcloud default)
    pub fn effective_project(&self, cli: Option<&str>) -> Option<String> {
        cli.map(str::to_string)
            .or_else(|| self.project_id.clone())
            .or_else(auth::get_default_project)
    }

    /// Get effective dataset (CLI > config)
    pub fn effective_dataset(&self, cli: Option<&str>) -> Option<String> {
        cli.map(str::to_string).or_else(|| self.dataset_id.clone())
    }

    pub fn discovery_url(&self) -> &str {
        self.discovery_url.as_deref().unwrap_or(DISCOVERY_BASE_URL)
    }

    /// Scopes to request: configured ones, or `default_scope`
    pub fn scopes<'a>(&'a self, default_scope: &'a str) -> Vec<&'a str> {
        if self.scope.is_empty() {
            vec![default_scope]
        } else {
            self.scope.iter().map(String::as_str).collect()
        }
    }

    /// Credentials from the service account key when one is configured,
    /// application default credentials otherwise
    pub async fn credentials(&self, default_scope: &str) -> Result<GcpCredentials> {
        let scopes = self.scopes(default_scope);

        match &self.private_key {
            Some(key_path) => {
                tracing::info!(
                    "Using service account key {:?} ({})",
                    key_path,
                    self.service_account.as_deref().unwrap_or("unnamed")
                );
                Ok(GcpCredentials::service_account(key_path, &scopes)?)
            },
            None => {
                if self.service_account.is_some() {
                    anyhow::bail!("service_account is set but private_key is not");
                }
                Ok(GcpCredentials::application_default(&scopes).await?)
            },
        }
    }

    /// Set project and save
    pub fn set_project(&mut self, project_id: &str) -> Result<()> {
        if !auth::validate_project_id(project_id) {
            anyhow::bail!("invalid project ID: {}", project_id);
        }
        self.project_id = Some(project_id.to_string());
        self.save()
    }

    /// Set dataset and save
    pub fn set_dataset(&mut self, dataset_id: &str) -> Result<()> {
        self.dataset_id = Some(dataset_id.to_string());
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gapi").join("config.json");

        let config = Config {
            project_id: Some("my-project-123".into()),
            dataset_id: Some("analytics".into()),
            scope: vec!["https://www.googleapis.com/auth/bigquery".into()],
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load_from(&dir.path().join("nope.json")), Config::default());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        assert_eq!(Config::load_from(&bad), Config::default());
    }

    #[test]
    fn test_precedence() {
        let config = Config {
            project_id: Some("from-config".into()),
            dataset_id: Some("config_ds".into()),
            ..Default::default()
        };
        assert_eq!(config.effective_project(Some("from-cli")).as_deref(), Some("from-cli"));
        assert_eq!(config.effective_project(None).as_deref(), Some("from-config"));
        assert_eq!(config.effective_dataset(None).as_deref(), Some("config_ds"));
    }

    #[test]
    fn test_scopes_and_discovery_url() {
        let config = Config::default();
        assert_eq!(config.scopes("default-scope"), vec!["default-scope"]);
        assert_eq!(config.discovery_url(), DISCOVERY_BASE_URL);

        let config = Config {
            scope: vec!["a".into(), "b".into()],
            discovery_url: Some("http://localhost:8080/discovery/v1/apis".into()),
            ..Default::default()
        };
        assert_eq!(config.scopes("default-scope"), vec!["a", "b"]);
        assert_eq!(config.discovery_url(), "http://localhost:8080/discovery/v1/apis");
    }
}
