//! Discovery document model
//!
//! Only the parts of the discovery format the dispatcher needs are modelled:
//! the URL roots, the nested resource tree and each method's parameters.

use serde::Deserialize;
use std::collections::HashMap;

/// A Google API discovery document for one (api, version)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryDocument {
    pub name: String,
    pub version: String,
    pub root_url: String,
    #[serde(default)]
    pub service_path: String,
    #[serde(default)]
    pub resources: HashMap<String, ResourceDescriptor>,
}

/// A resource node: its methods and nested resources
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceDescriptor {
    #[serde(default)]
    pub methods: HashMap<String, MethodDescriptor>,
    #[serde(default)]
    pub resources: HashMap<String, ResourceDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDescriptor {
    #[serde(default)]
    pub id: String,
    pub http_method: String,
    pub path: String,
    #[serde(default)]
    pub parameters: HashMap<String, ParameterDescriptor>,
    #[serde(default)]
    pub parameter_order: Vec<String>,
    #[serde(default)]
    pub supports_media_upload: bool,
    #[serde(default)]
    pub media_upload: Option<MediaUpload>,
}

impl MethodDescriptor {
    /// Path template for simple (non-resumable) media uploads
    pub fn simple_upload_path(&self) -> Option<&str> {
        self.media_upload
            .as_ref()
            .and_then(|m| m.protocols.simple.as_ref())
            .map(|p| p.path.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDescriptor {
    pub location: ParameterLocation,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub repeated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaUpload {
    #[serde(default)]
    pub accept: Vec<String>,
    pub protocols: MediaUploadProtocols,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaUploadProtocols {
    #[serde(default)]
    pub simple: Option<MediaUploadProtocol>,
    #[serde(default)]
    pub resumable: Option<MediaUploadProtocol>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaUploadProtocol {
    #[serde(default)]
    pub multipart: bool,
    pub path: String,
}

/// Resource path -> methods, flattened once after the document is fetched.
///
/// Keys are dotted paths (`"projects.topics"`), so every prefix of a nested
/// path has its own entry.
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    entries: HashMap<String, HashMap<String, MethodDescriptor>>,
}

impl MethodTable {
    pub fn build(document: &DiscoveryDocument) -> Self {
        let mut table = Self::default();
        table.insert_all(None, &document.resources);
        table
    }

    fn insert_all(&mut self, prefix: Option<&str>, resources: &HashMap<String, ResourceDescriptor>) {
        for (name, resource) in resources {
            let key = match prefix {
                Some(prefix) => format!("{prefix}.{name}"),
                None => name.clone(),
            };
            self.entries.insert(key.clone(), resource.methods.clone());
            self.insert_all(Some(&key), &resource.resources);
        }
    }

    /// Methods declared by the resource at `key`
    pub fn methods(&self, key: &str) -> Option<&HashMap<String, MethodDescriptor>> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
