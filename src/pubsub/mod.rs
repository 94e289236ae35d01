//! Pub/Sub client
//!
//! Topic and subscription management plus publish / pull / acknowledge over
//! the `pubsub` v1 discovery API. Names passed in and returned are short
//! ids (`my-topic`), expanded to `projects/{project}/topics/{id}` on the wire.

pub mod error;
pub mod message;
pub mod options;
pub mod subscription;
pub mod topic;

pub use error::{Error, Result};
pub use message::{PubsubMessage, ReceivedMessage};
pub use options::{ListOptions, PullOptions, SubscriptionOptions, DEFAULT_ACK_DEADLINE_SECONDS, MAX_MESSAGES};

use crate::discovery::{Dispatcher, Params, RequestPath, DISCOVERY_BASE_URL};
use crate::gcp::auth::GcpCredentials;
use serde_json::Value;

/// OAuth scope requested when no explicit scope is configured
pub const PUBSUB_SCOPE: &str = "https://www.googleapis.com/auth/pubsub";

#[derive(Debug, Clone)]
pub struct PubSub {
    dispatcher: Dispatcher,
    project_id: String,
}

impl PubSub {
    /// Fetch the `pubsub` v1 discovery document and build a client
    pub async fn build(project_id: impl Into<String>, credentials: GcpCredentials) -> Result<Self> {
        Self::build_from(DISCOVERY_BASE_URL, project_id, credentials).await
    }

    pub async fn build_from(
        discovery_base: &str,
        project_id: impl Into<String>,
        credentials: GcpCredentials,
    ) -> Result<Self> {
        let dispatcher = Dispatcher::build_from(discovery_base, "pubsub", "v1", credentials).await?;
        Ok(Self::from_dispatcher(dispatcher, project_id))
    }

    pub fn from_dispatcher(dispatcher: Dispatcher, project_id: impl Into<String>) -> Self {
        Self {
            dispatcher,
            project_id: project_id.into(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Call a Pub/Sub method, mapping 404 / 409 to [`Error::NotFound`] /
    /// [`Error::AlreadyExists`]
    pub async fn request(
        &self,
        path: impl Into<RequestPath>,
        method: &str,
        params: Params,
    ) -> Result<Value> {
        self.dispatcher
            .request(path, method, params)
            .await
            .map_err(Error::classify)
    }

    fn project_path(&self, project_id: Option<&str>) -> String {
        format!("projects/{}", project_id.unwrap_or(&self.project_id))
    }

    fn topic_path(&self, topic: &str, project_id: Option<&str>) -> String {
        format!("{}/topics/{}", self.project_path(project_id), topic)
    }

    fn subscription_path(&self, subscription: &str, project_id: Option<&str>) -> String {
        format!("{}/subscriptions/{}", self.project_path(project_id), subscription)
    }
}

/// `projects/p/topics/t` -> `t`
pub(crate) fn short_name(name: &str) -> String {
    name.rsplit('/').next().unwrap_or(name).to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn client() -> PubSub {
        let document = serde_json::from_str(include_str!("../../tests/fixtures/pubsub_v1.json")).unwrap();
        let dispatcher = Dispatcher::from_document(document, GcpCredentials::anonymous()).unwrap();
        PubSub::from_dispatcher(dispatcher, "my-project")
    }

    #[test]
    fn test_resource_names() {
        let ps = client();
        assert_eq!(ps.topic_path("t", None), "projects/my-project/topics/t");
        assert_eq!(ps.topic_path("t", Some("other")), "projects/other/topics/t");
        assert_eq!(ps.subscription_path("s", None), "projects/my-project/subscriptions/s");
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("projects/p/topics/t"), "t");
        assert_eq!(short_name("plain"), "plain");
    }
}
