//! Subscription helpers

use super::error::{Error, Result};
use super::options::{ListOptions, SubscriptionOptions, DEFAULT_ACK_DEADLINE_SECONDS};
use super::PubSub;
use crate::discovery::{is_non_empty, Params};
use serde_json::{json, Value};

impl PubSub {
    /// Subscription resource, or `None` when it does not exist
    pub async fn info_subscription(
        &self,
        subscription: &str,
        project_id: Option<&str>,
    ) -> Result<Option<Value>> {
        let params =
            Params::new().with("subscription", self.subscription_path(subscription, project_id));
        match self.request(["projects", "subscriptions"], "get", params).await {
            Ok(found) => Ok(Some(found)),
            Err(Error::NotFound(e)) => {
                tracing::warn!("subscription {} not found: {}", subscription, e.message);
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }

    pub async fn exists_subscription(
        &self,
        subscription: &str,
        project_id: Option<&str>,
    ) -> Result<bool> {
        Ok(self
            .info_subscription(subscription, project_id)
            .await?
            .is_some_and(|subscription| is_non_empty(&subscription)))
    }

    /// Subscribe to `topic` in the same project. Returns `None` when the
    /// subscription already exists.
    pub async fn create_subscription(
        &self,
        subscription: &str,
        topic: &str,
        opts: &SubscriptionOptions,
    ) -> Result<Option<Value>> {
        match self
            .request(
                ["projects", "subscriptions"],
                "create",
                self.subscription_create_params(subscription, topic, opts),
            )
            .await
        {
            Ok(created) => Ok(Some(created)),
            Err(Error::AlreadyExists(e)) => {
                tracing::warn!("subscription {} already exists: {}", subscription, e.message);
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }

    fn subscription_create_params(
        &self,
        subscription: &str,
        topic: &str,
        opts: &SubscriptionOptions,
    ) -> Params {
        let project_id = opts.project_id.as_deref();
        Params::new()
            .with("name", self.subscription_path(subscription, project_id))
            .with_body(json!({
                "topic": self.topic_path(topic, project_id),
                "pushConfig": opts.push_config,
                "ackDeadlineSeconds": opts.ack_deadline_seconds.unwrap_or(DEFAULT_ACK_DEADLINE_SECONDS),
            }))
    }

    /// Delete a subscription. Returns `false` when it did not exist.
    pub async fn drop_subscription(
        &self,
        subscription: &str,
        project_id: Option<&str>,
    ) -> Result<bool> {
        let params =
            Params::new().with("subscription", self.subscription_path(subscription, project_id));
        match self
            .request(["projects", "subscriptions"], "delete", params)
            .await
        {
            Ok(_) => Ok(true),
            Err(Error::NotFound(e)) => {
                tracing::warn!("subscription {} not found: {}", subscription, e.message);
                Ok(false)
            },
            Err(e) => Err(e),
        }
    }

    /// Short names of every subscription in the project
    pub async fn list_subscriptions(&self, opts: &ListOptions) -> Result<Vec<String>> {
        let params = Params::new().with("project", self.project_path(opts.project_id.as_deref()));
        self.list_names(
            ["projects", "subscriptions"].into(),
            params,
            "subscriptions",
            opts,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pubsub::tests::client;

    #[test]
    fn test_create_body_defaults() {
        let params = client().subscription_create_params("s", "t", &SubscriptionOptions::default());

        assert_eq!(params.get("name"), Some(&json!("projects/my-project/subscriptions/s")));
        assert_eq!(
            params.body(),
            Some(&json!({
                "topic": "projects/my-project/topics/t",
                "pushConfig": null,
                "ackDeadlineSeconds": 10,
            }))
        );
    }

    #[test]
    fn test_create_body_with_push_endpoint() {
        let params = client().subscription_create_params(
            "s",
            "t",
            &SubscriptionOptions {
                project_id: Some("other".into()),
                push_config: Some(json!({"pushEndpoint": "https://example.com/push"})),
                ack_deadline_seconds: Some(60),
            },
        );

        let body = params.body().unwrap();
        assert_eq!(body["topic"], "projects/other/topics/t");
        assert_eq!(body["pushConfig"]["pushEndpoint"], "https://example.com/push");
        assert_eq!(body["ackDeadlineSeconds"], 60);
    }
}
