//! Topic helpers

use super::error::{Error, Result};
use super::options::ListOptions;
use super::{short_name, PubSub};
use crate::discovery::{is_non_empty, Params, RequestPath};
use crate::pagination::{collect_pages, Page};
use serde_json::{json, Value};

impl PubSub {
    /// Topic resource, or `None` when it does not exist
    pub async fn info_topic(&self, topic: &str, project_id: Option<&str>) -> Result<Option<Value>> {
        let params = Params::new().with("topic", self.topic_path(topic, project_id));
        match self.request(["projects", "topics"], "get", params).await {
            Ok(found) => Ok(Some(found)),
            Err(Error::NotFound(e)) => {
                tracing::warn!("topic {} not found: {}", topic, e.message);
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }

    pub async fn exists_topic(&self, topic: &str, project_id: Option<&str>) -> Result<bool> {
        Ok(self
            .info_topic(topic, project_id)
            .await?
            .is_some_and(|topic| is_non_empty(&topic)))
    }

    /// Create a topic. Returns `None` when it already exists.
    pub async fn create_topic(&self, topic: &str, project_id: Option<&str>) -> Result<Option<Value>> {
        let params = Params::new()
            .with("name", self.topic_path(topic, project_id))
            .with_body(json!({}));

        match self.request(["projects", "topics"], "create", params).await {
            Ok(created) => Ok(Some(created)),
            Err(Error::AlreadyExists(e)) => {
                tracing::warn!("topic {} already exists: {}", topic, e.message);
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }

    /// Delete a topic. Returns `false` when it did not exist.
    pub async fn drop_topic(&self, topic: &str, project_id: Option<&str>) -> Result<bool> {
        let params = Params::new().with("topic", self.topic_path(topic, project_id));
        match self.request(["projects", "topics"], "delete", params).await {
            Ok(_) => Ok(true),
            Err(Error::NotFound(e)) => {
                tracing::warn!("topic {} not found: {}", topic, e.message);
                Ok(false)
            },
            Err(e) => Err(e),
        }
    }

    /// Short names of every topic in the project
    pub async fn list_topics(&self, opts: &ListOptions) -> Result<Vec<String>> {
        let params = Params::new().with("project", self.project_path(opts.project_id.as_deref()));
        self.list_names(["projects", "topics"].into(), params, "topics", opts)
            .await
    }

    /// Short names of the subscriptions attached to a topic; empty when the
    /// topic does not exist
    pub async fn list_topic_subscriptions(
        &self,
        topic: &str,
        opts: &ListOptions,
    ) -> Result<Vec<String>> {
        let params = Params::new().with("topic", self.topic_path(topic, opts.project_id.as_deref()));
        match self
            .list_names(
                ["projects", "topics", "subscriptions"].into(),
                params,
                "subscriptions",
                opts,
            )
            .await
        {
            Err(Error::NotFound(e)) => {
                tracing::warn!("topic {} not found: {}", topic, e.message);
                Ok(Vec::new())
            },
            other => other,
        }
    }

    /// Page through a `list` method, collecting the short name of each item
    pub(crate) async fn list_names(
        &self,
        path: RequestPath,
        params: Params,
        list_key: &str,
        opts: &ListOptions,
    ) -> Result<Vec<String>> {
        let path = &path;
        let params = &params;

        collect_pages(opts.page_token.clone(), move |cursor| async move {
            let page_params = params
                .clone()
                .with_opt("pageSize", opts.page_size)
                .with_opt("pageToken", cursor.token);

            let response = self.request(path.clone(), "list", page_params).await?;
            Ok::<_, Error>(Page::from_response(&response, "nextPageToken", |r| {
                names(r, list_key)
            }))
        })
        .await
    }
}

/// Items are either resources with a `name` or bare resource-name strings
fn names(response: &Value, list_key: &str) -> Vec<String> {
    response
        .get(list_key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("name").unwrap_or(item).as_str())
                .map(short_name)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_from_resources_and_strings() {
        let topics = json!({"topics": [
            {"name": "projects/p/topics/a"},
            {"name": "projects/p/topics/b"}
        ]});
        assert_eq!(names(&topics, "topics"), vec!["a", "b"]);

        let subscriptions = json!({"subscriptions": ["projects/p/subscriptions/s1"]});
        assert_eq!(names(&subscriptions, "subscriptions"), vec!["s1"]);

        assert!(names(&json!({}), "topics").is_empty());
    }
}
