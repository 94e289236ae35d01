//! Publish, pull and acknowledge

use super::error::{Error, Result};
use super::options::{PullOptions, MAX_MESSAGES};
use super::PubSub;
use crate::discovery::Params;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// A message as delivered by a pull; `data` is still base64-encoded
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PubsubMessage {
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub publish_time: Option<String>,
}

impl PubsubMessage {
    /// Decoded payload; empty when the message carried no data
    pub fn decode_data(&self) -> Result<Vec<u8>> {
        match &self.data {
            Some(data) => Ok(STANDARD.decode(data)?),
            None => Ok(Vec::new()),
        }
    }
}

/// One pulled message together with the id used to acknowledge it
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedMessage {
    pub ack_id: String,
    pub message: PubsubMessage,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullResponse {
    #[serde(default)]
    received_messages: Vec<ReceivedMessage>,
}

fn publish_body<M: AsRef<[u8]>>(messages: &[M]) -> Value {
    let messages: Vec<Value> = messages
        .iter()
        .map(|m| json!({ "data": STANDARD.encode(m.as_ref()) }))
        .collect();
    json!({ "messages": messages })
}

impl PubSub {
    /// Publish messages in one call; returns the service-assigned ids in order
    pub async fn publish<M: AsRef<[u8]>>(
        &self,
        topic: &str,
        messages: &[M],
        project_id: Option<&str>,
    ) -> Result<Vec<String>> {
        let params = Params::new()
            .with("topic", self.topic_path(topic, project_id))
            .with_body(publish_body(messages));

        let response = self.request(["projects", "topics"], "publish", params).await?;
        tracing::debug!("published {} messages to {}", messages.len(), topic);

        Ok(response
            .get("messageIds")
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    /// One pull call; there is no long-poll loop
    pub async fn pull(&self, subscription: &str, opts: &PullOptions) -> Result<Vec<ReceivedMessage>> {
        let params = Params::new()
            .with(
                "subscription",
                self.subscription_path(subscription, opts.project_id.as_deref()),
            )
            .with_body(json!({
                "returnImmediately": opts.return_immediately.unwrap_or(true),
                "maxMessages": opts.max_messages.unwrap_or(MAX_MESSAGES),
            }));

        let response = self
            .request(["projects", "subscriptions"], "pull", params)
            .await?;
        if response.is_null() {
            return Ok(Vec::new());
        }

        let pulled: PullResponse = serde_json::from_value(response).map_err(Error::InvalidResponse)?;
        tracing::debug!("pulled {} messages from {}", pulled.received_messages.len(), subscription);
        Ok(pulled.received_messages)
    }

    /// Acknowledge pulled messages.
    ///
    /// [`Error::NotFound`] and [`Error::AlreadyExists`] are returned as-is;
    /// any other HTTP failure becomes [`Error::Acknowledge`].
    pub async fn acknowledge<S: AsRef<str>>(
        &self,
        subscription: &str,
        ack_ids: &[S],
        project_id: Option<&str>,
    ) -> Result<()> {
        let ack_ids: Vec<&str> = ack_ids.iter().map(|id| id.as_ref()).collect();
        let params = Params::new()
            .with("subscription", self.subscription_path(subscription, project_id))
            .with_body(json!({ "ackIds": ack_ids }));

        match self
            .request(["projects", "subscriptions"], "acknowledge", params)
            .await
        {
            Ok(_) => Ok(()),
            Err(Error::Dispatch(err)) => match err.http_error() {
                Some(http) => Err(Error::Acknowledge(http.clone())),
                None => Err(Error::Dispatch(err)),
            },
            Err(err) => Err(err),
        }
    }

    /// Alias of [`PubSub::acknowledge`]
    pub async fn ack<S: AsRef<str>>(
        &self,
        subscription: &str,
        ack_ids: &[S],
        project_id: Option<&str>,
    ) -> Result<()> {
        self.acknowledge(subscription, ack_ids, project_id).await
    }
}
