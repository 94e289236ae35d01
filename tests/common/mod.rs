//! Shared wiremock setup: serves the fixture discovery documents with their
//! root URL pointed back at the mock server.

#![allow(dead_code)]

use gcp_api_clients::bigquery::{BigQuery, JobWaitPolicy};
use gcp_api_clients::gcp::GcpCredentials;
use gcp_api_clients::pubsub::PubSub;
use serde_json::Value;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token";
pub const PROJECT: &str = "p";

const BIGQUERY_DOC: &str = include_str!("../fixtures/bigquery_v2.json");
const PUBSUB_DOC: &str = include_str!("../fixtures/pubsub_v1.json");

pub fn discovery_base(server: &MockServer) -> String {
    format!("{}/discovery/v1/apis", server.uri())
}

fn rebased(document: &str, root_url: &str, server: &MockServer) -> Value {
    let document = document.replace(root_url, &format!("{}/", server.uri()));
    serde_json::from_str(&document).expect("fixture is valid JSON")
}

pub async fn mount_discovery(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/discovery/v1/apis/bigquery/v2/rest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rebased(
            BIGQUERY_DOC,
            "https://bigquery.googleapis.com/",
            server,
        )))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/discovery/v1/apis/pubsub/v1/rest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rebased(
            PUBSUB_DOC,
            "https://pubsub.googleapis.com/",
            server,
        )))
        .mount(server)
        .await;
}

/// A client whose job polling is fast enough for tests
pub async fn bigquery(server: &MockServer) -> BigQuery {
    mount_discovery(server).await;
    BigQuery::build_from(
        &discovery_base(server),
        PROJECT,
        GcpCredentials::from_static_token(TOKEN),
    )
    .await
    .expect("client builds from the mocked discovery document")
    .with_dataset("ds")
    .with_wait_policy(JobWaitPolicy {
        interval: Duration::from_millis(10),
        timeout: Duration::from_secs(5),
    })
}

pub async fn pubsub(server: &MockServer) -> PubSub {
    mount_discovery(server).await;
    PubSub::build_from(
        &discovery_base(server),
        PROJECT,
        GcpCredentials::from_static_token(TOKEN),
    )
    .await
    .expect("client builds from the mocked discovery document")
}

/// A Google-style JSON error body
pub fn error_response(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(serde_json::json!({
        "error": { "code": status, "message": message }
    }))
}
