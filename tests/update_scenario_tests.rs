//! End-to-end update scenarios against a wiremock YouTrack

use std::sync::Arc;

use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, method, path},
};

use youtrack_mcp_server::core::config::{CredentialsConfig, TrackerConfig};
use youtrack_mcp_server::domains::tracker::{
    IssueRef, UpdatePipeline, UpdateRequest, UpdateStatus, YouTrackClient,
};

fn pipeline(server: &MockServer) -> UpdatePipeline {
    let config = TrackerConfig {
        base_url: Some(server.uri()),
        request_timeout_secs: 5,
        max_retries: 0,
    };
    let client = YouTrackClient::new(&config, &CredentialsConfig::default()).unwrap();
    UpdatePipeline::new(Arc::new(client))
}

async fn mount_priority_bundle(server: &MockServer, expected_lookups: u64) {
    Mock::given(method("GET"))
        .and(path("/api/admin/projects/DEMO/customFields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "field": { "name": "State" },
                "bundle": { "values": [
                    { "name": "Open", "ordinal": 0 },
                    { "name": "Testing", "ordinal": 1 }
                ]}
            },
            {
                "field": { "name": "Priority" },
                "bundle": { "values": [
                    { "name": "Critical", "ordinal": 3 },
                    { "name": "Low", "ordinal": 0 },
                    { "name": "High", "ordinal": 2 },
                    { "name": "Normal", "ordinal": 1 },
                    { "name": "Obsolete", "ordinal": 4, "archived": true }
                ]}
            }
        ])))
        .expect(expected_lookups)
        .mount(server)
        .await;
}

async fn mount_issue(server: &MockServer, state: &str, priority: &str) {
    Mock::given(method("GET"))
        .and(path("/api/issues/DEMO-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "idReadable": "DEMO-7",
            "summary": "Crash on save",
            "project": { "shortName": "DEMO" },
            "tags": [],
            "customFields": [
                { "name": "State", "value": { "name": state } },
                { "name": "Priority", "value": { "name": priority } },
                { "name": "Assignee", "value": null }
            ]
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_valid_state_applied_invalid_priority_explained() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/commands"))
        .and(body_string_contains("Priority Critical-Typo"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "bad_request",
            "error_description": "Unknown value for Priority: Critical-Typo"
        })))
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/commands"))
        .and(body_string_contains("State Testing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_priority_bundle(&mock_server, 1).await;
    mount_issue(&mock_server, "Testing", "Normal").await;

    let issue = IssueRef::parse("DEMO-7").unwrap();
    let request = UpdateRequest::new()
        .state("Testing")
        .priority("Critical-Typo");
    let result = pipeline(&mock_server).run(&issue, &request).await.unwrap();

    assert_eq!(result.status, UpdateStatus::PartialSuccess);
    assert_eq!((result.attempted, result.succeeded, result.failed), (2, 1, 1));

    assert_eq!(result.diagnostics.len(), 1);
    let diagnostic = &result.diagnostics[0];
    assert_eq!(diagnostic.command, "Priority Critical-Typo");
    assert!(diagnostic.error.contains("Unknown value for Priority"));
    assert_eq!(diagnostic.hint, vec!["Low", "Normal", "High", "Critical"]);

    let snapshot = result.snapshot.expect("issue was re-read");
    assert_eq!(snapshot.field("State"), Some("Testing"));
    assert_eq!(snapshot.field("Priority"), Some("Normal"));
    assert_eq!(snapshot.field("Assignee"), None);
    assert!(result.warnings.is_empty());
}

#[tokio::test]
async fn test_permission_failure_gets_no_hint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/commands"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": "forbidden",
            "error_description": "You have no permission to update issues in DEMO"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_priority_bundle(&mock_server, 0).await;
    mount_issue(&mock_server, "Open", "Normal").await;

    let issue = IssueRef::parse("DEMO-7").unwrap();
    let request = UpdateRequest::new().priority("High");
    let result = pipeline(&mock_server).run(&issue, &request).await.unwrap();

    assert_eq!(result.status, UpdateStatus::Failure);
    assert!(result.diagnostics[0].hint.is_empty());
    assert!(result.diagnostics[0].error.contains("no permission"));
    assert!(result.snapshot.is_some());
}

#[tokio::test]
async fn test_unreachable_refresh_keeps_outcomes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/issues/DEMO-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "2-7" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/issues/DEMO-7"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let issue = IssueRef::parse("DEMO-7").unwrap();
    let request = UpdateRequest::new().summary("Crash on save");
    let result = pipeline(&mock_server).run(&issue, &request).await.unwrap();

    assert_eq!(result.status, UpdateStatus::Success);
    assert_eq!(result.succeeded, 1);
    assert!(result.snapshot.is_none());
    assert_eq!(result.warnings.len(), 1);
}

#[tokio::test]
async fn test_invalid_request_makes_no_calls() {
    let mock_server = MockServer::start().await;

    let issue = IssueRef::parse("DEMO-7").unwrap();
    let result = pipeline(&mock_server)
        .run(&issue, &UpdateRequest::new())
        .await;

    assert!(result.is_err());
    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}
