//! HTTP client against a mock platform server.

use bns::api::{
    ClientSettings, CreateEnvironmentRequest, EventStatus, Genesis, HttpPlatformClient,
    PlatformApi,
};
use bns::error::RemoteError;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token-1234";

fn client(server: &MockServer) -> HttpPlatformClient {
    HttpPlatformClient::new(ClientSettings {
        base_url: server.uri(),
        token: TOKEN.to_string(),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn sends_token_and_decodes_entity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/environments/env-1"))
        .and(header("X-Auth-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "env-1",
            "name": "staging",
            "project": "proj-1",
            "operationStatus": "running",
            "clusterStatus": "deployed",
            "type": "primary"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let environment = client(&server).lookup_environment("env-1").await.unwrap();

    assert_eq!(environment.name, "staging");
    assert_eq!(environment.project, "proj-1");
    assert_eq!(environment.operation_status.as_deref(), Some("running"));
    assert_eq!(environment.environment_type.as_deref(), Some("primary"));
}

#[tokio::test]
async fn ids_cannot_escape_their_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/environments/..%2Forganizations%3Fx=1/stop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ev-stop",
            "type": "env_stop",
            "status": "queued"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let event = client(&server)
        .stop_environment("../organizations?x=1")
        .await
        .unwrap();

    assert_eq!(event.id, "ev-stop");
    assert_eq!(event.status, EventStatus::Pending);
}

#[tokio::test]
async fn missing_entity_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/components/comp-x"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "title": "Not Found",
            "detail": "Component comp-x does not exist"
        })))
        .mount(&server)
        .await;

    let err = client(&server).lookup_component("comp-x").await.unwrap_err();

    match err {
        RemoteError::NotFound(message) => assert!(message.contains("comp-x")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn bad_token_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/organizations/org-1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server)
        .lookup_organization("org-1")
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteError::Unauthorized(_)));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn violations_are_parsed_from_rejections() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/environments"))
        .and(body_partial_json(json!({
            "name": "preview",
            "project": "proj-1",
            "genesis": { "fromTemplate": { "template": "tpl-42" } }
        })))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "title": "Validation Failed",
            "detail": "genesis.template: template tpl-42 does not exist",
            "violations": [
                { "propertyPath": "genesis.template", "message": "template tpl-42 does not exist" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = CreateEnvironmentRequest {
        name: "preview".into(),
        project: "proj-1".into(),
        genesis: Genesis::FromTemplate {
            template: "tpl-42".into(),
        },
        kubernetes_integration: None,
    };
    let err = client(&server)
        .create_environment(&request)
        .await
        .unwrap_err();

    match &err {
        RemoteError::Rejected { status, .. } => assert_eq!(*status, 422),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.violations().len(), 1);
    assert_eq!(
        err.violations()[0].property_path.as_deref(),
        Some("genesis.template")
    );
}

#[tokio::test]
async fn collections_are_fetched_across_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/environments"))
        .and(query_param("project", "proj-1"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_embedded": { "item": [
                { "id": "env-1", "name": "one", "project": "proj-1" },
                { "id": "env-2", "name": "two", "project": "proj-1" }
            ]},
            "totalItems": 3
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/environments"))
        .and(query_param("project", "proj-1"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_embedded": { "item": [
                { "id": "env-3", "name": "three", "project": "proj-1" }
            ]},
            "totalItems": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let environments = client(&server).list_environments("proj-1").await.unwrap();

    let ids: Vec<&str> = environments.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["env-1", "env-2", "env-3"]);
}

#[tokio::test]
async fn server_errors_are_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/events/ev-1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client(&server).get_event("ev-1").await.unwrap_err();

    assert!(err.is_transient());
    match err {
        RemoteError::Rejected { status, message, .. } => {
            assert_eq!(status, 503);
            assert_eq!(message, "upstream unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn deploy_returns_the_started_event() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/environments/env-1/deploy"))
        .and(header("X-Auth-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ev-9",
            "type": "env_deploy",
            "status": "in_progress",
            "environment": "env-1",
            "createdAt": "2026-03-01T10:00:00Z",
            "steps": [ { "name": "build", "status": "queued" } ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let event = client(&server).deploy_environment("env-1").await.unwrap();

    assert_eq!(event.id, "ev-9");
    assert_eq!(event.status, EventStatus::Running);
    assert_eq!(event.steps.len(), 1);
    assert!(event.created_at.is_some());
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/projects/proj-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).lookup_project("proj-1").await.unwrap_err();

    assert!(matches!(err, RemoteError::Decode(_)));
    assert!(!err.is_transient());
}
