#![allow(clippy::unwrap_used)]
// Integration tests for `NexusClient` using wiremock.

use bytes::Bytes;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{basic_auth, body_bytes, body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nxrm_api::types::{CapabilityRequest, RoutingRule};
use nxrm_api::{BasicAuth, Error, NexusClient, PrivilegeKind};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, NexusClient) {
    let server = MockServer::start().await;
    let auth = BasicAuth::new("admin", SecretString::from("admin123".to_owned()));
    let client = NexusClient::with_client(&server.uri(), reqwest::Client::new(), auth).unwrap();
    (server, client)
}

fn rest(suffix: &str) -> String {
    format!("/service/rest/{suffix}")
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_every_request_carries_basic_auth() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(rest("v1/security/anonymous")))
        .and(basic_auth("admin", "admin123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "enabled": true, "userId": "anonymous", "realmName": "NexusAuthenticatingRealm"
        })))
        .expect(2)
        .mount(&server)
        .await;

    for _ in 0..2 {
        let resp = client.get_anonymous_access().await.unwrap();
        assert_eq!(resp.status(), 200);
    }
}

#[tokio::test]
async fn test_unauthorized_is_classified() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(rest("v1/repositories")))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let result = client.list_repositories().await;
    assert!(
        matches!(result, Err(ref e @ Error::Unauthorized(_)) if e.is_auth_failure()),
        "expected Unauthorized, got: {result:?}"
    );
}

// ── Status envelope ─────────────────────────────────────────────────

#[tokio::test]
async fn test_not_found_is_returned_not_raised() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(rest("v1/routing-rules/missing")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let resp = client.get_routing_rule("missing").await.unwrap();
    assert!(resp.is_not_found());
    let err = resp.expect(&[200]).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        err.detail().unwrap().status_line(),
        "GET /service/rest/v1/routing-rules/missing -> HTTP 404"
    );
}

#[tokio::test]
async fn test_conflict_keeps_body_excerpt() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(rest("v1/routing-rules")))
        .respond_with(ResponseTemplate::new(409).set_body_string("name already in use"))
        .mount(&server)
        .await;

    let rule = RoutingRule {
        name: "block-snapshots".into(),
        description: None,
        mode: "BLOCK".into(),
        matchers: vec![".*-SNAPSHOT.*".into()],
    };
    let err = client
        .create_routing_rule(&rule)
        .await
        .unwrap()
        .expect(&[204])
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(ref d) if d.body == "name already in use"));
}

// ── Repositories ────────────────────────────────────────────────────

#[tokio::test]
async fn test_repository_paths_are_format_scoped() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path(rest("v1/repositories/npm/hosted/npm-internal")))
        .and(body_json(json!({ "name": "npm-internal", "online": false })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(rest("v1/repositories/npm-internal")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let body = json!({ "name": "npm-internal", "online": false });
    let resp = client
        .update_repository("npm", "hosted", "npm-internal", &body)
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = client.delete_repository("npm-internal").await.unwrap();
    assert_eq!(resp.status(), 204);
}

#[tokio::test]
async fn test_list_repositories() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(rest("v1/repositories")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "name": "maven-central",
                "format": "maven2",
                "type": "proxy",
                "url": "http://nexus/repository/maven-central",
                "attributes": { "proxy": { "remoteUrl": "https://repo1.maven.org/maven2/" } }
            }
        ])))
        .mount(&server)
        .await;

    let repos = client.list_repositories().await.unwrap();
    assert_eq!(repos.len(), 1);
    assert_eq!(repos[0].format, "maven2");
    assert_eq!(repos[0].repository_type, "proxy");
}

// ── Security ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_privilege_create_uses_type_path() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(rest("v1/security/privileges/wildcard")))
        .and(body_json(json!({ "name": "all-nx", "pattern": "nx:*" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let body = nxrm_api::types::PrivilegeRequest {
        name: "all-nx".into(),
        pattern: Some("nx:*".into()),
        ..Default::default()
    };
    let resp = client
        .create_privilege(PrivilegeKind::Wildcard, &body)
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
}

#[tokio::test]
async fn test_user_lookup_sends_query() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(rest("v1/security/users")))
        .and(query_param("userId", "jane"))
        .and(query_param("source", "default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.find_users("jane", "default").await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_change_password_is_plain_text() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path(rest("v1/security/users/jane%40corp/change-password")))
        .and(header("content-type", "text/plain"))
        .and(body_string("s3cret"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client
        .change_user_password("jane@corp", "s3cret".to_owned())
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);
}

#[tokio::test]
async fn test_active_realms_keep_order() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path(rest("v1/security/realms/active")))
        .and(body_json(json!(["DockerToken", "NexusAuthenticatingRealm"])))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let realms = vec!["DockerToken".to_owned(), "NexusAuthenticatingRealm".to_owned()];
    let resp = client.set_active_realms(&realms).await.unwrap();
    assert_eq!(resp.status(), 204);
}

// ── Capabilities / tasks ────────────────────────────────────────────

#[tokio::test]
async fn test_capability_properties_are_flat_strings() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(rest("v1/capabilities")))
        .and(body_json(json!({
            "type": "baseurl",
            "enabled": true,
            "properties": { "url": "https://nexus.example.com" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "0a1b2c", "type": "baseurl", "enabled": true,
            "properties": { "url": "https://nexus.example.com" }
        })))
        .mount(&server)
        .await;

    let mut body = CapabilityRequest {
        type_id: "baseurl".into(),
        notes: None,
        enabled: true,
        properties: indexmap::IndexMap::new(),
    };
    body.properties
        .insert("url".into(), "https://nexus.example.com".into());
    let resp = client.create_capability(&body).await.unwrap();
    let created: nxrm_api::types::CapabilityResponse = resp.json().unwrap();
    assert_eq!(created.id.as_deref(), Some("0a1b2c"));
    assert_eq!(created.property("url"), Some("https://nexus.example.com"));
}

#[tokio::test]
async fn test_list_tasks_follows_continuation() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(rest("v1/tasks")))
        .and(query_param("continuationToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "t2", "name": "compact", "type": "blobstore.compact" }],
            "continuationToken": null
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(rest("v1/tasks")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "t1", "name": "gc", "type": "repository.docker.gc" }],
            "continuationToken": "page-2"
        })))
        .mount(&server)
        .await;

    let tasks = client.list_tasks().await.unwrap();
    let ids: Vec<_> = tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t2"]);
}

// ── System ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_license_upload_is_binary() {
    let (server, client) = setup().await;

    let license = Bytes::from_static(&[0x00, 0xFF, 0x10, 0x42]);

    Mock::given(method("POST"))
        .and(path(rest("v1/system/license")))
        .and(header("content-type", "application/octet-stream"))
        .and(body_bytes(license.to_vec()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "contactCompany": "Example Corp", "licenseType": "Sonatype Nexus Repository Pro"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.install_license(license).await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_iq_disable_is_post() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(rest("v1/iq/disable")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.disable_iq_connection().await.unwrap();
    assert_eq!(resp.status(), 204);
}
