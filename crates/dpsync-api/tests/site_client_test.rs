#![allow(clippy::unwrap_used)]
// Integration tests for `SiteClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dpsync_api::{ContentKind, Error, SiteClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SiteClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = SiteClient::with_client(reqwest::Client::new(), base_url, "HQ1".into());
    (server, client)
}

fn site_path(suffix: &str) -> String {
    format!("/api/sites/HQ1/{suffix}")
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "test-password".to_string().into();
    client.login("operator", &secret).await.unwrap();
}

#[tokio::test]
async fn test_login_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "wrong-password".to_string().into();
    let result = client.login("operator", &secret).await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

// ── Node tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_distribution_points() {
    let (server, client) = setup().await;

    let envelope = json!({
        "status": "ok",
        "value": [
            {
                "id": "dp-001",
                "name": "Primary DP",
                "serverName": "dp01.corp.example.com"
            },
            {
                "id": "dp-002",
                "name": "Branch DP",
                "serverName": "dp02.corp.example.com",
                "description": "branch office"
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path(site_path("distribution-points")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&envelope))
        .mount(&server)
        .await;

    let nodes = client.list_distribution_points().await.unwrap();

    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].id, "dp-001");
    assert_eq!(nodes[0].server_name.as_deref(), Some("dp01.corp.example.com"));
    assert_eq!(nodes[1].description.as_deref(), Some("branch office"));
}

// ── Content tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_list_content() {
    let (server, client) = setup().await;

    let envelope = json!({
        "status": "ok",
        "value": [
            { "id": "PKG00042", "name": "7-Zip 24.08", "sizeBytes": 1834722 },
            { "id": "PKG00043", "name": "Notepad++ 8.7" }
        ]
    });

    Mock::given(method("GET"))
        .and(path(site_path("content/packages")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&envelope))
        .mount(&server)
        .await;

    let items = client.list_content(ContentKind::Package).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, "PKG00042");
    assert_eq!(items[0].size_bytes, Some(1_834_722));
    assert_eq!(items[1].name, "Notepad++ 8.7");
    assert_eq!(items[1].size_bytes, None);
}

#[tokio::test]
async fn test_list_content_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(site_path("content/boot-images")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "ok", "value": [] })),
        )
        .mount(&server)
        .await;

    let items = client.list_content(ContentKind::BootImage).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_distribute_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(site_path("content/applications/APP-7/distribute")))
        .and(body_json(json!({ "target": "dp-002" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .distribute(ContentKind::Application, "APP-7", "dp-002")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_distribute_rejected() {
    let (server, client) = setup().await;

    let envelope = json!({
        "status": "error",
        "message": "target distribution point is offline"
    });

    Mock::given(method("POST"))
        .and(path(site_path("content/packages/PKG00042/distribute")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&envelope))
        .mount(&server)
        .await;

    let result = client
        .distribute(ContentKind::Package, "PKG00042", "dp-002")
        .await;

    match result {
        Err(Error::Service { message }) => {
            assert_eq!(message, "target distribution point is offline");
        }
        other => panic!("expected Service error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_session_expired_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(site_path("distribution-points")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list_distribution_points().await;
    assert!(matches!(result, Err(Error::Authentication { .. })));
}

#[tokio::test]
async fn test_multibyte_error_body_is_truncated_safely() {
    let (server, client) = setup().await;

    // 199 ASCII bytes followed by two-byte characters: the 200-byte
    // truncation point lands inside 'é'.
    let body = format!("{}ééééé", "a".repeat(199));

    Mock::given(method("GET"))
        .and(path(site_path("content/packages")))
        .respond_with(ResponseTemplate::new(500).set_body_string(body))
        .mount(&server)
        .await;

    let result = client.list_content(ContentKind::Package).await;
    assert!(
        matches!(result, Err(Error::Service { .. })),
        "expected Service error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_multibyte_malformed_body_is_truncated_safely() {
    let (server, client) = setup().await;

    let body = format!("{}ééé", "x".repeat(199));

    Mock::given(method("GET"))
        .and(path(site_path("content/packages")))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let result = client.list_content(ContentKind::Package).await;
    assert!(matches!(result, Err(Error::Deserialization { .. })));
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(site_path("content/os-images")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.list_content(ContentKind::OsImage).await;
    assert!(matches!(result, Err(Error::Deserialization { .. })));
}
