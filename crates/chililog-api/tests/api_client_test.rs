#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chililog_api::models::{ExpiryType, RepositoryInfoAo, UserAo};
use chililog_api::{ApiClient, Error, RepositoryAction, Resource};

// ── Helpers ─────────────────────────────────────────────────────────

const TOKEN: &str = "{\"ExpiresOn\":\"2099-01-01T00:00:00Z\"}~~~abc";

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn token() -> SecretString {
    SecretString::from(TOKEN.to_string())
}

fn user_body() -> serde_json::Value {
    json!({
        "DocumentID": "u1",
        "DocumentVersion": 4,
        "Username": "admin",
        "DisplayName": "Administrator",
        "Roles": ["system.administrator"],
        "GravatarMD5Hash": "0bc83cb571cd1c50ba6f3e8a78ef1346"
    })
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/Authentication"))
        .and(body_json(json!({
            "Username": "admin",
            "Password": "hunter2",
            "ExpiryType": "Absolute",
            "ExpirySeconds": 1_209_600
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Chililog-Authentication", TOKEN)
                .insert_header("X-Chililog-Version", "0.1.0")
                .insert_header("X-Chililog-Build-Timestamp", "2011-05-01T10:00:00Z")
                .set_body_json(user_body()),
        )
        .mount(&server)
        .await;

    let password = SecretString::from("hunter2".to_string());
    let auth = client
        .login("admin", &password, ExpiryType::Absolute, 1_209_600)
        .await
        .unwrap();

    assert_eq!(auth.token.expose_secret(), TOKEN);
    assert_eq!(auth.server.version, "0.1.0");
    assert_eq!(auth.user.document_id, "u1");
    assert_eq!(auth.user.roles, vec!["system.administrator".to_string()]);
}

#[tokio::test]
async fn test_login_without_token_header_is_protocol_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/Authentication"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Chililog-Version", "0.1.0")
                .insert_header("X-Chililog-Build-Timestamp", "2011-05-01T10:00:00Z")
                .set_body_json(user_body()),
        )
        .mount(&server)
        .await;

    let password = SecretString::from("hunter2".to_string());
    let result = client
        .login("admin", &password, ExpiryType::Absolute, 60)
        .await;

    assert!(
        matches!(
            result,
            Err(Error::MissingHeader { name: "X-Chililog-Authentication" })
        ),
        "expected MissingHeader, got: {result:?}"
    );
}

#[tokio::test]
async fn test_login_without_version_header_fails() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/Authentication"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Chililog-Authentication", TOKEN)
                .set_body_json(user_body()),
        )
        .mount(&server)
        .await;

    let password = SecretString::from("hunter2".to_string());
    let result = client
        .login("admin", &password, ExpiryType::Absolute, 60)
        .await;

    assert!(matches!(
        result,
        Err(Error::MissingHeader { name: "X-Chililog-Version" })
    ));
}

#[tokio::test]
async fn test_login_bad_credentials_uses_server_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/Authentication"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "Message": "Invalid username or password." })),
        )
        .mount(&server)
        .await;

    let password = SecretString::from("nope".to_string());
    let err = client
        .login("admin", &password, ExpiryType::Absolute, 60)
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Invalid username or password.");
}

#[tokio::test]
async fn test_fetch_session_sends_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/Authentication"))
        .and(header("X-Chililog-Authentication", TOKEN))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-chililog-version", "0.1.0")
                .insert_header("x-chililog-build-timestamp", "2011-05-01T10:00:00Z")
                .set_body_json(user_body()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let auth = client.fetch_session(&token()).await.unwrap();
    assert_eq!(auth.user.username, "admin");
    assert_eq!(auth.server.build_timestamp, "2011-05-01T10:00:00Z");
}

#[tokio::test]
async fn test_change_password_body() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/Authentication"))
        .and(query_param("action", "change_password"))
        .and(body_json(json!({
            "DocumentID": "u1",
            "OldPassword": "old",
            "NewPassword": "new",
            "ConfirmNewPassword": "new"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body()))
        .mount(&server)
        .await;

    let old = SecretString::from("old".to_string());
    let new = SecretString::from("new".to_string());
    let user = client
        .change_password(&token(), "u1", &old, &new, &new)
        .await
        .unwrap();
    assert_eq!(user.document_version, 4);
}

// ── Document tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_list_repository_info() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/repository_info"))
        .and(header("X-Chililog-Authentication", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "DocumentID": "a", "DocumentVersion": 1, "Name": "chililog" },
            { "DocumentID": "b", "DocumentVersion": 2, "Name": "sandpit" }
        ])))
        .mount(&server)
        .await;

    let items: Vec<RepositoryInfoAo> = client
        .list_documents(Resource::RepositoryInfo, &token())
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[1].name, "sandpit");
    assert_eq!(items[1].document_version, 2);
}

#[tokio::test]
async fn test_list_null_body_is_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let items: Vec<UserAo> = client
        .list_documents(Resource::Users, &token())
        .await
        .unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_create_posts_to_collection_root() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/repository_info/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "DocumentID": "x", "DocumentVersion": 1, "Name": "web"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let draft = RepositoryInfoAo {
        name: "web".into(),
        ..RepositoryInfoAo::default()
    };
    let saved: RepositoryInfoAo = client
        .create_document(Resource::RepositoryInfo, &token(), &draft)
        .await
        .unwrap();
    assert_eq!(saved.document_id.as_deref(), Some("x"));
}

#[tokio::test]
async fn test_update_unexpected_status() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/users/u9"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let result: Result<UserAo, Error> = client
        .update_document(Resource::Users, &token(), "u9", &UserAo::default())
        .await;

    match result {
        Err(Error::Http { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "Unexpected HTTP error: 503 Service Unavailable");
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_document() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/users/u2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client
        .delete_document(Resource::Users, &token(), "u2")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_invalid_json_reports_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[{"))
        .mount(&server)
        .await;

    let result: Result<Vec<UserAo>, Error> = client.list_documents(Resource::Users, &token()).await;
    match result {
        Err(Error::Deserialization { body, .. }) => assert_eq!(body, "[{"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

// ── Repository runtime tests ────────────────────────────────────────

#[tokio::test]
async fn test_repository_action() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/repositories/r1"))
        .and(query_param("action", "readonly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "DocumentID": "r1", "Name": "sandpit", "Status": "READONLY"
        })))
        .mount(&server)
        .await;

    let repo = client
        .repository_action(&token(), "r1", RepositoryAction::ReadOnly)
        .await
        .unwrap();
    assert_eq!(repo.status.as_deref(), Some("READONLY"));
}

#[tokio::test]
async fn test_list_repositories() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "DocumentID": "r1", "Name": "chililog", "Status": "ONLINE" }
        ])))
        .mount(&server)
        .await;

    let repos = client.list_repositories(&token()).await.unwrap();
    assert_eq!(repos.len(), 1);
    assert_eq!(repos[0].name, "chililog");
}
