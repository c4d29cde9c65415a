#![allow(clippy::unwrap_used)]
// Data controller behaviour against a wiremock Chililog server.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chililog_core::{
    Console, ConsoleConfig, CoreError, DocumentId, MemoryTokenStore, RepositoryStatus,
    SyncOutcome,
};

// ── Helpers ─────────────────────────────────────────────────────────

const TOKEN: &str = "{\"ExpiresOn\":\"2099-01-01T00:00:00Z\"}~~~abc";

async fn logged_in() -> (MockServer, Console) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Authentication"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Chililog-Authentication", TOKEN)
                .insert_header("X-Chililog-Version", "0.1.0")
                .insert_header("X-Chililog-Build-Timestamp", "2011-05-01T10:00:00Z")
                .set_body_json(json!({
                    "DocumentID": "admin-id",
                    "DocumentVersion": 1,
                    "Username": "admin",
                    "Roles": ["system.administrator"]
                })),
        )
        .mount(&server)
        .await;

    let config = ConsoleConfig::new(Url::parse(&server.uri()).unwrap());
    let console = Console::new(config, Arc::new(MemoryTokenStore::new())).unwrap();
    console
        .session()
        .login("admin", &SecretString::from("pw".to_string()), false)
        .await
        .unwrap();
    (server, console)
}

fn repo_info(id: &str, version: u64, name: &str) -> serde_json::Value {
    json!({
        "DocumentID": id,
        "DocumentVersion": version,
        "Name": name,
        "DisplayName": format!("{name} logs"),
        "StartupStatus": "ONLINE",
        "WriteQueueWorkerCount": 1,
        "WriteQueueMaxMemory": 20_971_520,
        "WriteQueueMaxMemoryPolicy": "PAGE",
        "WriteQueuePageSize": 4_194_304,
        "WriteQueuePageCountCache": 3,
        "MaxKeywords": 20
    })
}

async fn mount_repository_info(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/repository_info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn ids(console: &Console) -> Vec<String> {
    console
        .repository_info()
        .snapshot()
        .iter()
        .filter_map(|r| r.id.as_ref().map(ToString::to_string))
        .collect()
}

// ── Synchronization ─────────────────────────────────────────────────

#[tokio::test]
async fn test_sync_removes_records_missing_from_listing() {
    let (server, console) = logged_in().await;
    mount_repository_info(
        &server,
        json!([repo_info("a", 1, "a"), repo_info("b", 1, "b"), repo_info("c", 1, "c")]),
    )
    .await;

    console.repository_info().synchronize_with_server(false).await.unwrap();
    assert_eq!(ids(&console), vec!["a", "b", "c"]);

    server.reset().await;
    mount_repository_info(&server, json!([repo_info("a", 2, "a"), repo_info("b", 1, "b")])).await;

    let outcome = console
        .repository_info()
        .synchronize_with_server(false)
        .await
        .unwrap();

    assert_eq!(ids(&console), vec!["a", "b"]);
    let report = outcome.report().unwrap();
    assert_eq!(report.removed, 1);
    let a = console.repository_info().get(&DocumentId::from("a")).unwrap();
    assert_eq!(a.version, 2);
}

#[tokio::test]
async fn test_overlapping_sync_is_skipped_without_request() {
    let (server, console) = logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(200))
                .set_body_json(json!([{ "DocumentID": "u1", "Username": "mary" }])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let users = console.users();
    let (first, second) = tokio::join!(
        users.synchronize_with_server(false),
        users.synchronize_with_server(false)
    );

    assert!(matches!(first.unwrap(), SyncOutcome::Completed(_)));
    assert_eq!(second.unwrap(), SyncOutcome::Skipped);
    assert_eq!(users.snapshot().len(), 1);
    assert!(!users.is_synchronizing());
}

#[tokio::test]
async fn test_sync_when_logged_out_clears_then_fails() {
    let (server, console) = logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/repository_info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([repo_info("a", 1, "a")])))
        .expect(1)
        .mount(&server)
        .await;

    console.repository_info().synchronize_with_server(false).await.unwrap();
    assert_eq!(ids(&console).len(), 1);

    console.session().logout();
    let err = console
        .repository_info()
        .synchronize_with_server(true)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::NotAuthenticated));
    assert!(ids(&console).is_empty());
}

#[tokio::test]
async fn test_sync_server_error_leaves_store_untouched() {
    let (server, console) = logged_in().await;
    mount_repository_info(&server, json!([repo_info("a", 1, "a")])).await;
    console.repository_info().synchronize_with_server(false).await.unwrap();

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/repository_info"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "Message": "Database down" })))
        .mount(&server)
        .await;

    let err = console
        .repository_info()
        .synchronize_with_server(false)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Database down");
    assert_eq!(ids(&console), vec!["a"]);
}

// ── Create / save ───────────────────────────────────────────────────

#[tokio::test]
async fn test_create_then_save_posts_and_stores_server_record() {
    let (server, console) = logged_in().await;
    Mock::given(method("POST"))
        .and(path("/api/repository_info/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_info("x", 1, "sandpit")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let repos = console.repository_info();
    let mut session = repos.create();
    assert!(session.is_new());
    session.update(|r| r.name = "sandpit".into());

    let id = repos.save(&session).await.unwrap();

    assert_eq!(id, DocumentId::from("x"));
    let stored = repos.get(&id).unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(stored.name, "sandpit");
}

#[tokio::test]
async fn test_invalid_record_is_rejected_before_request() {
    let (server, console) = logged_in().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let repos = console.repository_info();
    let session = repos.create();
    let err = repos.save(&session).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation { field: "name", .. }));
}

#[tokio::test]
async fn test_update_with_mismatched_id_is_integrity_error() {
    let (server, console) = logged_in().await;
    mount_repository_info(&server, json!([repo_info("x", 1, "sandpit")])).await;
    console.repository_info().synchronize_with_server(false).await.unwrap();

    Mock::given(method("PUT"))
        .and(path("/api/repository_info/x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_info("y", 2, "sandpit")))
        .mount(&server)
        .await;

    let repos = console.repository_info();
    let mut session = repos.edit(&DocumentId::from("x")).unwrap();
    session.update(|r| r.description = Some("changed".into()));

    let err = repos.save(&session).await.unwrap_err();

    assert!(matches!(err, CoreError::Integrity { .. }));
    assert_eq!(ids(&console), vec!["x"]);
    let stored = repos.get(&DocumentId::from("x")).unwrap();
    assert_eq!(stored.version, 1);
    assert!(stored.description.is_none());
}

#[tokio::test]
async fn test_failed_save_keeps_session_and_store() {
    let (server, console) = logged_in().await;
    mount_repository_info(&server, json!([repo_info("x", 1, "sandpit")])).await;
    console.repository_info().synchronize_with_server(false).await.unwrap();

    Mock::given(method("PUT"))
        .and(path("/api/repository_info/x"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "Message": "Repository is locked" })),
        )
        .mount(&server)
        .await;

    let repos = console.repository_info();
    let mut session = repos.edit(&DocumentId::from("x")).unwrap();
    session.update(|r| r.max_keywords = 50);

    let err = repos.save(&session).await.unwrap_err();

    assert!(matches!(err, CoreError::Connectivity { status: Some(500), .. }));
    assert_eq!(err.to_string(), "Repository is locked");
    assert!(session.is_dirty());
    assert_eq!(session.record().max_keywords, 50);
    assert_eq!(repos.get(&DocumentId::from("x")).unwrap().max_keywords, 20);
}

#[tokio::test]
async fn test_discard_never_touches_store() {
    let (server, console) = logged_in().await;
    mount_repository_info(&server, json!([repo_info("x", 1, "sandpit")])).await;
    console.repository_info().synchronize_with_server(false).await.unwrap();

    let repos = console.repository_info();
    let version = console.store().repository_info().version();
    let mut session = repos.edit(&DocumentId::from("x")).unwrap();
    session.update(|r| r.name = "renamed".into());
    repos.discard_changes(session);

    assert_eq!(console.store().repository_info().version(), version);
    assert_eq!(repos.get(&DocumentId::from("x")).unwrap().name, "sandpit");
}

#[tokio::test]
async fn test_edit_unknown_id_is_none() {
    let (_server, console) = logged_in().await;
    assert!(console.users().edit(&DocumentId::from("nobody")).is_none());
}

// ── Erase ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_erase_deletes_then_removes_locally() {
    let (server, console) = logged_in().await;
    mount_repository_info(&server, json!([repo_info("x", 1, "sandpit")])).await;
    console.repository_info().synchronize_with_server(false).await.unwrap();

    Mock::given(method("DELETE"))
        .and(path("/api/repository_info/x"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    console
        .repository_info()
        .erase(&DocumentId::from("x"))
        .await
        .unwrap();
    assert!(ids(&console).is_empty());
}

// ── Repository runtime ──────────────────────────────────────────────

#[tokio::test]
async fn test_runtime_status_links_to_configuration() {
    let (server, console) = logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "DocumentID": "x", "Name": "sandpit", "Status": "ONLINE" }
        ])))
        .mount(&server)
        .await;
    mount_repository_info(&server, json!([repo_info("x", 1, "sandpit")])).await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let summary = console.synchronize_server_data(false).await;
    assert!(summary.is_ok());
    let info = console.repository_info().get(&DocumentId::from("x")).unwrap();
    assert_eq!(info.current_status, Some(RepositoryStatus::Online));

    Mock::given(method("POST"))
        .and(path("/api/repositories/x"))
        .and(query_param("action", "stop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(
            { "DocumentID": "x", "Name": "sandpit", "Status": "OFFLINE" }
        )))
        .expect(1)
        .mount(&server)
        .await;

    let runtime = console
        .repositories()
        .change_status(&DocumentId::from("x"), RepositoryStatus::Offline)
        .await
        .unwrap();

    assert_eq!(runtime.status, RepositoryStatus::Offline);
    let info = console.repository_info().get(&DocumentId::from("x")).unwrap();
    assert_eq!(info.current_status, Some(RepositoryStatus::Offline));
}

#[tokio::test]
async fn test_sync_summary_reports_each_type() {
    let (server, console) = logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    mount_repository_info(&server, json!([])).await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "Message": "Not allowed" })))
        .mount(&server)
        .await;

    let summary = console.synchronize_server_data(false).await;

    assert!(summary.repositories.is_ok());
    assert!(summary.repository_info.is_ok());
    assert!(summary.first_error().unwrap().is_unauthorized());
}
