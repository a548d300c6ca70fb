mod common;

use std::sync::Arc;

use serde_json::json;

use common::server;
use common::Factory;
use dhadak_admin::backend::{ApiRequest, Backend, HttpBackend, MemoryBackend, Method};
use dhadak_admin::controller::{Controller, RecordingNotifier};
use dhadak_admin::editor::EditorShell;
use dhadak_admin::error::AppError;
use dhadak_admin::models::{Achievement, TeamMember};
use dhadak_admin::public::PublicSite;
use dhadak_admin::session::{MemoryStore, Session};

async fn http_backend() -> (MemoryBackend, HttpBackend) {
    let memory = MemoryBackend::new();
    let origin = server::spawn(memory.clone()).await;
    // Trailing slash exercises base URL normalization
    (memory, HttpBackend::new(format!("{}/", origin)))
}

#[tokio::test]
async fn test_public_list_over_http() {
    let (memory, http) = http_backend().await;
    Factory::new(&memory).achievement("State Final", "Feb 2024").await;

    let body = http.send(ApiRequest::get("/api/achievements")).await.unwrap();

    assert_eq!(body.as_array().unwrap().len(), 1);
    let received = memory.requests().await;
    assert_eq!(received[0].path, "/api/achievements");
    assert_eq!(received[0].token, None);
}

#[tokio::test]
async fn test_bearer_header_reaches_server() {
    let (memory, http) = http_backend().await;
    let token = memory.issue_token("ops@dhadak.test").unwrap();

    let created = http
        .send(
            ApiRequest::post(
                "/api/team",
                json!({ "name": "Asha", "role": "Lead", "image_url": "https://img.dhadak.test/a.jpg" }),
            )
            .with_token(Some(token.clone())),
        )
        .await
        .unwrap();

    assert_eq!(created["order"], 0);
    let received = memory.requests().await;
    assert_eq!(received[0].method, Method::Post);
    assert_eq!(received[0].token.as_deref(), Some(token.as_str()));
}

#[tokio::test]
async fn test_string_detail_is_decoded() {
    let (_, http) = http_backend().await;

    let err = http
        .send(ApiRequest::delete("/api/gallery/some-id"))
        .await
        .unwrap_err();

    match err {
        AppError::Rejected { status, detail } => {
            assert_eq!(status, 403);
            assert_eq!(detail.as_deref(), Some("Not authenticated"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_validation_detail_list_is_flattened() {
    let (memory, http) = http_backend().await;
    let token = memory.issue_token("ops@dhadak.test").unwrap();

    let err = http
        .send(
            ApiRequest::post("/api/achievements", json!({ "title": "No date" }))
                .with_token(Some(token)),
        )
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(422));
    assert_eq!(err.notice_detail(), "description: Field required");
}

#[tokio::test]
async fn test_login_and_controller_round_trip_over_http() {
    let (memory, http) = http_backend().await;
    let backend: Arc<HttpBackend> = Arc::new(http);
    let session = Arc::new(Session::load(Arc::new(MemoryStore::new())).unwrap());
    let notifier = Arc::new(RecordingNotifier::new());

    let editor = EditorShell::new(backend.clone(), session.clone(), notifier.clone());
    editor.register("ops@dhadak.test", "hunter22").await.unwrap();
    assert_eq!(session.identity().as_deref(), Some("ops@dhadak.test"));

    let controller = Controller::<TeamMember>::new(backend.clone(), session.clone(), notifier.clone());
    controller.mount().await.unwrap();
    controller.open_for_create().unwrap();
    controller.set_field("name", "Kabir").unwrap();
    controller.set_field("role", "Choreographer").unwrap();
    controller.set_field("image_url", "https://img.dhadak.test/k.jpg").unwrap();
    controller.set_field("order", "4").unwrap();
    controller.submit().await.unwrap();

    let items = controller.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].order, 4);
    assert!(items[0].created_at.is_some());

    // The update endpoint answers with a message, not an item
    controller.open_for_edit(&items[0].id).unwrap();
    controller.set_field("role", "Captain").unwrap();
    controller.submit().await.unwrap();
    assert_eq!(controller.items()[0].role, "Captain");

    let site = PublicSite::new(backend).load().await.unwrap();
    assert_eq!(site.team.len(), 1);
    assert!(memory.requests().await.len() >= 6);
}

#[tokio::test]
async fn test_rejected_update_of_unknown_item() {
    let (memory, http) = http_backend().await;
    let token = memory.issue_token("ops@dhadak.test").unwrap();
    let gateway = dhadak_admin::gateway::Gateway::<Achievement>::new(Arc::new(http));

    let err = gateway
        .update(
            "missing",
            &json!({ "title": "t", "description": "d", "date": "x" }),
            Some(&token),
        )
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(err.notice_detail(), "Achievement not found");
}

#[tokio::test]
async fn test_unreachable_server_is_network_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let origin = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let result = HttpBackend::new(origin)
        .send(ApiRequest::get("/api/gallery"))
        .await;

    assert!(matches!(result, Err(AppError::Network(_))));
}
