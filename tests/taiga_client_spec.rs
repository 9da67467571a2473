//! HTTP behaviour of the reqwest Taiga client against a mock server.

use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use taiga_bridge::models::{ItemKind, Record};
use taiga_bridge::taiga::{Connect, TaigaApi, TaigaConnector, TaigaError, TaigaSettings};

// NOTE: credentials below are fake test values.

fn settings(server: &MockServer) -> TaigaSettings {
    TaigaSettings {
        base_url: Some(format!("{}/api/v1/", server.uri())),
        username: Some("bot@example.com".into()),
        password: Some("secret".into()),
    }
}

async fn mount_login(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/api/v1/auth"))
        .and(body_partial_json(json!({
            "type": "normal",
            "username": "bot@example.com",
            "password": "secret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn connect(server: &MockServer) -> Box<dyn TaigaApi> {
    TaigaConnector::new(settings(server))
        .connect()
        .await
        .expect("Should authenticate")
}

#[tokio::test]
async fn login_id_is_used_as_current_user() {
    let server = MockServer::start().await;
    mount_login(&server, json!({"auth_token": "tok", "id": 42})).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(0)
        .mount(&server)
        .await;

    let api = connect(&server).await;

    assert_eq!(api.current_user_id().await.unwrap(), 42);
}

#[tokio::test]
async fn current_user_falls_back_to_users_me_once() {
    let server = MockServer::start().await;
    mount_login(&server, json!({"auth_token": "tok"})).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let api = connect(&server).await;

    assert_eq!(api.current_user_id().await.unwrap(), 7);
    assert_eq!(api.current_user_id().await.unwrap(), 7);
}

#[tokio::test]
async fn rejected_login_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let err = TaigaConnector::new(settings(&server))
        .connect()
        .await
        .err()
        .expect("Login should fail");

    assert!(matches!(err, TaigaError::Auth { status: 401, .. }));
}

#[tokio::test]
async fn login_without_token_is_unexpected() {
    let server = MockServer::start().await;
    mount_login(&server, json!({"id": 3})).await;

    let err = TaigaConnector::new(settings(&server))
        .connect()
        .await
        .err()
        .expect("Login should fail");

    assert_eq!(
        err.to_string(),
        "Taiga authentication response did not contain auth_token"
    );
}

#[tokio::test]
async fn list_sends_bearer_and_reads_pagination() {
    let server = MockServer::start().await;
    mount_login(&server, json!({"auth_token": "tok", "id": 42})).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/tasks"))
        .and(header("authorization", "Bearer tok"))
        .and(query_param("project", "1"))
        .and(query_param("page_size", "50"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 1, "subject": "a"}, {"id": 2, "subject": "b"}]))
                .insert_header("x-pagination-count", "2")
                .insert_header("x-pagination-current", "1")
                .insert_header("x-paginated-by", "50"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = connect(&server).await;
    let params = vec![
        ("project".to_string(), "1".to_string()),
        ("page_size".to_string(), "50".to_string()),
    ];
    let page = api.list(ItemKind::Task, &params).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.pagination.count, Some(2));
    assert_eq!(page.pagination.page_size, Some(50));
    assert_eq!(page.pagination.next, None);
}

#[tokio::test]
async fn update_is_a_patch_and_409_is_a_conflict() {
    let server = MockServer::start().await;
    mount_login(&server, json!({"auth_token": "tok", "id": 42})).await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/userstories/7"))
        .and(body_partial_json(json!({"version": 3, "subject": "x"})))
        .respond_with(ResponseTemplate::new(409).set_body_string("version mismatch"))
        .expect(1)
        .mount(&server)
        .await;

    let api = connect(&server).await;
    let mut payload = Record::new();
    payload.insert("subject".into(), "x".into());
    payload.insert("version".into(), 3.into());

    let err = api.update(ItemKind::Story, 7, &payload).await.unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(err.status(), Some(409));
}

#[tokio::test]
async fn statuses_come_from_the_kind_specific_endpoint() {
    let server = MockServer::start().await;
    mount_login(&server, json!({"auth_token": "tok", "id": 42})).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/issue-statuses"))
        .and(query_param("project", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 9, "name": "Open"}])))
        .expect(1)
        .mount(&server)
        .await;

    let api = connect(&server).await;
    let statuses = api.list_statuses(ItemKind::Issue, 5).await.unwrap();

    assert_eq!(statuses[0]["id"], 9);
}

#[tokio::test]
async fn empty_bodies_are_accepted() {
    let server = MockServer::start().await;
    mount_login(&server, json!({"auth_token": "tok", "id": 42})).await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/tasks/30"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/epics/3/related_userstories"))
        .and(body_partial_json(json!({"epic": 3, "user_story": 7})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let api = connect(&server).await;

    api.delete(ItemKind::Task, 30).await.unwrap();
    assert_eq!(api.link_epic_user_story(3, 7).await.unwrap(), None);
}

#[tokio::test]
async fn upstream_errors_keep_status_and_body() {
    let server = MockServer::start().await;
    mount_login(&server, json!({"auth_token": "tok", "id": 42})).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/by_slug"))
        .and(query_param("slug", "ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let api = connect(&server).await;
    let err = api.get_project_by_slug("ghost").await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Taiga API request failed with status 404: not found"
    );
}
