//! MCP tool tests, calling the tool methods directly against the in-memory
//! Taiga.

mod common;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, ErrorCode};
use rmcp::ServerHandler;
use serde_json::{json, Value};

use common::*;
use taiga_bridge::mcp::*;
use taiga_bridge::models::*;

fn setup() -> (McpServer, FakeTaiga) {
    let fake = seeded();
    (McpServer::new(actions(&fake)), fake)
}

/// Parse the JSON text a tool returned.
fn payload(result: CallToolResult) -> Value {
    let text = &result.content[0]
        .as_text()
        .expect("tool result should be text")
        .text;
    serde_json::from_str(text).expect("tool text should be JSON")
}

#[test]
fn server_info_names_the_bridge() {
    let (server, _) = setup();
    let info = server.get_info();
    assert_eq!(info.server_info.name, "taiga-bridge");
    assert!(info.capabilities.tools.is_some());
}

mod projects {
    use super::*;

    #[tokio::test]
    async fn list_filters_by_search() {
        let (server, _) = setup();

        let result = server
            .projects_list(Parameters(ListProjectsInput {
                search: Some("TOOLS".into()),
                ..Default::default()
            }))
            .await
            .expect("Tool failed");

        let projects = payload(result);
        assert_eq!(projects.as_array().unwrap().len(), 1);
        assert_eq!(projects[0]["slug"], "internal-tools");
    }

    #[tokio::test]
    async fn get_needs_exactly_one_selector() {
        let (server, fake) = setup();

        let err = server
            .projects_get(Parameters(GetProjectInput {
                project_id: Some(1),
                slug: Some("beta-launch".into()),
            }))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(err.message, "Provide either project_id or slug, but not both");
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn get_by_slug() {
        let (server, _) = setup();

        let result = server
            .projects_get(Parameters(GetProjectInput {
                project_id: None,
                slug: Some("beta-launch".into()),
            }))
            .await
            .expect("Tool failed");

        assert_eq!(payload(result)["name"], "Beta Launch");
    }

    #[tokio::test]
    async fn statuses_default_to_stories() {
        let (server, _) = setup();

        let result = server
            .statuses_list(Parameters(ListStatusesInput {
                project_id: 1,
                kind: ItemKind::default(),
            }))
            .await
            .expect("Tool failed");

        let statuses = payload(result);
        assert_eq!(statuses.as_array().unwrap().len(), 3);
        assert_eq!(statuses[2]["is_closed"], true);
        assert!(statuses[0].get("color").is_none());
    }
}

mod stories {
    use super::*;

    #[tokio::test]
    async fn update_reports_validation_kind() {
        let (server, fake) = setup();

        let err = server
            .stories_update(Parameters(UpdateStoryInput {
                user_story_id: 7,
                ..Default::default()
            }))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(err.data, Some(json!({"kind": "validation"})));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn update_conflict_is_invalid_params() {
        let (server, fake) = setup();
        fake.state.lock().unwrap().conflict_on_update = true;

        let err = server
            .stories_update(Parameters(UpdateStoryInput {
                user_story_id: 7,
                subject: Patch::Value("Renamed".into()),
                ..Default::default()
            }))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(err.data, Some(json!({"kind": "conflict"})));
    }

    #[tokio::test]
    async fn unknown_status_name_is_invalid_params() {
        let (server, fake) = setup();

        let err = server
            .stories_update(Parameters(UpdateStoryInput {
                user_story_id: 7,
                status: Patch::Value(StatusRef::from("Blocked")),
                ..Default::default()
            }))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(err.message, "Status 'Blocked' not found for project 1");
        assert_eq!(err.data, Some(json!({"kind": "validation"})));
        assert!(fake.updates().is_empty());
    }

    #[tokio::test]
    async fn get_hides_upstream_noise() {
        let (server, fake) = setup();
        fake.state
            .lock()
            .unwrap()
            .records
            .get_mut(&(1, 7))
            .unwrap()
            .insert("watchers".into(), json!([1, 2]));

        let result = server
            .stories_get(Parameters(StoryIdRequest { user_story_id: 7 }))
            .await
            .expect("Tool failed");

        let story = payload(result);
        assert_eq!(story["subject"], "Login page");
        assert!(story.get("watchers").is_none());
    }

    #[tokio::test]
    async fn delete_returns_id_and_flag() {
        let (server, fake) = setup();

        let result = server
            .stories_delete(Parameters(StoryIdRequest { user_story_id: 7 }))
            .await
            .expect("Tool failed");

        assert_eq!(payload(result), json!({"id": 7, "deleted": true}));
        assert!(fake.stored(ItemKind::Story, 7).is_none());
    }

    #[tokio::test]
    async fn missing_story_is_an_upstream_error() {
        let (server, _) = setup();

        let err = server
            .stories_get(Parameters(StoryIdRequest { user_story_id: 404 }))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::INVALID_REQUEST);
        assert_eq!(err.data, Some(json!({"kind": "upstream", "status": 404})));
    }
}

mod epics {
    use super::*;

    #[tokio::test]
    async fn list_without_project_or_default_fails() {
        let (server, _) = setup();

        let err = server
            .epics_list(Parameters(ListEpicsRequest {
                project_id: None,
                include_details: false,
                page: None,
                page_size: None,
            }))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn list_paginates_locally() {
        let mut fake = seeded();
        for id in 1..=5 {
            fake = fake.with_record(
                ItemKind::Epic,
                json!({"id": id, "subject": format!("Epic {}", id), "project": 1, "tags": ["x"]}),
            );
        }
        let server = McpServer::new(actions(&fake));

        let result = server
            .epics_list(Parameters(ListEpicsRequest {
                project_id: Some(1),
                include_details: true,
                page: Some(2),
                page_size: Some(2),
            }))
            .await
            .expect("Tool failed");

        let epics = payload(result);
        let ids: Vec<i64> = epics
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![3, 4]);
        assert_eq!(epics[0]["tags"], json!(["x"]));
        assert_eq!(epics[0]["project_id"], 1);
    }

    #[tokio::test]
    async fn create_resolves_epic_status() {
        let fake = seeded().with_statuses(
            ItemKind::Epic,
            json!([{"id": 40, "name": "Ready", "slug": "ready", "is_closed": false}]),
        );
        let server = McpServer::new(actions(&fake));

        let result = server
            .epics_create(Parameters(CreateEpicInput {
                project_id: 1,
                subject: "Onboarding".into(),
                description: None,
                status: Some(StatusRef::from("ready")),
                assigned_to: None,
                tags: None,
                color: Some("#A5694F".into()),
            }))
            .await
            .expect("Tool failed");

        let epic = payload(result);
        assert_eq!(epic["status"], 40);
        assert_eq!(epic["color"], "#A5694F");
    }
}

mod tasks {
    use super::*;

    #[tokio::test]
    async fn archive_uses_task_statuses() {
        let fake = seeded().with_record(
            ItemKind::Task,
            json!({"id": 30, "project": 1, "subject": "t", "version": 2, "tags": ["a"]}),
        );
        let server = McpServer::new(actions(&fake));

        let result = server
            .tasks_archive_or_close(Parameters(ArchiveTaskInput {
                task_id: 30,
                closed_status: None,
                add_archive_tag: true,
            }))
            .await
            .expect("Tool failed");

        let task = payload(result);
        assert_eq!(task["status"], 12);
        assert_eq!(task["tags"], json!(["a", "archived-by-mcp"]));
    }

    #[tokio::test]
    async fn list_returns_items_and_pagination() {
        let fake = seeded().with_record(
            ItemKind::Task,
            json!({"id": 30, "project": 1, "subject": "t"}),
        );
        let server = McpServer::new(actions(&fake));

        let result = server
            .tasks_list(Parameters(ListTasksInput {
                project_id: Some(1),
                ..Default::default()
            }))
            .await
            .expect("Tool failed");

        let listing = payload(result);
        assert_eq!(listing["tasks"][0]["id"], 30);
        assert!(listing["pagination"].is_object());
    }
}

mod people {
    use super::*;

    #[tokio::test]
    async fn users_without_project_do_not_fall_back() {
        let fake = seeded().with_users(
            json!([{"id": 5, "full_name": "Ada", "username": "ada", "photo": "x.png"}]),
            json!([]),
        );
        let server = McpServer::new(actions(&fake));

        let result = server
            .users_list(Parameters(ListUsersInput::default()))
            .await
            .expect("Tool failed");

        assert_eq!(
            payload(result),
            json!([{"id": 5, "full_name": "Ada", "username": "ada"}])
        );
        assert!(!fake
            .calls()
            .iter()
            .any(|c| matches!(c, Call::ListMemberships(_))));
    }
}
