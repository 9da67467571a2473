//! OpenAPI 3.0.3 document for the `/actions/*` facade, suitable for
//! importing as custom GPT actions.

use axum::Json;
use serde_json::{json, Map, Value};

/// (name, type, required, repeatable)
type QueryParam = (&'static str, &'static str, bool, bool);

enum Operation {
    Get(&'static [QueryParam]),
    Post,
}

const ROUTES: &[(&str, &str, Operation)] = &[
    ("diagnostics", "diagnostics", Operation::Get(&[("slug", "string", false, false)])),
    ("list_projects", "listProjects", Operation::Get(&[("search", "string", false, false)])),
    ("get_project", "getProject", Operation::Get(&[("project_id", "integer", true, false)])),
    ("get_project_by_slug", "getProjectBySlug", Operation::Get(&[("slug", "string", true, false)])),
    (
        "statuses",
        "listStatuses",
        Operation::Get(&[("project_id", "integer", true, false), ("kind", "string", false, false)]),
    ),
    (
        "list_epics",
        "listEpics",
        Operation::Get(&[
            ("project_id", "integer", false, true),
            ("slug", "string", false, false),
            ("include_details", "boolean", false, false),
            ("page", "integer", false, false),
            ("page_size", "integer", false, false),
        ]),
    ),
    ("get_epic", "getEpic", Operation::Get(&[("epic_id", "integer", true, false)])),
    ("create_epic", "createEpic", Operation::Post),
    ("update_epic", "updateEpic", Operation::Post),
    ("delete_epic", "deleteEpic", Operation::Post),
    ("add_story_to_epic", "addStoryToEpic", Operation::Post),
    (
        "list_stories",
        "listStories",
        Operation::Get(&[
            ("project_id", "integer", true, false),
            ("epic", "integer", false, false),
            ("q", "string", false, false),
            ("tags", "string", false, true),
            ("page", "integer", false, false),
            ("page_size", "integer", false, false),
        ]),
    ),
    ("get_story", "getStory", Operation::Get(&[("story_id", "integer", true, false)])),
    ("create_story", "createStory", Operation::Post),
    ("update_story", "updateStory", Operation::Post),
    ("delete_story", "deleteStory", Operation::Post),
    ("archive_story", "archiveStory", Operation::Post),
    (
        "list_tasks",
        "listTasks",
        Operation::Get(&[
            ("project_id", "integer", false, false),
            ("user_story_id", "integer", false, false),
            ("assigned_to", "integer", false, false),
            ("status", "string", false, false),
            ("search", "string", false, false),
            ("page", "integer", false, false),
            ("page_size", "integer", false, false),
        ]),
    ),
    ("get_task", "getTask", Operation::Get(&[("task_id", "integer", true, false)])),
    ("create_task", "createTask", Operation::Post),
    ("update_task", "updateTask", Operation::Post),
    ("delete_task", "deleteTask", Operation::Post),
    ("archive_task", "archiveTask", Operation::Post),
    (
        "list_issues",
        "listIssues",
        Operation::Get(&[
            ("project_id", "integer", false, false),
            ("assigned_to", "integer", false, false),
            ("status", "string", false, false),
            ("priority", "integer", false, false),
            ("severity", "integer", false, false),
            ("type", "integer", false, false),
            ("search", "string", false, false),
            ("page", "integer", false, false),
            ("page_size", "integer", false, false),
        ]),
    ),
    ("get_issue", "getIssue", Operation::Get(&[("issue_id", "integer", true, false)])),
    ("create_issue", "createIssue", Operation::Post),
    ("update_issue", "updateIssue", Operation::Post),
    ("delete_issue", "deleteIssue", Operation::Post),
];

fn parameter((name, kind, required, repeatable): &QueryParam) -> Value {
    let schema = if *repeatable {
        json!({ "type": "array", "items": { "type": kind } })
    } else {
        json!({ "type": kind })
    };
    json!({ "name": name, "in": "query", "required": required, "schema": schema })
}

fn operation(operation_id: &str, op: &Operation) -> (&'static str, Value) {
    let responses = json!({
        "200": {
            "description": "OK",
            "content": { "application/json": { "schema": { "type": "object" } } }
        }
    });
    match op {
        Operation::Get(params) => (
            "get",
            json!({
                "operationId": operation_id,
                "parameters": params.iter().map(parameter).collect::<Vec<_>>(),
                "responses": responses,
            }),
        ),
        Operation::Post => (
            "post",
            json!({
                "operationId": operation_id,
                "requestBody": {
                    "required": true,
                    "content": {
                        "application/json": {
                            "schema": { "type": "object", "additionalProperties": true }
                        }
                    }
                },
                "responses": responses,
            }),
        ),
    }
}

pub fn openapi_document() -> Value {
    let paths: Map<String, Value> = ROUTES
        .iter()
        .map(|(route, operation_id, op)| {
            let (method, body) = operation(operation_id, op);
            (format!("/actions/{}", route), json!({ method: body }))
        })
        .collect();

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Taiga MCP Action Proxy",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "API-key protected REST facade over Taiga MCP (/actions/*).",
        },
        "servers": [{ "url": "https://REPLACE_WITH_YOUR_TAIGA_MCP_HOST" }],
        "components": {
            "securitySchemes": {
                "ApiKeyAuth": { "type": "apiKey", "in": "header", "name": "X-Api-Key" }
            }
        },
        "security": [{ "ApiKeyAuth": [] }],
        "paths": paths,
    })
}

pub async fn openapi() -> Json<Value> {
    Json(openapi_document())
}
