//! MCP server exposing Taiga as `taiga.<area>.<verb>` tools.

mod service;
mod types;

pub use service::create_mcp_service;
pub use types::*;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Serialize;
use serde_json::json;

use crate::actions::Actions;
use crate::models::*;

#[derive(Clone)]
pub struct McpServer {
    actions: Actions,
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    pub fn new(actions: Actions) -> Self {
        Self {
            actions,
            tool_router: Self::tool_router(),
        }
    }
}

/// Pretty-printed JSON text content.
fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[tool_router]
impl McpServer {
    // ============================================================
    // Projects
    // ============================================================

    #[tool(
        name = "taiga.projects.list",
        description = "Return the Taiga projects the service account is a member of. Optional `search` filters by project name (case-insensitive substring).",
        annotations(read_only_hint = true, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn projects_list(
        &self,
        params: Parameters<ListProjectsInput>,
    ) -> Result<CallToolResult, McpError> {
        let projects = self.actions.list_projects(params.0).await?;
        json_result(&projects)
    }

    #[tool(
        name = "taiga.projects.get",
        description = "Fetch project details by numeric `project_id` or by `slug`. Provide exactly one of them.",
        annotations(read_only_hint = true, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn projects_get(
        &self,
        params: Parameters<GetProjectInput>,
    ) -> Result<CallToolResult, McpError> {
        let project = self.actions.get_project(params.0).await?;
        json_result(&project)
    }

    #[tool(
        name = "taiga.diagnostics",
        description = "Return non-sensitive runtime diagnostics: Taiga base URL, redacted username, service user id, accessible project count and a sample of slugs. Use it to debug a deployed instance.",
        annotations(read_only_hint = true, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn diagnostics(
        &self,
        params: Parameters<DiagnosticsInput>,
    ) -> Result<CallToolResult, McpError> {
        let diagnostics = self.actions.diagnostics(params.0).await?;
        json_result(&diagnostics)
    }

    #[tool(
        name = "taiga.statuses.list",
        description = "List the statuses of a project for one item kind (`story` by default, or `task`, `issue`, `epic`). Status names returned here can be passed wherever a `status` is accepted.",
        annotations(read_only_hint = true, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn statuses_list(
        &self,
        params: Parameters<ListStatusesInput>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let statuses = self.actions.list_statuses(req.kind, req.project_id).await?;
        json_result(&statuses)
    }

    // ============================================================
    // Epics
    // ============================================================

    #[tool(
        name = "taiga.epics.list",
        description = "List epics for a project with optional pagination (page size default and max 50). Set `include_details` to add description and tags.",
        annotations(read_only_hint = true, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn epics_list(
        &self,
        params: Parameters<ListEpicsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let epics = self.actions.list_epics(params.0.into()).await?;
        json_result(&epics)
    }

    #[tool(
        name = "taiga.epics.get",
        description = "Get a single epic by id.",
        annotations(read_only_hint = true, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn epics_get(
        &self,
        params: Parameters<EpicIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let epic = self.actions.get_epic(params.0.epic_id).await?;
        json_result(&epic)
    }

    #[tool(
        name = "taiga.epics.create",
        description = "Create an epic in a project. `status` may be a status id or a status name/slug.",
        annotations(idempotent_hint = false, destructive_hint = false, open_world_hint = true)
    )]
    pub async fn epics_create(
        &self,
        params: Parameters<CreateEpicInput>,
    ) -> Result<CallToolResult, McpError> {
        let epic = self.actions.create_epic(params.0).await?;
        json_result(&epic)
    }

    #[tool(
        name = "taiga.epics.update",
        description = "Partially update an epic. Omitted fields are unchanged; `null` clears nullable fields. Use `append_description` / `add_tags` to extend instead of replacing.",
        annotations(idempotent_hint = false, destructive_hint = false, open_world_hint = true)
    )]
    pub async fn epics_update(
        &self,
        params: Parameters<UpdateEpicInput>,
    ) -> Result<CallToolResult, McpError> {
        let epic = self.actions.update_epic(params.0).await?;
        json_result(&epic)
    }

    #[tool(
        name = "taiga.epics.delete",
        description = "Permanently delete an epic.",
        annotations(idempotent_hint = true, destructive_hint = true, open_world_hint = true)
    )]
    pub async fn epics_delete(
        &self,
        params: Parameters<EpicIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let epic_id = params.0.epic_id;
        self.actions.delete_epic(epic_id).await?;
        json_result(&DeletedResponse::new(epic_id))
    }

    #[tool(
        name = "taiga.epics.add_user_story",
        description = "Link an existing user story to an epic.",
        annotations(idempotent_hint = false, destructive_hint = false, open_world_hint = true)
    )]
    pub async fn epics_add_user_story(
        &self,
        params: Parameters<LinkStoryInput>,
    ) -> Result<CallToolResult, McpError> {
        let link = self.actions.link_story_to_epic(params.0).await?;
        json_result(&link)
    }

    // ============================================================
    // User stories
    // ============================================================

    #[tool(
        name = "taiga.stories.list",
        description = "List user stories of a project, optionally filtered by epic, free-text search and tags. Page size defaults to 50 (max 100).",
        annotations(read_only_hint = true, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn stories_list(
        &self,
        params: Parameters<ListStoriesInput>,
    ) -> Result<CallToolResult, McpError> {
        let stories = self.actions.list_stories(params.0).await?;
        json_result(&stories)
    }

    #[tool(
        name = "taiga.stories.get",
        description = "Get a user story by id, including its description, status details and version.",
        annotations(read_only_hint = true, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn stories_get(
        &self,
        params: Parameters<StoryIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let story = self.actions.get_story(params.0.user_story_id).await?;
        json_result(&story)
    }

    #[tool(
        name = "taiga.stories.create",
        description = "Create a user story. `status` may be a status id or a status name/slug of the project.",
        annotations(idempotent_hint = false, destructive_hint = false, open_world_hint = true)
    )]
    pub async fn stories_create(
        &self,
        params: Parameters<CreateStoryInput>,
    ) -> Result<CallToolResult, McpError> {
        let story = self.actions.create_story(params.0).await?;
        json_result(&story)
    }

    #[tool(
        name = "taiga.stories.update",
        description = "Partially update a user story. Omitted fields are unchanged; `null` clears assigned_to, milestone_id, epic_id, description (to empty) and tags (to none). `description`/`append_description` and `tags`/`add_tags` are mutually exclusive.",
        annotations(idempotent_hint = false, destructive_hint = false, open_world_hint = true)
    )]
    pub async fn stories_update(
        &self,
        params: Parameters<UpdateStoryInput>,
    ) -> Result<CallToolResult, McpError> {
        let story = self.actions.update_story(params.0).await?;
        json_result(&story)
    }

    #[tool(
        name = "taiga.stories.delete",
        description = "Permanently delete a user story. Prefer taiga.stories.archive_or_close to keep history.",
        annotations(idempotent_hint = true, destructive_hint = true, open_world_hint = true)
    )]
    pub async fn stories_delete(
        &self,
        params: Parameters<StoryIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let story_id = params.0.user_story_id;
        self.actions.delete_story(story_id).await?;
        json_result(&DeletedResponse::new(story_id))
    }

    #[tool(
        name = "taiga.stories.archive_or_close",
        description = "Soft-delete a user story: move it to `closed_status` (or the project's first closed status) and tag it archived-by-mcp unless `add_archive_tag` is false.",
        annotations(idempotent_hint = false, destructive_hint = false, open_world_hint = true)
    )]
    pub async fn stories_archive_or_close(
        &self,
        params: Parameters<ArchiveStoryInput>,
    ) -> Result<CallToolResult, McpError> {
        let story = self.actions.archive_story(params.0).await?;
        json_result(&story)
    }

    // ============================================================
    // Tasks
    // ============================================================

    #[tool(
        name = "taiga.tasks.list",
        description = "List tasks with optional filters (project, user story, assignee, status, subject search). Filtering by status name requires project_id. Returns tasks and pagination metadata.",
        annotations(read_only_hint = true, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn tasks_list(
        &self,
        params: Parameters<ListTasksInput>,
    ) -> Result<CallToolResult, McpError> {
        let listing = self.actions.list_tasks(params.0).await?;
        json_result(&json!({ "tasks": listing.items, "pagination": listing.pagination }))
    }

    #[tool(
        name = "taiga.tasks.get",
        description = "Get a task by id.",
        annotations(read_only_hint = true, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn tasks_get(
        &self,
        params: Parameters<TaskIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let task = self.actions.get_task(params.0.task_id).await?;
        json_result(&task)
    }

    #[tool(
        name = "taiga.tasks.create",
        description = "Create a task under a user story (project taken from the story) or directly in a project. `due_date` is YYYY-MM-DD. Pass an `idempotency_key` to make retries safe for 24 hours.",
        annotations(idempotent_hint = false, destructive_hint = false, open_world_hint = true)
    )]
    pub async fn tasks_create(
        &self,
        params: Parameters<CreateTaskInput>,
    ) -> Result<CallToolResult, McpError> {
        let task = self.actions.create_task(params.0).await?;
        json_result(&task)
    }

    #[tool(
        name = "taiga.tasks.update",
        description = "Partially update a task. Omitted fields are unchanged; `null` clears assigned_to, due_date and user_story_id.",
        annotations(idempotent_hint = false, destructive_hint = false, open_world_hint = true)
    )]
    pub async fn tasks_update(
        &self,
        params: Parameters<UpdateTaskInput>,
    ) -> Result<CallToolResult, McpError> {
        let task = self.actions.update_task(params.0).await?;
        json_result(&task)
    }

    #[tool(
        name = "taiga.tasks.delete",
        description = "Permanently delete a task.",
        annotations(idempotent_hint = true, destructive_hint = true, open_world_hint = true)
    )]
    pub async fn tasks_delete(
        &self,
        params: Parameters<TaskIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let task_id = params.0.task_id;
        self.actions.delete_task(task_id).await?;
        json_result(&DeletedResponse::new(task_id))
    }

    #[tool(
        name = "taiga.tasks.archive_or_close",
        description = "Soft-delete a task: move it to `closed_status` (or the first closed task status) and tag it archived-by-mcp unless `add_archive_tag` is false.",
        annotations(idempotent_hint = false, destructive_hint = false, open_world_hint = true)
    )]
    pub async fn tasks_archive_or_close(
        &self,
        params: Parameters<ArchiveTaskInput>,
    ) -> Result<CallToolResult, McpError> {
        let task = self.actions.archive_task(params.0).await?;
        json_result(&task)
    }

    // ============================================================
    // Issues
    // ============================================================

    #[tool(
        name = "taiga.issues.list",
        description = "List issues with optional filters (project, assignee, status, priority, severity, type, subject search). Returns issues and pagination metadata.",
        annotations(read_only_hint = true, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn issues_list(
        &self,
        params: Parameters<ListIssuesInput>,
    ) -> Result<CallToolResult, McpError> {
        let listing = self.actions.list_issues(params.0).await?;
        json_result(&json!({ "issues": listing.items, "pagination": listing.pagination }))
    }

    #[tool(
        name = "taiga.issues.get",
        description = "Get an issue by id.",
        annotations(read_only_hint = true, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn issues_get(
        &self,
        params: Parameters<IssueIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let issue = self.actions.get_issue(params.0.issue_id).await?;
        json_result(&issue)
    }

    #[tool(
        name = "taiga.issues.create",
        description = "Create an issue. priority, severity and issue_type are Taiga ids; `status` may be an id or a name/slug.",
        annotations(idempotent_hint = false, destructive_hint = false, open_world_hint = true)
    )]
    pub async fn issues_create(
        &self,
        params: Parameters<CreateIssueInput>,
    ) -> Result<CallToolResult, McpError> {
        let issue = self.actions.create_issue(params.0).await?;
        json_result(&issue)
    }

    #[tool(
        name = "taiga.issues.update",
        description = "Partially update an issue. Omitted fields are unchanged; `null` clears nullable fields.",
        annotations(idempotent_hint = false, destructive_hint = false, open_world_hint = true)
    )]
    pub async fn issues_update(
        &self,
        params: Parameters<UpdateIssueInput>,
    ) -> Result<CallToolResult, McpError> {
        let issue = self.actions.update_issue(params.0).await?;
        json_result(&issue)
    }

    #[tool(
        name = "taiga.issues.delete",
        description = "Permanently delete an issue.",
        annotations(idempotent_hint = true, destructive_hint = true, open_world_hint = true)
    )]
    pub async fn issues_delete(
        &self,
        params: Parameters<IssueIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let issue_id = params.0.issue_id;
        self.actions.delete_issue(issue_id).await?;
        json_result(&DeletedResponse::new(issue_id))
    }

    // ============================================================
    // People and planning
    // ============================================================

    #[tool(
        name = "taiga.users.list",
        description = "List users (id, full_name, username, email), scoped to a project when `project_id` is given. Use it to find ids for assigned_to.",
        annotations(read_only_hint = true, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn users_list(
        &self,
        params: Parameters<ListUsersInput>,
    ) -> Result<CallToolResult, McpError> {
        let users = self.actions.list_users(params.0).await?;
        json_result(&users)
    }

    #[tool(
        name = "taiga.milestones.list",
        description = "List the milestones (sprints) of a project, optionally filtered by name or slug.",
        annotations(read_only_hint = true, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn milestones_list(
        &self,
        params: Parameters<ListMilestonesInput>,
    ) -> Result<CallToolResult, McpError> {
        let milestones = self.actions.list_milestones(params.0).await?;
        json_result(&milestones)
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "taiga-bridge".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            instructions: Some(
                r#"Tools for reading and editing a Taiga instance through a service account.

- Start with taiga.projects.list to find project ids.
- Statuses can be given by id or by name/slug; taiga.statuses.list shows the options.
- Updates are partial. Send only the fields to change; null clears a field.
- Updates use optimistic concurrency. A conflict error names the latest version; re-read and retry deliberately.
- Prefer archive_or_close over delete to keep history.
- Pass idempotency_key to taiga.tasks.create when a retry might repeat the call."#
                    .into(),
            ),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(actions: Actions) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = McpServer::new(actions);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
