use schemars::JsonSchema;
use serde::Deserialize;

use super::story::archive_tag_default;
use super::{Patch, StatusRef};

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListTasksInput {
    pub project_id: Option<i64>,
    pub user_story_id: Option<i64>,
    pub assigned_to: Option<i64>,
    #[schemars(description = "Case-insensitive substring matched against task subjects")]
    pub search: Option<String>,
    #[schemars(description = "Status id, or a status name (requires project_id)")]
    pub status: Option<StatusRef>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Task creation. Either `user_story_id` or `project_id` must be given;
/// with a story the project is taken from the story.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CreateTaskInput {
    pub project_id: Option<i64>,
    pub user_story_id: Option<i64>,
    pub subject: String,
    pub description: Option<String>,
    pub assigned_to: Option<i64>,
    #[schemars(description = "Status id or status name/slug")]
    pub status: Option<StatusRef>,
    pub tags: Option<Vec<String>>,
    #[schemars(description = "Due date in YYYY-MM-DD format")]
    pub due_date: Option<String>,
    #[schemars(description = "Caller token that makes retries of this create safe for 24 hours")]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct UpdateTaskInput {
    pub task_id: i64,
    #[serde(default)]
    pub subject: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub append_description: Patch<String>,
    #[serde(default)]
    pub assigned_to: Patch<i64>,
    #[serde(default)]
    #[schemars(description = "Status id or status name/slug")]
    pub status: Patch<StatusRef>,
    #[serde(default)]
    pub tags: Patch<Vec<String>>,
    #[serde(default)]
    pub add_tags: Patch<Vec<String>>,
    #[serde(default)]
    #[schemars(description = "Due date in YYYY-MM-DD format, or null to clear")]
    pub due_date: Patch<String>,
    #[serde(default)]
    pub user_story_id: Patch<i64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ArchiveTaskInput {
    pub task_id: i64,
    #[schemars(description = "Closed status id or name; defaults to the first closed status")]
    pub closed_status: Option<StatusRef>,
    #[serde(default = "archive_tag_default")]
    #[schemars(description = "Add the 'archived-by-mcp' tag (default true)")]
    pub add_archive_tag: bool,
}
