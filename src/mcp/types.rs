//! Tool arguments that are not shared with the action layer.

use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::ListEpicsInput;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListEpicsRequest {
    #[schemars(
        description = "Taiga project id. Falls back to TAIGA_PROJECT_ID / TAIGA_PROJECT_SLUG when omitted"
    )]
    pub project_id: Option<i64>,
    #[schemars(description = "Include description and tags (default false for a minimal payload)")]
    #[serde(default)]
    pub include_details: bool,
    #[schemars(description = "Page number (1-indexed)")]
    pub page: Option<i64>,
    #[schemars(description = "Items per page (default and max 50)")]
    pub page_size: Option<i64>,
}

impl From<ListEpicsRequest> for ListEpicsInput {
    fn from(req: ListEpicsRequest) -> Self {
        Self {
            project_ids: req.project_id.into_iter().collect(),
            slug: None,
            include_details: req.include_details,
            page: req.page,
            page_size: req.page_size,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EpicIdRequest {
    #[schemars(description = "Numeric epic id")]
    pub epic_id: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct StoryIdRequest {
    #[schemars(description = "Numeric user story id")]
    pub user_story_id: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TaskIdRequest {
    #[schemars(description = "Numeric task id")]
    pub task_id: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct IssueIdRequest {
    #[schemars(description = "Numeric issue id")]
    pub issue_id: i64,
}

/// Result of a delete tool.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: i64,
    pub deleted: bool,
}

impl DeletedResponse {
    pub fn new(id: i64) -> Self {
        Self { id, deleted: true }
    }
}
