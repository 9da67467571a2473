use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::{Patch, StatusRef};

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListStoriesInput {
    pub project_id: i64,
    #[schemars(description = "Full-text search passed to Taiga")]
    pub search: Option<String>,
    pub epic_id: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub page: Option<i64>,
    #[schemars(description = "Items per page (default 50, max 100)")]
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateStoryInput {
    pub project_id: i64,
    pub subject: String,
    pub description: Option<String>,
    #[schemars(description = "Status id or status name/slug")]
    pub status: Option<StatusRef>,
    pub tags: Option<Vec<String>>,
    pub assigned_to: Option<i64>,
}

/// Partial user story update. Omitted fields are left untouched, `null`
/// clears nullable fields.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct UpdateStoryInput {
    #[serde(alias = "story_id")]
    pub user_story_id: i64,
    /// Project to move the story to, also used for status lookups.
    pub project_id: Option<i64>,
    #[serde(default)]
    pub subject: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub append_description: Patch<String>,
    #[serde(default)]
    #[schemars(description = "Status id or status name/slug")]
    pub status: Patch<StatusRef>,
    #[serde(default)]
    pub tags: Patch<Vec<String>>,
    #[serde(default)]
    pub add_tags: Patch<Vec<String>>,
    #[serde(default)]
    pub assigned_to: Patch<i64>,
    #[serde(default)]
    pub epic_id: Patch<i64>,
    #[serde(default)]
    pub milestone_id: Patch<i64>,
    #[serde(default)]
    pub custom_attributes: Patch<Value>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ArchiveStoryInput {
    #[serde(alias = "story_id")]
    pub user_story_id: i64,
    #[schemars(description = "Closed status id or name; defaults to the first closed status")]
    pub closed_status: Option<StatusRef>,
    #[serde(default = "archive_tag_default")]
    #[schemars(description = "Add the 'archived-by-mcp' tag (default true)")]
    pub add_archive_tag: bool,
}

pub(crate) fn archive_tag_default() -> bool {
    true
}
