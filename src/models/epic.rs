use schemars::JsonSchema;
use serde::Deserialize;

use super::{Patch, StatusRef};

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListEpicsInput {
    /// Projects to list. Empty means "use the configured default".
    #[serde(default)]
    pub project_ids: Vec<i64>,
    /// Slug used when no project id is given and no default id is configured.
    pub slug: Option<String>,
    #[serde(default)]
    pub include_details: bool,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateEpicInput {
    #[schemars(description = "Project that will own the epic")]
    pub project_id: i64,
    pub subject: String,
    pub description: Option<String>,
    #[schemars(description = "Status id or status name/slug")]
    pub status: Option<StatusRef>,
    pub assigned_to: Option<i64>,
    pub tags: Option<Vec<String>>,
    #[schemars(description = "Hex color such as #A5694F")]
    pub color: Option<String>,
}

/// Partial epic update. Omitted fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct UpdateEpicInput {
    pub epic_id: i64,
    #[serde(default)]
    pub subject: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    #[schemars(description = "Text appended to the current description")]
    pub append_description: Patch<String>,
    #[serde(default)]
    #[schemars(description = "Status id or status name/slug")]
    pub status: Patch<StatusRef>,
    #[serde(default)]
    pub assigned_to: Patch<i64>,
    #[serde(default)]
    #[schemars(description = "Replaces all tags")]
    pub tags: Patch<Vec<String>>,
    #[serde(default)]
    #[schemars(description = "Merged into the existing tags")]
    pub add_tags: Patch<Vec<String>>,
    #[serde(default)]
    pub color: Patch<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LinkStoryInput {
    pub epic_id: i64,
    pub user_story_id: i64,
}
