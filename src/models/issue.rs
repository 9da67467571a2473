use schemars::JsonSchema;
use serde::Deserialize;

use super::{Patch, StatusRef};

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListIssuesInput {
    pub project_id: Option<i64>,
    pub assigned_to: Option<i64>,
    #[schemars(description = "Case-insensitive substring matched against issue subjects")]
    pub search: Option<String>,
    #[schemars(description = "Status id, or a status name (requires project_id)")]
    pub status: Option<StatusRef>,
    pub priority: Option<i64>,
    pub severity: Option<i64>,
    #[serde(alias = "type")]
    pub issue_type: Option<i64>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateIssueInput {
    pub project_id: i64,
    pub subject: String,
    pub description: Option<String>,
    #[schemars(description = "Status id or status name/slug")]
    pub status: Option<StatusRef>,
    pub priority: Option<i64>,
    pub severity: Option<i64>,
    #[serde(alias = "type")]
    pub issue_type: Option<i64>,
    pub assigned_to: Option<i64>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct UpdateIssueInput {
    pub issue_id: i64,
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
    pub priority: Patch<i64>,
    #[serde(default)]
    pub severity: Patch<i64>,
    #[serde(default, alias = "type")]
    pub issue_type: Patch<i64>,
    #[serde(default)]
    pub assigned_to: Patch<i64>,
    #[serde(default)]
    pub tags: Patch<Vec<String>>,
    #[serde(default)]
    pub add_tags: Patch<Vec<String>>,
}
