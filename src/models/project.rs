use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListProjectsInput {
    #[schemars(description = "Case-insensitive substring matched against project names")]
    pub search: Option<String>,
    /// Extra query parameters forwarded to Taiga (REST callers only).
    /// An explicit `member` here replaces the service-account scope.
    #[serde(skip)]
    pub params: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GetProjectInput {
    #[schemars(description = "Numeric project id (mutually exclusive with slug)")]
    pub project_id: Option<i64>,
    #[schemars(description = "Project slug (mutually exclusive with project_id)")]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct DiagnosticsInput {
    #[schemars(description = "Optional slug to look for among the accessible projects")]
    pub project_slug: Option<String>,
}
