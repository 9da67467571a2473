use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListUsersInput {
    #[schemars(description = "Restrict to members of this project")]
    pub project_id: Option<i64>,
    #[schemars(description = "Case-insensitive match on full name, username or email")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListMilestonesInput {
    pub project_id: i64,
    #[schemars(description = "Case-insensitive match on milestone name or slug")]
    pub search: Option<String>,
}
