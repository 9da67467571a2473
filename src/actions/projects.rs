use serde_json::Value;

use super::{contains_ci, search_term, Actions};
use crate::error::ActionError;
use crate::models::{projection, GetProjectInput, ListProjectsInput, Record};

impl Actions {
    /// Projects visible to the service account, optionally filtered by name.
    ///
    /// Taiga is asked for `member=<service account>` unless the caller
    /// forwarded an explicit `member` parameter.
    pub async fn list_projects(&self, input: ListProjectsInput) -> Result<Vec<Record>, ActionError> {
        let api = self.session().await?;

        let mut params: Vec<(String, String)> = input
            .params
            .into_iter()
            .filter(|(key, _)| key != "search")
            .collect();
        if !params.iter().any(|(key, _)| key == "member") {
            let member = api.current_user_id().await?;
            params.push(("member".to_string(), member.to_string()));
        }

        let projects = api.list_projects(&params).await?;
        let needle = search_term(input.search.as_deref());

        Ok(projects
            .iter()
            .filter(|project| match &needle {
                Some(needle) => contains_ci(project.get("name").and_then(Value::as_str), needle),
                None => true,
            })
            .map(|project| projection::project(project, projection::PROJECT_FIELDS))
            .collect())
    }

    /// One project by id or slug; exactly one of the two must be given.
    pub async fn get_project(&self, input: GetProjectInput) -> Result<Record, ActionError> {
        let project = match (input.project_id, input.slug) {
            (Some(id), None) => self.session().await?.get_project(id).await?,
            (None, Some(slug)) => self.session().await?.get_project_by_slug(&slug).await?,
            _ => {
                return Err(ActionError::validation(
                    "Provide either project_id or slug, but not both",
                ))
            }
        };
        Ok(projection::project(&project, projection::PROJECT_DETAIL_FIELDS))
    }
}
