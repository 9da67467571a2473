use serde_json::Value;

use super::{contains_ci, search_term, Actions};
use crate::error::ActionError;
use crate::models::{projection, ListMilestonesInput, ListUsersInput, Record};

/// Memberships nest the user under `user`; plain user rows do not.
fn unwrap_user(entry: Record) -> Record {
    match entry.get("user") {
        Some(Value::Object(user)) => user.clone(),
        _ => entry,
    }
}

impl Actions {
    /// Users for id lookups. Falls back to project memberships when Taiga
    /// refuses the user listing (401/403) for a project.
    pub async fn list_users(&self, input: ListUsersInput) -> Result<Vec<Record>, ActionError> {
        let api = self.session().await?;
        let users = match (api.list_users(input.project_id).await, input.project_id) {
            (Ok(users), _) => users,
            (Err(err), Some(project_id)) if matches!(err.status(), Some(401 | 403)) => {
                tracing::debug!("User listing refused, falling back to memberships: {}", err);
                api.list_memberships(project_id).await?
            }
            (Err(err), _) => return Err(err.into()),
        };

        let needle = search_term(input.search.as_deref());
        Ok(users
            .into_iter()
            .map(unwrap_user)
            .map(|user| projection::project(&user, projection::USER_FIELDS))
            .filter(|user| match &needle {
                Some(needle) => ["full_name", "username", "email"]
                    .iter()
                    .any(|key| contains_ci(user.get(*key).and_then(Value::as_str), needle)),
                None => true,
            })
            .collect())
    }

    pub async fn list_milestones(&self, input: ListMilestonesInput) -> Result<Vec<Record>, ActionError> {
        let milestones = self
            .session()
            .await?
            .list_milestones(input.project_id)
            .await?;

        let needle = search_term(input.search.as_deref());
        Ok(milestones
            .iter()
            .map(|milestone| projection::project(milestone, projection::MILESTONE_FIELDS))
            .filter(|milestone| match &needle {
                Some(needle) => ["name", "slug"]
                    .iter()
                    .any(|key| contains_ci(milestone.get(*key).and_then(Value::as_str), needle)),
                None => true,
            })
            .collect())
    }
}
