//! Status name-to-id resolution.

use serde_json::Value;

use super::int_field;
use crate::error::ActionError;
use crate::models::{projection, ItemKind, Record, StatusRef};
use crate::taiga::TaigaApi;

/// An unresolvable status is the caller's to fix.
fn not_found(kind: ItemKind, message: String) -> ActionError {
    tracing::debug!(kind = kind.label(), "{}", message);
    ActionError::Validation(message)
}

fn status_noun(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Epic => "Epic status",
        ItemKind::Story => "Status",
        ItemKind::Task => "Task status",
        ItemKind::Issue => "Issue status",
    }
}

/// Turn an optional status reference into an id.
pub async fn resolve_status(
    api: &dyn TaigaApi,
    kind: ItemKind,
    project_id: i64,
    status: Option<StatusRef>,
) -> Result<Option<i64>, ActionError> {
    match status {
        None => Ok(None),
        Some(status) => resolve_status_ref(api, kind, project_id, status).await.map(Some),
    }
}

/// Ids pass through untouched; names are matched exactly against `name`
/// or `slug` of the project's statuses for `kind`, re-fetched on every call.
pub async fn resolve_status_ref(
    api: &dyn TaigaApi,
    kind: ItemKind,
    project_id: i64,
    status: StatusRef,
) -> Result<i64, ActionError> {
    let name = match status {
        StatusRef::Id(id) => return Ok(id),
        StatusRef::Name(name) => name,
    };

    let statuses = api.list_statuses(kind, project_id).await?;
    statuses
        .iter()
        .find(|entry| {
            [entry.get("name"), entry.get("slug")]
                .into_iter()
                .flatten()
                .any(|value| value.as_str() == Some(name.as_str()))
        })
        .and_then(|entry| int_field(entry, "id"))
        .ok_or_else(|| {
            not_found(
                kind,
                format!(
                    "{} '{}' not found for project {}",
                    status_noun(kind),
                    name,
                    project_id
                ),
            )
        })
}

/// First status flagged `is_closed`, in Taiga's listing order.
pub async fn closed_status(
    api: &dyn TaigaApi,
    kind: ItemKind,
    project_id: i64,
) -> Result<i64, ActionError> {
    let statuses = api.list_statuses(kind, project_id).await?;
    statuses
        .iter()
        .find(|entry| entry.get("is_closed").and_then(Value::as_bool) == Some(true))
        .and_then(|entry| int_field(entry, "id"))
        .ok_or_else(|| {
            not_found(
                kind,
                format!(
                    "No closed {} status found for project {}",
                    match kind {
                        ItemKind::Story => "story",
                        other => other.label(),
                    },
                    project_id
                ),
            )
        })
}

impl super::Actions {
    /// Statuses of one item kind in a project.
    pub async fn list_statuses(
        &self,
        kind: ItemKind,
        project_id: i64,
    ) -> Result<Vec<Record>, ActionError> {
        let api = self.session().await?;
        let statuses = api.list_statuses(kind, project_id).await?;
        Ok(projection::project_all(&statuses, projection::STATUS_FIELDS))
    }
}
