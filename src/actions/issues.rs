use serde_json::Value;

use super::{
    contains_ci, int_field, patch_value, search_term, status::resolve_status, update_versioned,
    Actions, CommonUpdate, Listing,
};
use crate::error::ActionError;
use crate::models::{
    effective_page_size, projection, CreateIssueInput, ItemKind, ListIssuesInput, Record,
    StatusRef, UpdateIssueInput,
};

const ISSUE_PAGE_SIZE: i64 = 50;
const ISSUE_PAGE_CEILING: i64 = 100;

impl Actions {
    pub async fn list_issues(&self, input: ListIssuesInput) -> Result<Listing, ActionError> {
        if matches!(input.status, Some(StatusRef::Name(_))) && input.project_id.is_none() {
            return Err(ActionError::validation(
                "project_id is required when filtering by status name",
            ));
        }

        let api = self.session().await?;
        let status = match (input.status, input.project_id) {
            (Some(status), Some(project_id)) => {
                resolve_status(api.as_ref(), ItemKind::Issue, project_id, Some(status)).await?
            }
            (Some(StatusRef::Id(id)), None) => Some(id),
            _ => None,
        };

        let filters = [
            ("project", input.project_id),
            ("assigned_to", input.assigned_to),
            ("status", status),
            ("priority", input.priority),
            ("severity", input.severity),
            ("type", input.issue_type),
            ("page", input.page),
        ];
        let mut params: Vec<(String, String)> = filters
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key.to_string(), v.to_string())))
            .collect();
        let page_size = effective_page_size(input.page_size, ISSUE_PAGE_SIZE, ISSUE_PAGE_CEILING);
        params.push(("page_size".to_string(), page_size.to_string()));

        let page = api.list(ItemKind::Issue, &params).await?;
        let needle = search_term(input.search.as_deref());
        let items = page
            .items
            .iter()
            .filter(|issue| match &needle {
                Some(needle) => contains_ci(issue.get("subject").and_then(Value::as_str), needle),
                None => true,
            })
            .map(|issue| projection::project(issue, projection::ISSUE_FIELDS))
            .collect();

        Ok(Listing {
            items,
            pagination: page.pagination,
        })
    }

    pub async fn get_issue(&self, issue_id: i64) -> Result<Record, ActionError> {
        let issue = self.session().await?.get(ItemKind::Issue, issue_id).await?;
        Ok(projection::project(&issue, projection::ISSUE_FIELDS))
    }

    pub async fn create_issue(&self, input: CreateIssueInput) -> Result<Record, ActionError> {
        let api = self.session().await?;
        let status = resolve_status(api.as_ref(), ItemKind::Issue, input.project_id, input.status).await?;

        let mut payload = Record::new();
        payload.insert("project".into(), input.project_id.into());
        payload.insert("subject".into(), input.subject.into());
        if let Some(description) = input.description {
            payload.insert("description".into(), description.into());
        }
        let numbers = [
            ("status", status),
            ("priority", input.priority),
            ("severity", input.severity),
            ("issue_type", input.issue_type),
            ("assigned_to", input.assigned_to),
        ];
        for (key, value) in numbers {
            if let Some(value) = value {
                payload.insert(key.into(), value.into());
            }
        }
        if let Some(tags) = input.tags {
            payload.insert("tags".into(), tags.into());
        }

        let issue = api.create(ItemKind::Issue, &payload).await?;
        tracing::info!(issue_id = ?int_field(&issue, "id"), "Created issue");
        Ok(projection::project(&issue, projection::ISSUE_FIELDS))
    }

    pub async fn update_issue(&self, input: UpdateIssueInput) -> Result<Record, ActionError> {
        let common = CommonUpdate {
            subject: input.subject,
            description: input.description,
            append_description: input.append_description,
            status: input.status,
            tags: input.tags,
            add_tags: input.add_tags,
            assigned_to: input.assigned_to,
        };
        common.validate()?;
        let classifiers = [
            ("priority", input.priority),
            ("severity", input.severity),
            ("issue_type", input.issue_type),
        ];
        if !common.has_changes() && !classifiers.iter().any(|(_, p)| p.is_supplied()) {
            return Err(ActionError::validation(
                "At least one field must be provided to update",
            ));
        }

        let api = self.session().await?;
        let existing = api.get(ItemKind::Issue, input.issue_id).await?;

        let mut payload = Record::new();
        common
            .apply(api.as_ref(), ItemKind::Issue, None, &existing, &mut payload)
            .await?;
        for (key, patch) in classifiers {
            if let Some(value) = patch_value(patch, Value::Null) {
                payload.insert(key.into(), value);
            }
        }

        let issue = update_versioned(api.as_ref(), ItemKind::Issue, input.issue_id, &existing, payload).await?;
        Ok(projection::project(&issue, projection::ISSUE_FIELDS))
    }

    pub async fn delete_issue(&self, issue_id: i64) -> Result<(), ActionError> {
        self.session().await?.delete(ItemKind::Issue, issue_id).await?;
        tracing::info!(issue_id, "Deleted issue");
        Ok(())
    }
}
