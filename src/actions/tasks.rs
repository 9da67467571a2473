use serde_json::Value;

use super::{
    contains_ci, int_field, patch_value, record_project, search_term, status::resolve_status,
    update_versioned, validate_due_date, Actions, CommonUpdate, Listing,
};
use crate::error::ActionError;
use crate::idempotency;
use crate::models::{
    effective_page_size, projection, ArchiveTaskInput, CreateTaskInput, ItemKind, ListTasksInput,
    Patch, Record, StatusRef, UpdateTaskInput,
};

const TASK_PAGE_SIZE: i64 = 50;
const TASK_PAGE_CEILING: i64 = 100;

/// Where a new task hangs.
enum Parent {
    Story(i64),
    Project(i64),
}

impl Actions {
    /// Tasks matching the filters, with Taiga's pagination metadata.
    pub async fn list_tasks(&self, input: ListTasksInput) -> Result<Listing, ActionError> {
        if matches!(input.status, Some(StatusRef::Name(_))) && input.project_id.is_none() {
            return Err(ActionError::validation(
                "project_id is required when filtering by status name",
            ));
        }

        let api = self.session().await?;
        let status = match (input.status, input.project_id) {
            (Some(status), Some(project_id)) => {
                resolve_status(api.as_ref(), ItemKind::Task, project_id, Some(status)).await?
            }
            (Some(StatusRef::Id(id)), None) => Some(id),
            _ => None,
        };

        let mut params = Vec::new();
        if let Some(project) = input.project_id {
            params.push(("project".to_string(), project.to_string()));
        }
        if let Some(story) = input.user_story_id {
            params.push(("user_story".to_string(), story.to_string()));
        }
        if let Some(assigned_to) = input.assigned_to {
            params.push(("assigned_to".to_string(), assigned_to.to_string()));
        }
        if let Some(status) = status {
            params.push(("status".to_string(), status.to_string()));
        }
        if let Some(page) = input.page {
            params.push(("page".to_string(), page.to_string()));
        }
        let page_size = effective_page_size(input.page_size, TASK_PAGE_SIZE, TASK_PAGE_CEILING);
        params.push(("page_size".to_string(), page_size.to_string()));

        let page = api.list(ItemKind::Task, &params).await?;
        let needle = search_term(input.search.as_deref());
        let items = page
            .items
            .iter()
            .filter(|task| match &needle {
                Some(needle) => contains_ci(task.get("subject").and_then(Value::as_str), needle),
                None => true,
            })
            .map(|task| projection::project(task, projection::TASK_FIELDS))
            .collect();

        Ok(Listing {
            items,
            pagination: page.pagination,
        })
    }

    pub async fn get_task(&self, task_id: i64) -> Result<Record, ActionError> {
        let task = self.session().await?.get(ItemKind::Task, task_id).await?;
        Ok(projection::project(&task, projection::TASK_FIELDS))
    }

    /// Create a task under a story (project taken from the story) or
    /// directly in a project.
    ///
    /// With an `idempotency_key`, a repeat of the same key, story and
    /// subject within the TTL returns the first response without calling
    /// Taiga again.
    pub async fn create_task(&self, input: CreateTaskInput) -> Result<Record, ActionError> {
        let parent = match (input.user_story_id, input.project_id) {
            (Some(story_id), _) => Parent::Story(story_id),
            (None, Some(project_id)) => Parent::Project(project_id),
            (None, None) => return Err(ActionError::validation("Field 'project_id' is required")),
        };
        let due_date = input.due_date.as_deref().map(validate_due_date).transpose()?;

        let cache_key = input
            .idempotency_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .map(|key| idempotency::cache_key(key, input.user_story_id, &input.subject));
        if let Some(key) = &cache_key {
            if let Some(cached) = self.idempotency.get(key).await {
                tracing::info!("Replaying task create from idempotency cache");
                return Ok(cached);
            }
        }

        let api = self.session().await?;
        let project_id = match parent {
            Parent::Story(story_id) => {
                let story = api.get(ItemKind::Story, story_id).await?;
                record_project(&story, ItemKind::Task, "creation")?
            }
            Parent::Project(project_id) => project_id,
        };
        let status = resolve_status(api.as_ref(), ItemKind::Task, project_id, input.status).await?;

        let mut payload = Record::new();
        payload.insert("project".into(), project_id.into());
        if let Some(story_id) = input.user_story_id {
            payload.insert("user_story".into(), story_id.into());
        }
        payload.insert("subject".into(), input.subject.into());
        if let Some(description) = input.description {
            payload.insert("description".into(), description.into());
        }
        if let Some(assigned_to) = input.assigned_to {
            payload.insert("assigned_to".into(), assigned_to.into());
        }
        if let Some(tags) = input.tags {
            payload.insert("tags".into(), tags.into());
        }
        if let Some(due_date) = due_date {
            payload.insert("due_date".into(), due_date.into());
        }
        if let Some(status) = status {
            payload.insert("status".into(), status.into());
        }

        let task = api.create(ItemKind::Task, &payload).await?;
        tracing::info!(task_id = ?int_field(&task, "id"), "Created task");
        let task = projection::project(&task, projection::TASK_FIELDS);

        if let Some(key) = cache_key {
            self.idempotency.store(key, task.clone()).await;
        }
        Ok(task)
    }

    pub async fn update_task(&self, input: UpdateTaskInput) -> Result<Record, ActionError> {
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
        let due_date = match input.due_date {
            Patch::Value(date) => Patch::Value(validate_due_date(&date)?),
            Patch::Null => Patch::Null,
            Patch::Absent => Patch::Absent,
        };
        if !common.has_changes() && !due_date.is_supplied() && !input.user_story_id.is_supplied() {
            return Err(ActionError::validation(
                "At least one field must be provided to update",
            ));
        }

        let api = self.session().await?;
        let existing = api.get(ItemKind::Task, input.task_id).await?;

        let mut payload = Record::new();
        common
            .apply(api.as_ref(), ItemKind::Task, None, &existing, &mut payload)
            .await?;
        if let Some(due_date) = patch_value(due_date, Value::Null) {
            payload.insert("due_date".into(), due_date);
        }
        if let Some(story) = patch_value(input.user_story_id, Value::Null) {
            payload.insert("user_story".into(), story);
        }

        let task = update_versioned(api.as_ref(), ItemKind::Task, input.task_id, &existing, payload).await?;
        Ok(projection::project(&task, projection::TASK_FIELDS))
    }

    pub async fn delete_task(&self, task_id: i64) -> Result<(), ActionError> {
        self.session().await?.delete(ItemKind::Task, task_id).await?;
        tracing::info!(task_id, "Deleted task");
        Ok(())
    }

    pub async fn archive_task(&self, input: ArchiveTaskInput) -> Result<Record, ActionError> {
        let task = self
            .archive_or_close(
                ItemKind::Task,
                input.task_id,
                input.closed_status,
                input.add_archive_tag,
            )
            .await?;
        Ok(projection::project(&task, projection::TASK_FIELDS))
    }
}
