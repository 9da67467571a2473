use serde_json::Value;

use super::{int_field, patch_value, status::resolve_status, update_versioned, Actions, CommonUpdate};
use crate::error::ActionError;
use crate::models::{
    effective_page_size, projection, ArchiveStoryInput, CreateStoryInput, ItemKind,
    ListStoriesInput, Record, UpdateStoryInput,
};

const STORY_PAGE_SIZE: i64 = 50;
const STORY_PAGE_CEILING: i64 = 100;

impl Actions {
    pub async fn list_stories(&self, input: ListStoriesInput) -> Result<Vec<Record>, ActionError> {
        let mut params = vec![("project".to_string(), input.project_id.to_string())];
        if let Some(epic) = input.epic_id {
            params.push(("epic".into(), epic.to_string()));
        }
        if let Some(q) = input.search.filter(|q| !q.is_empty()) {
            params.push(("q".into(), q));
        }
        params.extend(input.tags.into_iter().map(|tag| ("tags".to_string(), tag)));
        if let Some(page) = input.page {
            params.push(("page".into(), page.to_string()));
        }
        let page_size = effective_page_size(input.page_size, STORY_PAGE_SIZE, STORY_PAGE_CEILING);
        params.push(("page_size".into(), page_size.to_string()));

        let page = self.session().await?.list(ItemKind::Story, &params).await?;
        Ok(projection::project_all(&page.items, projection::STORY_LIST_FIELDS))
    }

    pub async fn get_story(&self, story_id: i64) -> Result<Record, ActionError> {
        let story = self.session().await?.get(ItemKind::Story, story_id).await?;
        Ok(projection::project(&story, projection::STORY_DETAIL_FIELDS))
    }

    pub async fn create_story(&self, input: CreateStoryInput) -> Result<Record, ActionError> {
        let api = self.session().await?;
        let status = resolve_status(api.as_ref(), ItemKind::Story, input.project_id, input.status).await?;

        let mut payload = Record::new();
        payload.insert("project".into(), input.project_id.into());
        payload.insert("subject".into(), input.subject.into());
        if let Some(description) = input.description.filter(|d| !d.is_empty()) {
            payload.insert("description".into(), description.into());
        }
        if let Some(status) = status {
            payload.insert("status".into(), status.into());
        }
        if let Some(tags) = input.tags.filter(|t| !t.is_empty()) {
            payload.insert("tags".into(), tags.into());
        }
        if let Some(assigned_to) = input.assigned_to {
            payload.insert("assigned_to".into(), assigned_to.into());
        }

        let story = api.create(ItemKind::Story, &payload).await?;
        tracing::info!(story_id = ?int_field(&story, "id"), "Created user story");
        Ok(projection::project(&story, projection::STORY_FIELDS))
    }

    /// Partial update of a user story. A given `project_id` is sent as
    /// `project` and is where `status` names are resolved; otherwise names
    /// resolve in the story's own project.
    pub async fn update_story(&self, input: UpdateStoryInput) -> Result<Record, ActionError> {
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
        let extra_changes = input.project_id.is_some()
            || input.epic_id.is_supplied()
            || input.milestone_id.is_supplied()
            || input.custom_attributes.is_supplied();
        if !common.has_changes() && !extra_changes {
            return Err(ActionError::validation(
                "At least one field must be provided to update",
            ));
        }

        let api = self.session().await?;
        let existing = api.get(ItemKind::Story, input.user_story_id).await?;

        let mut payload = Record::new();
        common
            .apply(api.as_ref(), ItemKind::Story, input.project_id, &existing, &mut payload)
            .await?;
        if let Some(project_id) = input.project_id {
            payload.insert("project".into(), project_id.into());
        }
        if let Some(epic) = patch_value(input.epic_id, Value::Null) {
            payload.insert("epic".into(), epic);
        }
        if let Some(milestone) = patch_value(input.milestone_id, Value::Null) {
            payload.insert("milestone".into(), milestone);
        }
        if let Some(attributes) = patch_value(input.custom_attributes, Value::Null) {
            payload.insert("custom_attributes".into(), attributes);
        }

        let story = update_versioned(
            api.as_ref(),
            ItemKind::Story,
            input.user_story_id,
            &existing,
            payload,
        )
        .await?;
        Ok(projection::project(&story, projection::STORY_FIELDS))
    }

    pub async fn delete_story(&self, story_id: i64) -> Result<(), ActionError> {
        self.session().await?.delete(ItemKind::Story, story_id).await?;
        tracing::info!(story_id, "Deleted user story");
        Ok(())
    }

    pub async fn archive_story(&self, input: ArchiveStoryInput) -> Result<Record, ActionError> {
        let story = self
            .archive_or_close(
                ItemKind::Story,
                input.user_story_id,
                input.closed_status,
                input.add_archive_tag,
            )
            .await?;
        Ok(projection::project(&story, projection::STORY_FIELDS))
    }
}
