use serde_json::Value;

use super::{
    int_field, paginate, patch_value, status::resolve_status, update_versioned, Actions,
    CommonUpdate,
};
use crate::error::ActionError;
use crate::models::{
    effective_page_size, projection, CreateEpicInput, ItemKind, LinkStoryInput, ListEpicsInput,
    Record, UpdateEpicInput,
};
use crate::taiga::TaigaApi;

const EPIC_PAGE_SIZE: i64 = 50;

impl Actions {
    /// Epics of one or more projects, each tagged with its `project_id`.
    pub async fn list_epics(&self, input: ListEpicsInput) -> Result<Vec<Record>, ActionError> {
        let api = self.session().await?;
        let project_ids = if input.project_ids.is_empty() {
            vec![self.default_epic_project(api.as_ref(), input.slug.as_deref()).await?]
        } else {
            input.project_ids
        };

        let fields = if input.include_details {
            projection::EPIC_LIST_DETAIL_FIELDS
        } else {
            projection::EPIC_SUMMARY_FIELDS
        };

        let mut epics = Vec::new();
        for project_id in project_ids {
            let page = api
                .list(ItemKind::Epic, &[("project".to_string(), project_id.to_string())])
                .await?;
            epics.extend(page.items.iter().map(|epic| {
                let mut data = projection::project(epic, fields);
                data.insert("project_id".into(), project_id.into());
                data
            }));
        }

        let size = effective_page_size(input.page_size, EPIC_PAGE_SIZE, EPIC_PAGE_SIZE);
        Ok(paginate(epics, input.page, input.page_size, size))
    }

    /// Configured TAIGA_PROJECT_ID, else the given or configured slug.
    async fn default_epic_project(
        &self,
        api: &dyn TaigaApi,
        slug: Option<&str>,
    ) -> Result<i64, ActionError> {
        if let Some(raw) = &self.default_project_id {
            return raw
                .parse()
                .map_err(|_| ActionError::Internal("TAIGA_PROJECT_ID must be an integer".into()));
        }

        let slug = slug
            .filter(|s| !s.is_empty())
            .or(self.default_project_slug.as_deref())
            .ok_or_else(|| {
                ActionError::validation(
                    "project_id is required (or configure TAIGA_PROJECT_ID / TAIGA_PROJECT_SLUG)",
                )
            })?;

        let project = api.get_project_by_slug(slug).await?;
        int_field(&project, "id")
            .ok_or_else(|| ActionError::Internal("Unable to resolve project_id from slug".into()))
    }

    pub async fn get_epic(&self, epic_id: i64) -> Result<Record, ActionError> {
        let epic = self.session().await?.get(ItemKind::Epic, epic_id).await?;
        Ok(projection::project(&epic, projection::EPIC_FIELDS))
    }

    pub async fn create_epic(&self, input: CreateEpicInput) -> Result<Record, ActionError> {
        let api = self.session().await?;
        let status = resolve_status(api.as_ref(), ItemKind::Epic, input.project_id, input.status).await?;

        let mut payload = Record::new();
        payload.insert("project".into(), input.project_id.into());
        payload.insert("subject".into(), input.subject.into());
        if let Some(description) = input.description {
            payload.insert("description".into(), description.into());
        }
        if let Some(status) = status {
            payload.insert("status".into(), status.into());
        }
        if let Some(assigned_to) = input.assigned_to {
            payload.insert("assigned_to".into(), assigned_to.into());
        }
        if let Some(tags) = input.tags {
            payload.insert("tags".into(), tags.into());
        }
        if let Some(color) = input.color {
            payload.insert("color".into(), color.into());
        }

        let epic = api.create(ItemKind::Epic, &payload).await?;
        tracing::info!(epic_id = ?int_field(&epic, "id"), "Created epic");
        Ok(projection::project(&epic, projection::EPIC_FIELDS))
    }

    pub async fn update_epic(&self, input: UpdateEpicInput) -> Result<Record, ActionError> {
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
        if !common.has_changes() && !input.color.is_supplied() {
            return Err(ActionError::validation(
                "At least one field must be provided to update",
            ));
        }

        let api = self.session().await?;
        let existing = api.get(ItemKind::Epic, input.epic_id).await?;

        let mut payload = Record::new();
        common
            .apply(api.as_ref(), ItemKind::Epic, None, &existing, &mut payload)
            .await?;
        if let Some(color) = patch_value(input.color, Value::Null) {
            payload.insert("color".into(), color);
        }

        let epic = update_versioned(api.as_ref(), ItemKind::Epic, input.epic_id, &existing, payload).await?;
        Ok(projection::project(&epic, projection::EPIC_FIELDS))
    }

    pub async fn delete_epic(&self, epic_id: i64) -> Result<(), ActionError> {
        self.session().await?.delete(ItemKind::Epic, epic_id).await?;
        tracing::info!(epic_id, "Deleted epic");
        Ok(())
    }

    /// Attach a user story to an epic. Taiga may answer with no body.
    pub async fn link_story_to_epic(&self, input: LinkStoryInput) -> Result<Option<Record>, ActionError> {
        let link = self
            .session()
            .await?
            .link_epic_user_story(input.epic_id, input.user_story_id)
            .await?;
        tracing::info!(
            epic_id = input.epic_id,
            user_story_id = input.user_story_id,
            "Linked story to epic"
        );
        Ok(link.map(|link| projection::project(&link, projection::LINK_FIELDS)))
    }
}
