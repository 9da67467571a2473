use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use serde_json::json;

use super::{
    deleted,
    params::{Body, QueryParams},
    ApiResult,
};
use crate::actions::Actions;
use crate::models::{ArchiveStoryInput, CreateStoryInput, ItemKind, ListStoriesInput, UpdateStoryInput};

/// Accepts `epic_id`/`epic`, `search`/`q` and repeated `tag` or `tags`.
pub async fn list_stories(
    State(actions): State<Actions>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult {
    let query = QueryParams(query);
    let mut tags = query.all("tag");
    if tags.is_empty() {
        tags = query.all("tags");
    }
    let input = ListStoriesInput {
        project_id: query.required_int("project_id")?,
        epic_id: query.optional_int_any(&["epic_id", "epic"])?,
        search: query.get(&["search", "q"]).map(str::to_string),
        tags,
        page: query.optional_int("page")?,
        page_size: query.optional_int("page_size")?,
    };
    let stories = actions.list_stories(input).await?;
    Ok(Json(json!({ "stories": stories })))
}

pub async fn get_story(
    State(actions): State<Actions>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult {
    let story_id = QueryParams(query).required_int("story_id")?;
    let story = actions.get_story(story_id).await?;
    Ok(Json(json!({ "story": story })))
}

pub async fn create_story(State(actions): State<Actions>, body: Bytes) -> ApiResult {
    let body = Body::parse(&body)?;
    let input = CreateStoryInput {
        project_id: body.required_int("project_id")?,
        subject: body.required_string("subject")?,
        description: body.optional_string("description"),
        status: body.optional_status("status")?,
        tags: body.optional_tags("tags")?,
        assigned_to: body.optional_int("assigned_to")?,
    };
    let story = actions.create_story(input).await?;
    Ok(Json(json!({ "story": story })))
}

pub async fn update_story(State(actions): State<Actions>, body: Bytes) -> ApiResult {
    let body = Body::parse(&body)?;
    let input = UpdateStoryInput {
        user_story_id: body.required_int_any(&["story_id", "user_story_id"])?,
        project_id: body.optional_int("project_id")?,
        subject: body.patch_string("subject"),
        description: body.patch_string("description"),
        append_description: body.patch_string("append_description"),
        status: body.patch_status("status")?,
        tags: body.patch_tags("tags")?,
        add_tags: body.patch_tags("add_tags")?,
        assigned_to: body.patch_int("assigned_to")?,
        epic_id: body.patch_int("epic_id")?,
        milestone_id: body.patch_int("milestone_id")?,
        custom_attributes: body.patch_value("custom_attributes"),
    };
    let story = actions.update_story(input).await?;
    Ok(Json(json!({ "story": story })))
}

pub async fn delete_story(State(actions): State<Actions>, body: Bytes) -> ApiResult {
    let story_id = Body::parse(&body)?.required_int_any(&["story_id", "user_story_id"])?;
    actions.delete_story(story_id).await?;
    Ok(deleted(ItemKind::Story, story_id))
}

pub async fn archive_story(State(actions): State<Actions>, body: Bytes) -> ApiResult {
    let body = Body::parse(&body)?;
    let input = ArchiveStoryInput {
        user_story_id: body.required_int_any(&["story_id", "user_story_id"])?,
        closed_status: body.optional_status("closed_status")?,
        add_archive_tag: body.flag("add_archive_tag", true)?,
    };
    let story = actions.archive_story(input).await?;
    Ok(Json(json!({ "story": story })))
}
