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
use crate::models::{CreateEpicInput, ItemKind, LinkStoryInput, ListEpicsInput, UpdateEpicInput};

pub async fn list_epics(
    State(actions): State<Actions>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult {
    let query = QueryParams(query);
    let input = ListEpicsInput {
        project_ids: query.ints("project_id")?,
        slug: query.get(&["slug"]).map(str::to_string),
        include_details: query.flag("include_details")?,
        page: query.optional_int("page")?,
        page_size: query.optional_int("page_size")?,
    };
    let epics = actions.list_epics(input).await?;
    Ok(Json(json!({ "epics": epics })))
}

pub async fn get_epic(
    State(actions): State<Actions>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult {
    let epic_id = QueryParams(query).required_int("epic_id")?;
    let epic = actions.get_epic(epic_id).await?;
    Ok(Json(json!({ "epic": epic })))
}

pub async fn create_epic(State(actions): State<Actions>, body: Bytes) -> ApiResult {
    let body = Body::parse(&body)?;
    let input = CreateEpicInput {
        project_id: body.required_int("project_id")?,
        subject: body.required_string("subject")?,
        description: body.optional_string("description"),
        status: body.optional_status("status")?,
        assigned_to: body.optional_int("assigned_to")?,
        tags: body.optional_tags("tags")?,
        color: body.optional_string("color"),
    };
    let epic = actions.create_epic(input).await?;
    Ok(Json(json!({ "epic": epic })))
}

pub async fn update_epic(State(actions): State<Actions>, body: Bytes) -> ApiResult {
    let body = Body::parse(&body)?;
    let input = UpdateEpicInput {
        epic_id: body.required_int("epic_id")?,
        subject: body.patch_string("subject"),
        description: body.patch_string("description"),
        append_description: body.patch_string("append_description"),
        status: body.patch_status("status")?,
        assigned_to: body.patch_int("assigned_to")?,
        tags: body.patch_tags("tags")?,
        add_tags: body.patch_tags("add_tags")?,
        color: body.patch_string("color"),
    };
    let epic = actions.update_epic(input).await?;
    Ok(Json(json!({ "epic": epic })))
}

pub async fn delete_epic(State(actions): State<Actions>, body: Bytes) -> ApiResult {
    let epic_id = Body::parse(&body)?.required_int("epic_id")?;
    actions.delete_epic(epic_id).await?;
    Ok(deleted(ItemKind::Epic, epic_id))
}

pub async fn add_story_to_epic(State(actions): State<Actions>, body: Bytes) -> ApiResult {
    let body = Body::parse(&body)?;
    let input = LinkStoryInput {
        epic_id: body.required_int("epic_id")?,
        user_story_id: body.required_int("user_story_id")?,
    };
    let link = actions.link_story_to_epic(input).await?;
    Ok(Json(json!({ "link": link })))
}
