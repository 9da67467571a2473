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
use crate::models::{ArchiveTaskInput, CreateTaskInput, ItemKind, ListTasksInput, UpdateTaskInput};

pub async fn list_tasks(
    State(actions): State<Actions>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult {
    let query = QueryParams(query);
    let input = ListTasksInput {
        project_id: query.optional_int("project_id")?,
        user_story_id: query.optional_int_any(&["user_story_id", "story_id"])?,
        assigned_to: query.optional_int("assigned_to")?,
        search: query.get(&["search", "q"]).map(str::to_string),
        status: query.status("status"),
        page: query.optional_int("page")?,
        page_size: query.optional_int("page_size")?,
    };
    let listing = actions.list_tasks(input).await?;
    Ok(Json(json!({ "tasks": listing.items, "pagination": listing.pagination })))
}

pub async fn get_task(
    State(actions): State<Actions>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult {
    let task_id = QueryParams(query).required_int("task_id")?;
    let task = actions.get_task(task_id).await?;
    Ok(Json(json!({ "task": task })))
}

pub async fn create_task(State(actions): State<Actions>, body: Bytes) -> ApiResult {
    let body = Body::parse(&body)?;
    let user_story_id = body.optional_int("user_story_id")?;
    let project_id = match user_story_id {
        Some(_) => body.optional_int("project_id")?,
        None => Some(body.required_int("project_id")?),
    };
    let input = CreateTaskInput {
        project_id,
        user_story_id,
        subject: body.required_string("subject")?,
        description: body.optional_string("description"),
        assigned_to: body.optional_int("assigned_to")?,
        status: body.optional_status("status")?,
        tags: body.optional_tags("tags")?,
        due_date: body.optional_string("due_date"),
        idempotency_key: body.optional_string("idempotency_key"),
    };
    let task = actions.create_task(input).await?;
    Ok(Json(json!({ "task": task })))
}

pub async fn update_task(State(actions): State<Actions>, body: Bytes) -> ApiResult {
    let body = Body::parse(&body)?;
    let input = UpdateTaskInput {
        task_id: body.required_int("task_id")?,
        subject: body.patch_string("subject"),
        description: body.patch_string("description"),
        append_description: body.patch_string("append_description"),
        assigned_to: body.patch_int("assigned_to")?,
        status: body.patch_status("status")?,
        tags: body.patch_tags("tags")?,
        add_tags: body.patch_tags("add_tags")?,
        due_date: body.patch_string("due_date"),
        user_story_id: body.patch_int("user_story_id")?,
    };
    let task = actions.update_task(input).await?;
    Ok(Json(json!({ "task": task })))
}

pub async fn delete_task(State(actions): State<Actions>, body: Bytes) -> ApiResult {
    let task_id = Body::parse(&body)?.required_int("task_id")?;
    actions.delete_task(task_id).await?;
    Ok(deleted(ItemKind::Task, task_id))
}

pub async fn archive_task(State(actions): State<Actions>, body: Bytes) -> ApiResult {
    let body = Body::parse(&body)?;
    let input = ArchiveTaskInput {
        task_id: body.required_int("task_id")?,
        closed_status: body.optional_status("closed_status")?,
        add_archive_tag: body.flag("add_archive_tag", true)?,
    };
    let task = actions.archive_task(input).await?;
    Ok(Json(json!({ "task": task })))
}
