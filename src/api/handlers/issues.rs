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
use crate::models::{CreateIssueInput, ItemKind, ListIssuesInput, UpdateIssueInput};

pub async fn list_issues(
    State(actions): State<Actions>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult {
    let query = QueryParams(query);
    let input = ListIssuesInput {
        project_id: query.optional_int("project_id")?,
        assigned_to: query.optional_int("assigned_to")?,
        search: query.get(&["search", "q"]).map(str::to_string),
        status: query.status("status"),
        priority: query.optional_int("priority")?,
        severity: query.optional_int("severity")?,
        issue_type: query.optional_int_any(&["type", "issue_type"])?,
        page: query.optional_int("page")?,
        page_size: query.optional_int("page_size")?,
    };
    let listing = actions.list_issues(input).await?;
    Ok(Json(json!({ "issues": listing.items, "pagination": listing.pagination })))
}

pub async fn get_issue(
    State(actions): State<Actions>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult {
    let issue_id = QueryParams(query).required_int("issue_id")?;
    let issue = actions.get_issue(issue_id).await?;
    Ok(Json(json!({ "issue": issue })))
}

pub async fn create_issue(State(actions): State<Actions>, body: Bytes) -> ApiResult {
    let body = Body::parse(&body)?;
    let input = CreateIssueInput {
        project_id: body.required_int("project_id")?,
        subject: body.required_string("subject")?,
        description: body.optional_string("description"),
        status: body.optional_status("status")?,
        priority: body.optional_int("priority")?,
        severity: body.optional_int("severity")?,
        issue_type: body.patch_int_any(&["type", "issue_type"])?.value(),
        assigned_to: body.optional_int("assigned_to")?,
        tags: body.optional_tags("tags")?,
    };
    let issue = actions.create_issue(input).await?;
    Ok(Json(json!({ "issue": issue })))
}

pub async fn update_issue(State(actions): State<Actions>, body: Bytes) -> ApiResult {
    let body = Body::parse(&body)?;
    let input = UpdateIssueInput {
        issue_id: body.required_int("issue_id")?,
        subject: body.patch_string("subject"),
        description: body.patch_string("description"),
        append_description: body.patch_string("append_description"),
        status: body.patch_status("status")?,
        priority: body.patch_int("priority")?,
        severity: body.patch_int("severity")?,
        issue_type: body.patch_int_any(&["type", "issue_type"])?,
        assigned_to: body.patch_int("assigned_to")?,
        tags: body.patch_tags("tags")?,
        add_tags: body.patch_tags("add_tags")?,
    };
    let issue = actions.update_issue(input).await?;
    Ok(Json(json!({ "issue": issue })))
}

pub async fn delete_issue(State(actions): State<Actions>, body: Bytes) -> ApiResult {
    let issue_id = Body::parse(&body)?.required_int("issue_id")?;
    actions.delete_issue(issue_id).await?;
    Ok(deleted(ItemKind::Issue, issue_id))
}
