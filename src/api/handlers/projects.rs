use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::json;

use super::{params::QueryParams, ApiResult};
use crate::actions::Actions;
use crate::models::{DiagnosticsInput, GetProjectInput, ItemKind, ListProjectsInput};

pub async fn list_projects(
    State(actions): State<Actions>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult {
    let (search, params): (Vec<_>, Vec<_>) = query.into_iter().partition(|(key, _)| key == "search");
    let input = ListProjectsInput {
        search: search.into_iter().map(|(_, value)| value).next(),
        params,
    };
    let projects = actions.list_projects(input).await?;
    Ok(Json(json!({ "projects": projects })))
}

pub async fn get_project(
    State(actions): State<Actions>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult {
    let project_id = QueryParams(query).required_int("project_id")?;
    let input = GetProjectInput {
        project_id: Some(project_id),
        slug: None,
    };
    let project = actions.get_project(input).await?;
    Ok(Json(json!({ "project": project })))
}

pub async fn get_project_by_slug(
    State(actions): State<Actions>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult {
    let slug = QueryParams(query).required_str("slug")?;
    let input = GetProjectInput {
        project_id: None,
        slug: Some(slug),
    };
    let project = actions.get_project(input).await?;
    Ok(Json(json!({ "project": project })))
}

pub async fn diagnostics(
    State(actions): State<Actions>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult {
    let input = DiagnosticsInput {
        project_slug: QueryParams(query).get(&["slug"]).map(str::to_string),
    };
    let diagnostics = actions.diagnostics(input).await?;
    Ok(Json(json!({ "diagnostics": diagnostics })))
}

/// Statuses for `kind` (default: user stories).
pub async fn list_statuses(
    State(actions): State<Actions>,
    Query(query): Query<Vec<(String, String)>>,
) -> ApiResult {
    let query = QueryParams(query);
    let project_id = query.required_int("project_id")?;
    let kind = match query.get(&["kind"]) {
        Some(raw) => raw.parse::<ItemKind>().map_err(super::ApiError::bad_request)?,
        None => ItemKind::default(),
    };
    let statuses = actions.list_statuses(kind, project_id).await?;
    Ok(Json(json!({ "statuses": statuses })))
}
