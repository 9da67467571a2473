pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::actions::Actions;
use crate::config::Config;
use crate::mcp::create_mcp_service;

/// Shared state of the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub actions: Actions,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(actions: Actions, config: Config) -> Self {
        Self {
            actions,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for Actions {
    fn from_ref(state: &AppState) -> Self {
        state.actions.clone()
    }
}

pub fn create_router(state: AppState) -> Router {
    let actions = Router::new()
        // Projects
        .route("/diagnostics", get(handlers::diagnostics))
        .route("/list_projects", get(handlers::list_projects))
        .route("/get_project", get(handlers::get_project))
        .route("/get_project_by_slug", get(handlers::get_project_by_slug))
        .route("/statuses", get(handlers::list_statuses))
        // Epics
        .route("/list_epics", get(handlers::list_epics))
        .route("/get_epic", get(handlers::get_epic))
        .route("/create_epic", post(handlers::create_epic))
        .route("/update_epic", post(handlers::update_epic))
        .route("/delete_epic", post(handlers::delete_epic))
        .route("/add_story_to_epic", post(handlers::add_story_to_epic))
        // User stories
        .route("/list_stories", get(handlers::list_stories))
        .route("/get_story", get(handlers::get_story))
        .route("/create_story", post(handlers::create_story))
        .route("/update_story", post(handlers::update_story))
        .route("/delete_story", post(handlers::delete_story))
        .route("/archive_story", post(handlers::archive_story))
        // Tasks
        .route("/list_tasks", get(handlers::list_tasks))
        .route("/get_task", get(handlers::get_task))
        .route("/create_task", post(handlers::create_task))
        .route("/update_task", post(handlers::update_task))
        .route("/delete_task", post(handlers::delete_task))
        .route("/archive_task", post(handlers::archive_task))
        // Issues
        .route("/list_issues", get(handlers::list_issues))
        .route("/get_issue", get(handlers::get_issue))
        .route("/create_issue", post(handlers::create_issue))
        .route("/update_issue", post(handlers::update_issue))
        .route("/delete_issue", post(handlers::delete_issue))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_api_key));

    let mcp = Router::new()
        .nest_service("/mcp", create_mcp_service(state.actions.clone()))
        .layer(from_fn_with_state(state.clone(), middleware::transport_guard));

    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/openapi.json", get(handlers::openapi))
        .nest("/actions", actions)
        .with_state(state)
        .merge(mcp)
        .layer(TraceLayer::new_for_http())
}
