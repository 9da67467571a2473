mod epics;
mod issues;
mod openapi;
pub mod params;
mod projects;
mod stories;
mod tasks;

pub use epics::*;
pub use issues::*;
pub use openapi::*;
pub use projects::*;
pub use stories::*;
pub use tasks::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::error::ActionError;
use crate::models::ItemKind;

// ============================================================
// Error Handling
// ============================================================

/// Error answered by the action facade as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Validation, conflict and upstream failures are the caller's to see and
/// answer 400; internal failures are logged and answered generically.
impl From<ActionError> for ApiError {
    fn from(err: ActionError) -> Self {
        let status = match &err {
            ActionError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => {
                tracing::warn!("Action rejected: {}", err);
                StatusCode::BAD_REQUEST
            }
        };
        Self::new(status, err.public_message())
    }
}

pub type ApiResult = Result<Json<Value>, ApiError>;

/// `{"deleted": {"<kind>_id": id}}`
fn deleted(kind: ItemKind, id: i64) -> Json<Value> {
    Json(json!({ "deleted": { kind.id_field(): id } }))
}

// ============================================================
// Health
// ============================================================

pub async fn root() -> &'static str {
    "Taiga MCP up"
}

pub async fn healthz() -> &'static str {
    "ok"
}
