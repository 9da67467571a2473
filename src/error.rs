//! Errors raised by action handlers.
//!
//! Both surfaces render the same [`ActionError`]: the REST facade as an
//! HTTP status with `{"error": ...}`, the MCP server as a typed JSON-RPC
//! error.

use serde_json::json;
use thiserror::Error;

use crate::taiga::TaigaError;

#[derive(Debug, Error)]
pub enum ActionError {
    /// Caller input is missing, malformed or contradictory. Raised before
    /// any upstream write.
    #[error("{0}")]
    Validation(String),

    /// Taiga rejected a versioned update with 409.
    #[error("Conflict updating {kind} {id}: latest version is {}", display_version(.latest_version))]
    Conflict {
        kind: &'static str,
        id: i64,
        latest_version: Option<i64>,
    },

    #[error(transparent)]
    Upstream(TaigaError),

    /// Anything the caller should not see details of.
    #[error("{0}")]
    Internal(String),
}

fn display_version(version: &Option<i64>) -> String {
    version.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}

impl ActionError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Short machine-readable category, used in MCP error data.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Conflict { .. } => "conflict",
            Self::Upstream(_) => "upstream",
            Self::Internal(_) => "internal",
        }
    }

    /// Message that is safe to hand back to a caller.
    pub fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<TaigaError> for ActionError {
    fn from(err: TaigaError) -> Self {
        match err {
            TaigaError::Http(e) => Self::Internal(format!("HTTP request to Taiga failed: {}", e)),
            other => Self::Upstream(other),
        }
    }
}

impl From<ActionError> for rmcp::ErrorData {
    fn from(err: ActionError) -> Self {
        match &err {
            ActionError::Validation(_) | ActionError::Conflict { .. } => {
                tracing::warn!("Rejected tool call: {}", err);
                rmcp::ErrorData::invalid_params(err.to_string(), Some(json!({ "kind": err.kind() })))
            }
            ActionError::Upstream(upstream) => rmcp::ErrorData::new(
                rmcp::model::ErrorCode::INVALID_REQUEST,
                err.to_string(),
                Some(json!({ "kind": err.kind(), "status": upstream.status() })),
            ),
            ActionError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                rmcp::ErrorData::internal_error(err.public_message(), None)
            }
        }
    }
}
