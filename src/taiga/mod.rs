//! Upstream Taiga API.
//!
//! [`TaigaApi`] is the set of calls the action layer needs. [`Connect`]
//! hands out one authenticated session per action call; the session is
//! dropped (and its connection pool with it) when the action returns.

mod client;

pub use client::{TaigaClient, TaigaConnector, TaigaSettings};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ItemKind, Pagination, Record};

/// Errors raised while talking to Taiga.
#[derive(Debug, Error)]
pub enum TaigaError {
    #[error("Environment variable {0} must be configured")]
    MissingConfig(&'static str),

    #[error("Taiga authentication failed with status {status}: {body}")]
    Auth { status: u16, body: String },

    #[error("Taiga API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("{0}")]
    Unexpected(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Taiga returned invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl TaigaError {
    /// HTTP status Taiga answered with, if the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<Record>,
    pub pagination: Pagination,
}

/// An authenticated Taiga session.
#[async_trait]
pub trait TaigaApi: Send + Sync {
    /// Exchange credentials for a bearer token. No-op once it succeeded.
    async fn authenticate(&self) -> Result<(), TaigaError>;

    /// Id of the service account, resolved once per session.
    async fn current_user_id(&self) -> Result<i64, TaigaError>;

    async fn list_projects(&self, params: &[(String, String)]) -> Result<Vec<Record>, TaigaError>;
    async fn get_project(&self, project_id: i64) -> Result<Record, TaigaError>;
    async fn get_project_by_slug(&self, slug: &str) -> Result<Record, TaigaError>;

    async fn list(&self, kind: ItemKind, params: &[(String, String)]) -> Result<Page, TaigaError>;
    async fn get(&self, kind: ItemKind, id: i64) -> Result<Record, TaigaError>;
    async fn create(&self, kind: ItemKind, payload: &Record) -> Result<Record, TaigaError>;
    async fn update(&self, kind: ItemKind, id: i64, payload: &Record) -> Result<Record, TaigaError>;
    async fn delete(&self, kind: ItemKind, id: i64) -> Result<(), TaigaError>;

    async fn list_statuses(&self, kind: ItemKind, project_id: i64) -> Result<Vec<Record>, TaigaError>;

    async fn link_epic_user_story(
        &self,
        epic_id: i64,
        user_story_id: i64,
    ) -> Result<Option<Record>, TaigaError>;

    async fn list_users(&self, project_id: Option<i64>) -> Result<Vec<Record>, TaigaError>;
    async fn list_memberships(&self, project_id: i64) -> Result<Vec<Record>, TaigaError>;
    async fn list_milestones(&self, project_id: i64) -> Result<Vec<Record>, TaigaError>;
}

/// Opens authenticated sessions.
#[async_trait]
pub trait Connect: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn TaigaApi>, TaigaError>;
}
