use serde::Serialize;
use serde_json::Value;

use super::Actions;
use crate::error::ActionError;
use crate::models::{projection, DiagnosticsInput, Record};

const SLUG_SAMPLE: usize = 10;

/// Non-sensitive runtime information for debugging a deployment.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub taiga_base_url: Option<String>,
    pub taiga_username: Option<String>,
    #[serde(flatten)]
    pub outcome: DiagnosticsOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DiagnosticsOutcome {
    Connected {
        user_id: i64,
        projects_count: usize,
        project_slugs_sample: Vec<String>,
        matched_project: Option<Record>,
    },
    /// Taiga refused or misbehaved; the message is reported, not raised.
    Failed { error: String },
}

/// Mask the local part of an email-like username, keeping the domain.
pub fn redact_username(value: Option<&str>) -> Option<String> {
    let value = value.filter(|v| !v.is_empty())?;
    let Some((local, domain)) = value.split_once('@') else {
        return Some("***".to_string());
    };
    let masked = if local.chars().count() <= 2 {
        "*".repeat(local.chars().count())
    } else {
        format!("{}***", local.chars().take(2).collect::<String>())
    };
    Some(format!("{}@{}", masked, domain))
}

impl Actions {
    pub async fn diagnostics(&self, input: DiagnosticsInput) -> Result<Diagnostics, ActionError> {
        let outcome = match self.probe(input.project_slug.as_deref()).await {
            Ok(outcome) => outcome,
            Err(ActionError::Upstream(err)) => {
                tracing::warn!("Diagnostics could not reach Taiga: {}", err);
                DiagnosticsOutcome::Failed {
                    error: err.to_string(),
                }
            }
            Err(other) => return Err(other),
        };

        Ok(Diagnostics {
            taiga_base_url: self.base_url.clone(),
            taiga_username: redact_username(self.username.as_deref()),
            outcome,
        })
    }

    async fn probe(&self, slug: Option<&str>) -> Result<DiagnosticsOutcome, ActionError> {
        let api = self.session().await?;
        let user_id = api.current_user_id().await?;
        let projects = api
            .list_projects(&[("member".to_string(), user_id.to_string())])
            .await?;

        let project_slugs_sample = projects
            .iter()
            .filter_map(|p| p.get("slug").and_then(Value::as_str))
            .filter(|s| !s.is_empty())
            .take(SLUG_SAMPLE)
            .map(str::to_string)
            .collect();

        let matched_project = slug.and_then(|slug| {
            projects
                .iter()
                .find(|p| p.get("slug").and_then(Value::as_str) == Some(slug))
                .map(|p| projection::project(p, projection::PROJECT_MATCH_FIELDS))
        });

        Ok(DiagnosticsOutcome::Connected {
            user_id,
            projects_count: projects.len(),
            project_slugs_sample,
            matched_project,
        })
    }
}
