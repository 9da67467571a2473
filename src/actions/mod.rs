//! Action handlers shared by the MCP tools and the REST facade.
//!
//! Every create/update runs the same pipeline: validate the input, resolve
//! foreign values such as status names, fetch the current record (updates),
//! build a payload holding only the supplied keys, send it with the fetched
//! `version`, and project the result through a field whitelist.

mod diagnostics;
mod epics;
mod issues;
mod people;
mod projects;
pub mod status;
mod stories;
mod tasks;

pub use diagnostics::{redact_username, Diagnostics, DiagnosticsOutcome};

use std::{collections::BTreeSet, sync::Arc};

use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::ActionError;
use crate::idempotency::IdempotencyStore;
use crate::models::{ItemKind, Pagination, Patch, Record, StatusRef};
use crate::taiga::{Connect, TaigaApi, TaigaConnector, TaigaError};

/// Tag added by archive-or-close.
pub const ARCHIVE_TAG: &str = "archived-by-mcp";

/// Entry point for every operation. Cheap to clone.
#[derive(Clone)]
pub struct Actions {
    connector: Arc<dyn Connect>,
    idempotency: IdempotencyStore,
    default_project_id: Option<String>,
    default_project_slug: Option<String>,
    base_url: Option<String>,
    username: Option<String>,
}

impl Actions {
    pub fn new(connector: Arc<dyn Connect>, idempotency: IdempotencyStore, config: &Config) -> Self {
        Self {
            connector,
            idempotency,
            default_project_id: config.default_project_id.clone(),
            default_project_slug: config.default_project_slug.clone(),
            base_url: config.taiga.base_url.clone(),
            username: config.taiga.username.clone(),
        }
    }

    /// Actions backed by the real Taiga client and a fresh idempotency store.
    pub fn from_config(config: &Config) -> Self {
        let connector = Arc::new(TaigaConnector::new(config.taiga.clone()));
        Self::new(connector, IdempotencyStore::new(), config)
    }

    pub fn idempotency(&self) -> &IdempotencyStore {
        &self.idempotency
    }

    /// Open a Taiga session for one action call.
    async fn session(&self) -> Result<Box<dyn TaigaApi>, ActionError> {
        Ok(self.connector.connect().await?)
    }
}

/// A page of items together with Taiga's pagination metadata.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Listing {
    pub items: Vec<Record>,
    pub pagination: Pagination,
}

pub(crate) fn int_field(record: &Record, key: &str) -> Option<i64> {
    match record.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn str_field<'a>(record: &'a Record, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

/// Project id of an existing record, needed for status lookups.
pub(crate) fn record_project(record: &Record, kind: ItemKind, purpose: &str) -> Result<i64, ActionError> {
    int_field(record, "project").ok_or_else(|| {
        ActionError::Upstream(TaigaError::Unexpected(format!(
            "Unable to resolve project for {} {}",
            kind.label(),
            purpose
        )))
    })
}

fn record_version(record: &Record, kind: ItemKind) -> Result<i64, ActionError> {
    int_field(record, "version").ok_or_else(|| {
        ActionError::Upstream(TaigaError::Unexpected(format!(
            "Unable to resolve version for {} update",
            kind.label()
        )))
    })
}

fn record_tags(record: &Record) -> Vec<String> {
    record
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(|tag| match tag {
                    Value::String(s) => Some(s.clone()),
                    // Taiga can report tags as [name, color] pairs.
                    Value::Array(pair) => pair.first().and_then(Value::as_str).map(str::to_string),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Sorted, duplicate-free union of the record's tags and `added`.
pub fn merge_tags(existing: &Record, added: &[String]) -> Vec<String> {
    record_tags(existing)
        .into_iter()
        .chain(added.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Append `text` to the record's description, separated by a blank line.
pub fn append_description(existing: &Record, text: &str) -> String {
    match str_field(existing, "description") {
        Some(current) if !current.is_empty() => format!("{}\n\n{}", current, text).trim().to_string(),
        _ => text.to_string(),
    }
}

pub(crate) fn contains_ci(haystack: Option<&str>, needle_lower: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle_lower))
}

pub(crate) fn search_term(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

/// Slice `items` for a 1-indexed page. Without a page, only the size applies.
pub(crate) fn paginate<T>(items: Vec<T>, page: Option<i64>, page_size: Option<i64>, size: i64) -> Vec<T> {
    let size = size.max(1) as usize;
    match (page, page_size) {
        (Some(page), _) => {
            let start = (page.max(1) as usize - 1).saturating_mul(size);
            items.into_iter().skip(start).take(size).collect()
        }
        (None, Some(_)) => items.into_iter().take(size).collect(),
        (None, None) => items,
    }
}

pub(crate) fn patch_value<T: Into<Value>>(patch: Patch<T>, null: Value) -> Option<Value> {
    match patch {
        Patch::Absent => None,
        Patch::Null => Some(null),
        Patch::Value(v) => Some(v.into()),
    }
}

/// Fields every work-item update shares.
#[derive(Debug, Default)]
pub(crate) struct CommonUpdate {
    pub subject: Patch<String>,
    pub description: Patch<String>,
    pub append_description: Patch<String>,
    pub status: Patch<StatusRef>,
    pub tags: Patch<Vec<String>>,
    pub add_tags: Patch<Vec<String>>,
    pub assigned_to: Patch<i64>,
}

impl CommonUpdate {
    /// Checks that need no upstream data.
    pub fn validate(&self) -> Result<(), ActionError> {
        if self.description.is_supplied() && self.append_description.is_supplied() {
            return Err(ActionError::validation(
                "Cannot set both 'description' and 'append_description'",
            ));
        }
        if self.tags.is_supplied() && self.add_tags.is_supplied() {
            return Err(ActionError::validation("Cannot set both 'tags' and 'add_tags'"));
        }
        if matches!(self.status, Patch::Null) {
            return Err(ActionError::validation("status cannot be null"));
        }
        if matches!(self.subject, Patch::Null) {
            return Err(ActionError::validation("subject cannot be null"));
        }
        Ok(())
    }

    pub fn has_changes(&self) -> bool {
        self.subject.is_supplied()
            || self.description.is_supplied()
            || matches!(self.append_description, Patch::Value(_))
            || self.status.is_supplied()
            || self.tags.is_supplied()
            || matches!(self.add_tags, Patch::Value(_))
            || self.assigned_to.is_supplied()
    }

    /// Write the supplied fields into `payload`, computing appends and tag
    /// merges from `existing` and resolving a status name in `project_id`.
    pub async fn apply(
        self,
        api: &dyn TaigaApi,
        kind: ItemKind,
        project_id: Option<i64>,
        existing: &Record,
        payload: &mut Record,
    ) -> Result<(), ActionError> {
        if let Patch::Value(subject) = self.subject {
            payload.insert("subject".into(), subject.into());
        }

        match (self.description, self.append_description) {
            (Patch::Value(text), _) => {
                payload.insert("description".into(), text.into());
            }
            (Patch::Null, _) => {
                payload.insert("description".into(), "".into());
            }
            (Patch::Absent, Patch::Value(text)) => {
                payload.insert("description".into(), append_description(existing, &text).into());
            }
            (Patch::Absent, _) => {}
        }

        match (self.tags, self.add_tags) {
            (Patch::Value(tags), _) => {
                payload.insert("tags".into(), tags.into());
            }
            (Patch::Null, _) => {
                payload.insert("tags".into(), Value::Array(Vec::new()));
            }
            (Patch::Absent, Patch::Value(added)) => {
                payload.insert("tags".into(), merge_tags(existing, &added).into());
            }
            (Patch::Absent, _) => {}
        }

        if let Some(value) = patch_value(self.assigned_to, Value::Null) {
            payload.insert("assigned_to".into(), value);
        }

        if let Patch::Value(status) = self.status {
            let project_id = match project_id {
                Some(id) => id,
                None => record_project(existing, kind, "status lookup")?,
            };
            let status_id = status::resolve_status_ref(api, kind, project_id, status).await?;
            payload.insert("status".into(), status_id.into());
        }
        Ok(())
    }
}

/// Send `payload` with the version of `existing`. A 409 answer becomes a
/// conflict error naming the version Taiga now holds.
pub(crate) async fn update_versioned(
    api: &dyn TaigaApi,
    kind: ItemKind,
    id: i64,
    existing: &Record,
    mut payload: Record,
) -> Result<Record, ActionError> {
    payload.insert("version".into(), record_version(existing, kind)?.into());

    match api.update(kind, id, &payload).await {
        Ok(updated) => Ok(updated),
        Err(err) if err.is_conflict() => {
            let latest = api.get(kind, id).await?;
            let latest_version = int_field(&latest, "version");
            tracing::warn!(
                kind = kind.label(),
                id,
                ?latest_version,
                "Version conflict on update"
            );
            Err(ActionError::Conflict {
                kind: kind.label(),
                id,
                latest_version,
            })
        }
        Err(err) => Err(err.into()),
    }
}

impl Actions {
    /// Soft delete: move the item to a closed status and, unless told
    /// otherwise, tag it with [`ARCHIVE_TAG`].
    async fn archive_or_close(
        &self,
        kind: ItemKind,
        id: i64,
        closed_status: Option<StatusRef>,
        add_archive_tag: bool,
    ) -> Result<Record, ActionError> {
        let api = self.session().await?;
        let existing = api.get(kind, id).await?;
        let project_id = record_project(&existing, kind, "archive")?;

        let status_id = match closed_status {
            Some(status) => status::resolve_status_ref(api.as_ref(), kind, project_id, status).await?,
            None => status::closed_status(api.as_ref(), kind, project_id).await?,
        };

        let mut payload = Record::new();
        payload.insert("status".into(), status_id.into());
        if add_archive_tag {
            payload.insert(
                "tags".into(),
                merge_tags(&existing, &[ARCHIVE_TAG.to_string()]).into(),
            );
        }

        let updated = update_versioned(api.as_ref(), kind, id, &existing, payload).await?;
        tracing::info!(kind = kind.label(), id, status_id, "Archived item");
        Ok(updated)
    }
}

/// Validate a `YYYY-MM-DD` date and return it normalised.
pub(crate) fn validate_due_date(value: &str) -> Result<String, ActionError> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.format("%Y-%m-%d").to_string())
        .map_err(|_| ActionError::validation("due_date must be in YYYY-MM-DD format"))
}
