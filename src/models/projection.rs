//! Public field whitelists.
//!
//! Taiga records carry internal metadata, rendered HTML, watcher lists and
//! other noise. Everything that leaves this service goes through
//! [`project`] with one of the whitelists below.

use super::Record;

pub const PROJECT_FIELDS: &[&str] = &["id", "name", "slug", "description", "is_private"];

pub const PROJECT_DETAIL_FIELDS: &[&str] = &[
    "id",
    "name",
    "slug",
    "description",
    "is_private",
    "created_date",
    "modified_date",
    "is_epics_activated",
    "is_backlog_activated",
    "is_kanban_activated",
    "is_issues_activated",
    "total_milestones",
    "total_story_points",
];

/// Subset reported by diagnostics when a slug matches.
pub const PROJECT_MATCH_FIELDS: &[&str] = &["id", "name", "slug", "is_private"];

pub const STATUS_FIELDS: &[&str] = &["id", "name", "slug", "is_closed", "order"];

pub const EPIC_SUMMARY_FIELDS: &[&str] =
    &["id", "ref", "subject", "created_date", "modified_date", "status"];

pub const EPIC_LIST_DETAIL_FIELDS: &[&str] = &[
    "id",
    "ref",
    "subject",
    "description",
    "tags",
    "status",
    "created_date",
    "modified_date",
];

pub const EPIC_FIELDS: &[&str] = &[
    "id",
    "ref",
    "subject",
    "project",
    "status",
    "description",
    "assigned_to",
    "tags",
    "color",
    "created_date",
    "modified_date",
    "version",
];

pub const STORY_LIST_FIELDS: &[&str] = &[
    "id",
    "ref",
    "subject",
    "description",
    "project",
    "epic",
    "epics",
    "tags",
    "status",
    "status_extra_info",
    "assigned_to",
    "created_date",
    "modified_date",
];

pub const STORY_DETAIL_FIELDS: &[&str] = &[
    "id",
    "ref",
    "subject",
    "project",
    "epics",
    "tags",
    "status",
    "status_extra_info",
    "assigned_to",
    "assigned_to_extra_info",
    "milestone",
    "description",
    "total_points",
    "created_date",
    "modified_date",
    "version",
];

pub const STORY_FIELDS: &[&str] = &[
    "id",
    "ref",
    "subject",
    "project",
    "status",
    "description",
    "assigned_to",
    "milestone",
    "tags",
    "created_date",
    "modified_date",
    "version",
];

pub const TASK_FIELDS: &[&str] = &[
    "id",
    "ref",
    "subject",
    "project",
    "user_story",
    "status",
    "description",
    "assigned_to",
    "tags",
    "due_date",
    "created_date",
    "modified_date",
    "version",
];

pub const ISSUE_FIELDS: &[&str] = &[
    "id",
    "ref",
    "subject",
    "project",
    "status",
    "priority",
    "severity",
    "issue_type",
    "description",
    "assigned_to",
    "tags",
    "created_date",
    "modified_date",
    "version",
];

pub const LINK_FIELDS: &[&str] = &["epic", "user_story", "order"];

pub const USER_FIELDS: &[&str] = &["id", "full_name", "username", "email"];

pub const MILESTONE_FIELDS: &[&str] = &[
    "id",
    "name",
    "slug",
    "estimated_start",
    "estimated_finish",
    "closed",
    "project",
];

/// Keep only the whitelisted keys that are present in `record`.
pub fn project(record: &Record, fields: &[&str]) -> Record {
    fields
        .iter()
        .filter_map(|&key| record.get(key).map(|value| (key.to_string(), value.clone())))
        .collect()
}

pub fn project_all(records: &[Record], fields: &[&str]) -> Vec<Record> {
    records.iter().map(|record| project(record, fields)).collect()
}
