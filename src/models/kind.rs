use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The work-item kinds Taiga exposes. Each kind has its own endpoint and
/// its own per-project status set.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Epic,
    #[default]
    #[serde(alias = "user_story", alias = "userstory")]
    Story,
    Task,
    Issue,
}

impl ItemKind {
    /// Collection path relative to the API root.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Epic => "epics",
            Self::Story => "userstories",
            Self::Task => "tasks",
            Self::Issue => "issues",
        }
    }

    /// Path of the per-project status listing for this kind.
    pub fn statuses_path(&self) -> &'static str {
        match self {
            Self::Epic => "epic-statuses",
            Self::Story => "userstory-statuses",
            Self::Task => "task-statuses",
            Self::Issue => "issue-statuses",
        }
    }

    /// Human readable name used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Epic => "epic",
            Self::Story => "user story",
            Self::Task => "task",
            Self::Issue => "issue",
        }
    }

    /// Name of the id field in REST payloads (`story_id`, `task_id`, ...).
    pub fn id_field(&self) -> &'static str {
        match self {
            Self::Epic => "epic_id",
            Self::Story => "story_id",
            Self::Task => "task_id",
            Self::Issue => "issue_id",
        }
    }
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "epic" => Ok(Self::Epic),
            "story" | "user_story" | "userstory" => Ok(Self::Story),
            "task" => Ok(Self::Task),
            "issue" => Ok(Self::Issue),
            other => Err(format!(
                "Unknown kind '{}'. Must be: story, task, issue or epic",
                other
            )),
        }
    }
}
