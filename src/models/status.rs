use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ItemKind;

/// A status given either as its numeric id or as its name/slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum StatusRef {
    Id(i64),
    Name(String),
}

impl fmt::Display for StatusRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<i64> for StatusRef {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for StatusRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Input for listing the statuses of one item kind in a project.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListStatusesInput {
    #[schemars(description = "Taiga project id")]
    pub project_id: i64,
    #[schemars(description = "Which status set to list: 'story' (default), 'task', 'issue' or 'epic'")]
    #[serde(default)]
    pub kind: ItemKind,
}
