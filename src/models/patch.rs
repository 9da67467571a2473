use std::borrow::Cow;

use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Deserializer};

/// An optional argument of a partial update.
///
/// JSON cannot tell "key missing" from `null` once it lands in an `Option`,
/// so update inputs use `Patch` instead. Fields of this type must carry
/// `#[serde(default)]`: a missing key stays [`Patch::Absent`], an explicit
/// `null` becomes [`Patch::Null`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// The caller did not mention the field. Leave it unchanged.
    Absent,
    /// The caller sent `null`.
    Null,
    /// The caller sent a value.
    Value(T),
}

impl<T> Patch<T> {
    /// True unless the field was left out entirely.
    pub fn is_supplied(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// Collapse `Absent` and `Null` into `None`.
    pub fn value(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Absent | Self::Null => None,
        }
    }
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Value(value),
            None => Self::Null,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Into::into)
    }
}

impl<T: JsonSchema> JsonSchema for Patch<T> {
    fn inline_schema() -> bool {
        true
    }

    fn schema_name() -> Cow<'static, str> {
        <Option<T>>::schema_name()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        <Option<T>>::json_schema(generator)
    }
}
