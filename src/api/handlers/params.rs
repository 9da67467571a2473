//! Lenient request parsing for the action facade.
//!
//! Action callers send loosely typed JSON (ids as strings, tags as lists of
//! anything), so bodies are read as raw objects and coerced field by field
//! with caller-facing messages.

use serde_json::Value;

use super::ApiError;
use crate::models::{Patch, Record, StatusRef};

/// A JSON object request body.
#[derive(Debug, Default)]
pub struct Body(Record);

impl Body {
    pub fn parse(bytes: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|_| ApiError::bad_request("Request body must be valid JSON"))?;
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ApiError::bad_request("Request body must be a JSON object")),
        }
    }

    fn present(&self, field: &str) -> Result<&Value, ApiError> {
        self.0
            .get(field)
            .ok_or_else(|| ApiError::bad_request(format!("Field '{}' is required", field)))
    }

    /// Value of the first of `fields` that is present.
    fn first_of<'a>(&'a self, fields: &[&'a str]) -> Option<(&'a str, &'a Value)> {
        fields
            .iter()
            .find_map(|field| self.0.get(*field).map(|value| (*field, value)))
    }

    pub fn required_int(&self, field: &str) -> Result<i64, ApiError> {
        to_int(self.present(field)?, field)
    }

    /// Required integer that may arrive under an alias (first name is canonical).
    pub fn required_int_any(&self, fields: &[&str]) -> Result<i64, ApiError> {
        match self.first_of(fields) {
            Some((field, value)) => to_int(value, field),
            None => Err(ApiError::bad_request(format!(
                "Field '{}' is required",
                fields.first().copied().unwrap_or_default()
            ))),
        }
    }

    pub fn optional_int(&self, field: &str) -> Result<Option<i64>, ApiError> {
        match self.0.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => to_int(value, field).map(Some),
        }
    }

    pub fn patch_int(&self, field: &str) -> Result<Patch<i64>, ApiError> {
        self.patch_int_any(&[field])
    }

    pub fn patch_int_any(&self, fields: &[&str]) -> Result<Patch<i64>, ApiError> {
        match self.first_of(fields) {
            None => Ok(Patch::Absent),
            Some((_, Value::Null)) => Ok(Patch::Null),
            Some((field, value)) => to_int(value, field).map(Patch::Value),
        }
    }

    pub fn required_string(&self, field: &str) -> Result<String, ApiError> {
        Ok(to_string(self.present(field)?))
    }

    pub fn optional_string(&self, field: &str) -> Option<String> {
        match self.0.get(field) {
            None | Some(Value::Null) => None,
            Some(value) => Some(to_string(value)),
        }
    }

    pub fn patch_string(&self, field: &str) -> Patch<String> {
        match self.0.get(field) {
            None => Patch::Absent,
            Some(Value::Null) => Patch::Null,
            Some(value) => Patch::Value(to_string(value)),
        }
    }

    pub fn optional_tags(&self, field: &str) -> Result<Option<Vec<String>>, ApiError> {
        Ok(self.patch_tags(field)?.value())
    }

    pub fn patch_tags(&self, field: &str) -> Result<Patch<Vec<String>>, ApiError> {
        match self.0.get(field) {
            None => Ok(Patch::Absent),
            Some(Value::Null) => Ok(Patch::Null),
            Some(Value::Array(items)) => Ok(Patch::Value(items.iter().map(to_string).collect())),
            Some(_) => Err(ApiError::bad_request(format!("{} must be a list", field))),
        }
    }

    pub fn optional_status(&self, field: &str) -> Result<Option<StatusRef>, ApiError> {
        Ok(self.patch_status(field)?.value())
    }

    pub fn patch_status(&self, field: &str) -> Result<Patch<StatusRef>, ApiError> {
        match self.0.get(field) {
            None => Ok(Patch::Absent),
            Some(Value::Null) => Ok(Patch::Null),
            Some(Value::String(name)) => Ok(Patch::Value(StatusRef::Name(name.clone()))),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(|id| Patch::Value(StatusRef::Id(id)))
                .ok_or_else(|| status_type_error(field)),
            Some(_) => Err(status_type_error(field)),
        }
    }

    pub fn flag(&self, field: &str, default: bool) -> Result<bool, ApiError> {
        match self.0.get(field) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) => parse_flag(s)
                .ok_or_else(|| ApiError::bad_request(format!("{} must be a boolean", field))),
            Some(_) => Err(ApiError::bad_request(format!("{} must be a boolean", field))),
        }
    }

    pub fn patch_value(&self, field: &str) -> Patch<Value> {
        match self.0.get(field) {
            None => Patch::Absent,
            Some(Value::Null) => Patch::Null,
            Some(value) => Patch::Value(value.clone()),
        }
    }
}

fn status_type_error(field: &str) -> ApiError {
    ApiError::bad_request(format!("{} must be an integer or string", field))
}

fn to_int(value: &Value, field: &str) -> Result<i64, ApiError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ApiError::bad_request(format!("{} must be an integer", field)))
}

fn to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Query string as ordered key/value pairs, keeping repeated keys.
#[derive(Debug, Default)]
pub struct QueryParams(pub Vec<(String, String)>);

impl QueryParams {
    /// First non-empty value among `names`.
    pub fn get(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| {
            self.0
                .iter()
                .find(|(key, value)| key == name && !value.is_empty())
                .map(|(_, value)| value.as_str())
        })
    }

    pub fn all(&self, name: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
            .collect()
    }

    pub fn required_int(&self, name: &str) -> Result<i64, ApiError> {
        self.optional_int(name)?
            .ok_or_else(|| ApiError::bad_request(format!("{} is required", name)))
    }

    pub fn required_str(&self, name: &str) -> Result<String, ApiError> {
        self.get(&[name])
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request(format!("{} is required", name)))
    }

    pub fn optional_int(&self, name: &str) -> Result<Option<i64>, ApiError> {
        self.optional_int_any(&[name])
    }

    /// Integer under any of `names`; errors name the first.
    pub fn optional_int_any(&self, names: &[&str]) -> Result<Option<i64>, ApiError> {
        let field = names.first().copied().unwrap_or_default();
        self.get(names)
            .map(|value| {
                value
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::bad_request(format!("{} must be an integer", field)))
            })
            .transpose()
    }

    pub fn ints(&self, name: &str) -> Result<Vec<i64>, ApiError> {
        self.all(name)
            .iter()
            .filter(|value| !value.is_empty())
            .map(|value| {
                value
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::bad_request(format!("{} must be an integer", name)))
            })
            .collect()
    }

    /// Status filter: digits are ids, anything else a name.
    pub fn status(&self, name: &str) -> Option<StatusRef> {
        self.get(&[name]).map(|value| match value.trim().parse::<i64>() {
            Ok(id) => StatusRef::Id(id),
            Err(_) => StatusRef::Name(value.to_string()),
        })
    }

    pub fn flag(&self, name: &str) -> Result<bool, ApiError> {
        match self.get(&[name]) {
            None => Ok(false),
            Some(value) => parse_flag(value)
                .ok_or_else(|| ApiError::bad_request(format!("{} must be a boolean", name))),
        }
    }
}
