//! Generic field access over a record's field tree.
//!
//! Field names resolve case-insensitively everywhere; the raw-cased key is
//! only ever needed to write a value back into the tree.
use serde_json::{Map, Value};

use super::error::StoreError;

/// Case-insensitive lookup of `name` among the tree's keys.
pub(crate) fn lookup<'a>(tree: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    let wanted = name.to_lowercase();
    tree.iter()
        .find(|(key, _)| key.to_lowercase() == wanted)
        .map(|(_, value)| value)
}

/// The tree's own spelling of `name`, for writing back into it.
pub(crate) fn raw_key(tree: &Map<String, Value>, name: &str) -> Option<String> {
    let wanted = name.to_lowercase();
    tree.keys().find(|key| key.to_lowercase() == wanted).cloned()
}

/// Text form of a value; strings render unquoted, everything else through
/// its JSON representation.
pub(crate) fn text_form(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Reads the text form of a named field. A JSON null reads as the empty
/// string so identity comparisons treat unset and blank alike.
pub(crate) fn field_text(tree: &Map<String, Value>, name: &str) -> Result<String, StoreError> {
    match lookup(tree, name) {
        None => Err(StoreError::MissingAccessor {
            key: name.to_string(),
        }),
        Some(Value::Null) => Ok(String::new()),
        Some(value) => Ok(text_form(value)),
    }
}

/// Whether the named field's scalar text form matches `value`, ignoring
/// case. Null, array, and object values never match.
pub(crate) fn matches_value(tree: &Map<String, Value>, name: &str, value: &str) -> bool {
    match lookup(tree, name) {
        Some(field @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => {
            text_form(field).to_lowercase() == value.to_lowercase()
        }
        _ => false,
    }
}
