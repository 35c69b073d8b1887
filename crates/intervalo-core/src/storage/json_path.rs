//! Dot-path access into JSON documents.
//!
//! Used by the settings and config layers to read and write a single
//! field (`"sound.volume"`) while keeping the value's existing type.

use serde_json::Value;

use crate::error::ValidationError;

pub fn get<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    if key.is_empty() {
        return Some(root);
    }

    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

/// Set the field at `key` from its textual form.
///
/// The new value is parsed according to the type already stored at that
/// path, so `"75"` stays a number and `"true"` stays a bool. Unknown keys
/// are rejected. An empty key replaces the whole document.
pub fn set(root: &mut Value, key: &str, value: &str) -> Result<(), ValidationError> {
    if key.is_empty() {
        *root = parse_like(root, key, value)?;
        return Ok(());
    }

    let mut parts = key.split('.').peekable();
    let mut current = root;
    while let Some(part) = parts.next() {
        let is_leaf = parts.peek().is_none();
        if is_leaf {
            let obj = current
                .as_object_mut()
                .ok_or_else(|| ValidationError::UnknownKey(key.to_string()))?;
            let existing = obj
                .get(part)
                .ok_or_else(|| ValidationError::UnknownKey(key.to_string()))?;
            let new_value = parse_like(existing, key, value)?;
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        current = current
            .get_mut(part)
            .ok_or_else(|| ValidationError::UnknownKey(key.to_string()))?;
    }

    Err(ValidationError::UnknownKey(key.to_string()))
}

fn parse_like(existing: &Value, key: &str, value: &str) -> Result<Value, ValidationError> {
    let invalid = |message: String| ValidationError::InvalidValue {
        field: key.to_string(),
        message,
    };

    match existing {
        Value::Bool(_) => value
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|e| invalid(e.to_string())),
        Value::Number(_) => {
            if let Ok(n) = value.parse::<u64>() {
                Ok(Value::Number(n.into()))
            } else if let Ok(n) = value.parse::<f64>() {
                serde_json::Number::from_f64(n)
                    .map(Value::Number)
                    .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))
            } else {
                Err(invalid(format!("cannot parse '{value}' as number")))
            }
        }
        Value::Object(_) | Value::Array(_) => {
            serde_json::from_str(value).map_err(|e| invalid(e.to_string()))
        }
        // Optional fields: accept any JSON literal, else treat as a string.
        Value::Null => Ok(serde_json::from_str::<Value>(value)
            .unwrap_or_else(|_| Value::String(value.into()))),
        Value::String(_) => Ok(Value::String(value.into())),
    }
}
