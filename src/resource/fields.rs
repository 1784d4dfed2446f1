//! Field-list projection of JSON views and payloads

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::types::{FieldViolation, StoreError, StoreResult};

/// Keep only `fields` in a JSON object; other values pass unchanged
pub fn project(fields: &[&str], value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            map.retain(|key, _| fields.contains(&key.as_str()));
            Value::Object(map)
        }
        other => other,
    }
}

/// Serialize an entity and keep only `fields`
pub fn view<T: Serialize>(fields: &[&str], entity: &T) -> StoreResult<Value> {
    Ok(project(fields, serde_json::to_value(entity)?))
}

/// Drop everything outside `fields` from a payload and deserialize the rest
pub fn accept<T: DeserializeOwned>(fields: &[&str], payload: Value) -> StoreResult<T> {
    if !payload.is_object() {
        return Err(StoreError::Validation(vec![FieldViolation::new(
            "payload",
            "must be a JSON object",
        )]));
    }

    serde_json::from_value(project(fields, payload)).map_err(|e| {
        StoreError::Validation(vec![FieldViolation::new("payload", e.to_string())])
    })
}
