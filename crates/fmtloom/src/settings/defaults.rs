//! Built-in defaults, the lowest configuration layer.

use serde_json::{Map, Value, json};

use super::keys;

/// Returns the built-in default for `key`, if the engine defines one.
#[must_use]
pub fn builtin_value(key: &str) -> Option<Value> {
    match key {
        keys::DEBUG | keys::FORMAT_ON_SAVE => Some(Value::Bool(false)),
        keys::PATHS => Some(json!([])),
        keys::COMMAND_MAP | keys::OPTIONS => Some(Value::Object(Map::new())),
        keys::PIPELINE_POLICY => Some(Value::String(String::from("fail_fast"))),
        _ => None,
    }
}
