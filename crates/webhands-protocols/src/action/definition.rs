//! Action definition types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type name reserved for the completion action.
pub const COMPLETE_ACTION: &str = "complete";

/// Static description of an action as presented to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Type name the model uses in `{"type": ...}`.
    #[serde(rename = "type")]
    pub action_type: String,

    pub description: String,

    /// JSON Schema of the `params` object.
    pub params_schema: Value,
}

impl ActionDefinition {
    pub fn new(action_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            description: description.into(),
            params_schema: serde_json::json!({"type": "object", "properties": {}}),
        }
    }

    pub fn with_params_schema(mut self, schema: Value) -> Self {
        self.params_schema = schema;
        self
    }

    /// The `anyOf` variant for this action in the model-facing schema.
    pub fn schema_variant(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "type": {"type": "string", "const": self.action_type},
                "params": self.params_schema,
                "actionDescription": {"type": "string", "const": self.description},
            },
            "required": ["type", "params", "actionDescription"],
            "additionalProperties": false,
        })
    }
}
