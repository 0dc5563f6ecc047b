//! Structured output description.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Named JSON Schema the model's answer must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSchema {
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub schema: Value,
}

impl OutputSchema {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            schema,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// How a provider is asked for schema-conforming output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuredOutputMethod {
    /// The API constrains the answer to a JSON Schema.
    Native,
    /// The schema is offered as the only callable function.
    FunctionCalling,
}

impl StructuredOutputMethod {
    /// Pick the method from the model identity.
    pub fn for_model(model: &str) -> Self {
        let model = model.to_ascii_lowercase();
        let native = ["gpt-4o", "gpt-4.1", "gpt-5", "o1", "o3", "o4"];
        if native.iter().any(|prefix| model.starts_with(prefix)) {
            StructuredOutputMethod::Native
        } else {
            StructuredOutputMethod::FunctionCalling
        }
    }
}
