//! Action outcome type.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of running one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,

    /// Structured data pulled from the page, shown back to the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<Value>,
}

impl ActionOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            extract: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            extract: None,
        }
    }

    pub fn with_extract(mut self, extract: Value) -> Self {
        self.extract = Some(extract);
        self
    }

    /// Text fed back to the model for this outcome.
    pub fn feedback(&self) -> String {
        match &self.extract {
            Some(extract) => format!("{} :\n {}", self.message, extract),
            None => self.message.clone(),
        }
    }
}
