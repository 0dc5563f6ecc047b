//! Completion response types.

use serde::{Deserialize, Serialize};

use crate::types::{Message, Usage};

/// Response of a free-form completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub model: String,
    pub message: Message,

    #[serde(default)]
    pub usage: Usage,
}

impl CompletionResponse {
    pub fn text(&self) -> String {
        self.message.text()
    }
}
