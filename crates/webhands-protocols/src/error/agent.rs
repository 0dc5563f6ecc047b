//! Agent and task level errors.

use thiserror::Error;

use super::{ActionError, PageError, ProviderError, ToolServerError};

#[derive(Debug, Error)]
pub enum AgentError {
    /// Raised at construction or registration time, never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("LLM error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Page error: {0}")]
    Page(#[from] PageError),

    #[error("DOM snapshot failed: {0}")]
    Snapshot(String),

    #[error(transparent)]
    ToolServer(#[from] ToolServerError),

    #[error("Task join failed: {0}")]
    Join(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
