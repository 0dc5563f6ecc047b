//! Action registration and execution errors.

use thiserror::Error;

use super::{PageError, ProviderError};

#[derive(Debug, Error)]
pub enum ActionError {
    /// The model asked for a type that is not in the registry.
    #[error("Action not found: {0}")]
    NotFound(String),

    #[error("Action already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Action type '{0}' is reserved")]
    ReservedName(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Action execution failed: {0}")]
    ExecutionFailed(String),

    #[error(transparent)]
    Page(#[from] PageError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ActionError {
    /// Whether this error is a registry mismatch rather than a failed run.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ActionError::NotFound(_))
    }
}
