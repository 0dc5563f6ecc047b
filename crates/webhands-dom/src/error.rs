//! Snapshot errors.

use thiserror::Error;

use webhands_protocols::error::{AgentError, PageError};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot evaluation failed: {0}")]
    Evaluation(#[from] PageError),

    #[error("Malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<SnapshotError> for AgentError {
    fn from(err: SnapshotError) -> Self {
        AgentError::Snapshot(err.to_string())
    }
}
