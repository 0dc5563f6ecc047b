//! External tool server errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolServerError {
    #[error("Tool server not found: {0}")]
    NotFound(String),

    #[error("Tool server already connected: {0}")]
    AlreadyConnected(String),

    #[error("Tool server connection failed: {0}")]
    Connection(String),

    #[error("Tool server protocol error: {0}")]
    Protocol(String),
}
