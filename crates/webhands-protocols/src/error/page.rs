//! Browser page errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Browser not connected")]
    NotConnected,

    #[error("Page closed")]
    Closed,

    #[error("Browser error: {0}")]
    Other(String),
}
