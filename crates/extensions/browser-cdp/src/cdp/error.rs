//! CDP error types.

use thiserror::Error;
use webhands_protocols::PageError;

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Nothing answered the DevTools HTTP endpoint.
    #[error("Browser not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    BrowserNotAvailable(String),

    #[error("No Chromium-family browser executable found")]
    ExecutableNotFound,

    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Error object returned by the browser for a command.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::ConnectionFailed(format!("Invalid URL: {}", e))
    }
}

impl From<CdpError> for PageError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::NavigationFailed(msg) => PageError::Navigation(msg),
            CdpError::ElementNotFound(msg) => PageError::ElementNotFound(msg),
            CdpError::JavaScript(msg) => PageError::Script(msg),
            CdpError::Timeout(msg) => PageError::Timeout(msg),
            CdpError::SessionClosed => PageError::Closed,
            other => PageError::Other(other.to_string()),
        }
    }
}
