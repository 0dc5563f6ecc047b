//! External tool servers whose tools become actions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::action::Action;
use crate::error::ToolServerError;

/// A connected tool server.
#[async_trait]
pub trait ToolServer: Send + Sync {
    fn id(&self) -> &str;

    /// Actions exposing the server's tools, after filtering.
    fn actions(&self) -> Vec<Arc<dyn Action>>;

    async fn close(&self) -> Result<(), ToolServerError>;
}

/// Summary of a connected tool server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolServerInfo {
    pub id: String,
    pub tool_count: usize,
    pub tool_names: Vec<String>,
}
