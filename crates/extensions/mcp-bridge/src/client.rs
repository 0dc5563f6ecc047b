//! MCP client implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use serde_json::Value;
use tracing::{debug, info};

use crate::protocol::{
    McpMethod, McpNotification, McpRequest, McpResponse, McpToolDefinition, McpToolResult,
    PROTOCOL_VERSION,
};
use crate::transport::{Transport, TransportError};

/// MCP client for communicating with MCP servers.
pub struct McpClient {
    transport: Arc<dyn Transport>,
    request_id: AtomicI64,
    server_info: Option<Value>,
}

impl McpClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            request_id: AtomicI64::new(1),
            server_info: None,
        }
    }

    fn next_id(&self) -> i64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, McpClientError> {
        let id = self.next_id();
        let mut request = McpRequest::new(id, method);
        if let Some(p) = params {
            request = request.with_params(p);
        }

        debug!("Sending MCP request: {} (id={})", method, id);

        let McpResponse { result, error, .. } = self.transport.send(request).await?;
        if let Some(err) = error {
            return Err(McpClientError::ServerError {
                code: err.code,
                message: err.message,
            });
        }

        Ok(result.unwrap_or(Value::Null))
    }

    /// Run the `initialize` handshake and acknowledge it.
    pub async fn initialize(&mut self) -> Result<Value, McpClientError> {
        let params = serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": "webhands",
                "version": env!("CARGO_PKG_VERSION")
            }
        });

        let result = self
            .request(McpMethod::Initialize.as_str(), Some(params))
            .await?;
        self.transport
            .notify(McpNotification::new(McpMethod::Initialized.as_str()))
            .await?;

        info!(
            "MCP connection initialized: {}",
            result
                .pointer("/serverInfo/name")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown server")
        );
        self.server_info = Some(result.clone());
        Ok(result)
    }

    /// Result of the `initialize` handshake, once it has run.
    pub fn server_info(&self) -> Option<&Value> {
        self.server_info.as_ref()
    }

    /// List available tools.
    pub async fn list_tools(&self) -> Result<Vec<McpToolDefinition>, McpClientError> {
        let result = self.request(McpMethod::ListTools.as_str(), None).await?;

        match result.get("tools") {
            Some(tools) => serde_json::from_value(tools.clone())
                .map_err(|e| McpClientError::ProtocolError(format!("invalid tool list: {}", e))),
            None => Ok(Vec::new()),
        }
    }

    /// Call a tool.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<McpToolResult, McpClientError> {
        let params = serde_json::json!({
            "name": name,
            "arguments": arguments
        });

        let result = self
            .request(McpMethod::CallTool.as_str(), Some(params))
            .await?;

        serde_json::from_value(result).map_err(|e| McpClientError::ProtocolError(e.to_string()))
    }

    pub async fn close(&self) -> Result<(), McpClientError> {
        self.transport.close().await?;
        Ok(())
    }
}

/// MCP client errors.
#[derive(Debug, thiserror::Error)]
pub enum McpClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Server error ({code}): {message}")]
    ServerError { code: i32, message: String },

    #[error("Protocol error: {0}")]
    ProtocolError(String),
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
