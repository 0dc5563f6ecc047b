//! Connected MCP servers exposed as tool servers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use webhands_protocols::{Action, ToolServer, ToolServerError};

use crate::action::McpToolAction;
use crate::client::{McpClient, McpClientError};
use crate::sse_transport::{SseTransport, SseTransportConfig};
use crate::transport::{StdioTransport, Transport};

/// How to reach an MCP server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    #[default]
    Stdio,
    Sse,
}

/// Configuration of one MCP server, as found in the `-m` JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpServerConfig {
    /// Server id; a random one is generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub connection_type: ConnectionType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,

    /// Added to the inherited environment of the server process.
    #[serde(default)]
    pub env: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sse_url: Option<String>,

    #[serde(default)]
    pub sse_headers: HashMap<String, String>,

    /// Tools to hide from the agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_tools: Option<Vec<String>>,

    /// When set, only these tools are exposed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_tools: Option<Vec<String>>,
}

impl McpServerConfig {
    pub fn stdio(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: Some(command.into()),
            args,
            ..Default::default()
        }
    }

    pub fn sse(url: impl Into<String>) -> Self {
        Self {
            connection_type: ConnectionType::Sse,
            sse_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Whether the include/exclude filters let `tool` through.
    pub fn allows(&self, tool: &str) -> bool {
        if let Some(include) = &self.include_tools {
            if !include.iter().any(|t| t == tool) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude_tools {
            if exclude.iter().any(|t| t == tool) {
                return false;
            }
        }
        true
    }
}

/// Parse the JSON array of server configs accepted by `--mcp`.
pub fn parse_server_configs(json: &str) -> Result<Vec<McpServerConfig>, serde_json::Error> {
    serde_json::from_str(json)
}

/// A connected MCP server whose tools are available as actions.
pub struct McpServer {
    id: String,
    client: Arc<McpClient>,
    actions: Vec<Arc<dyn Action>>,
}

impl McpServer {
    /// Start or reach the server described by `config` and list its tools.
    ///
    /// With `debug` set, a stdio server's stderr is passed through.
    pub async fn connect(config: McpServerConfig, debug: bool) -> Result<Self, ToolServerError> {
        let transport: Arc<dyn Transport> = match config.connection_type {
            ConnectionType::Sse => {
                let url = config.sse_url.as_deref().ok_or_else(|| {
                    ToolServerError::Connection(
                        "SSE URL is required for SSE connection type".to_string(),
                    )
                })?;
                info!("Establishing SSE connection to {}", url);
                let mut sse = SseTransportConfig::new(url);
                sse.headers = config.sse_headers.clone();
                Arc::new(SseTransport::connect(sse).await.map_err(connection_error)?)
            }
            ConnectionType::Stdio => {
                let command = config.command.as_deref().ok_or_else(|| {
                    ToolServerError::Connection(
                        "Command is required for stdio connection type".to_string(),
                    )
                })?;
                Arc::new(
                    StdioTransport::spawn(command, &config.args, &config.env, debug)
                        .await
                        .map_err(connection_error)?,
                )
            }
        };

        Self::with_transport(config, transport).await
    }

    /// Run the handshake over an already open transport.
    pub async fn with_transport(
        config: McpServerConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ToolServerError> {
        let id = config
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut client = McpClient::new(transport);

        let tools = match handshake(&mut client).await {
            Ok(tools) => tools,
            Err(e) => {
                if let Err(close_err) = client.close().await {
                    warn!("Failed to close MCP server {}: {}", id, close_err);
                }
                return Err(client_error(e));
            }
        };

        let client = Arc::new(client);
        let actions: Vec<Arc<dyn Action>> = tools
            .into_iter()
            .filter(|tool| config.allows(&tool.name))
            .map(|tool| Arc::new(McpToolAction::new(tool, client.clone())) as Arc<dyn Action>)
            .collect();

        info!(
            "Connected to MCP server {} with tools: {:?}",
            id,
            actions.iter().map(|a| a.action_type()).collect::<Vec<_>>()
        );

        Ok(Self {
            id,
            client,
            actions,
        })
    }
}

async fn handshake(
    client: &mut McpClient,
) -> Result<Vec<crate::protocol::McpToolDefinition>, McpClientError> {
    client.initialize().await?;
    client.list_tools().await
}

fn connection_error(err: impl std::fmt::Display) -> ToolServerError {
    ToolServerError::Connection(err.to_string())
}

fn client_error(err: McpClientError) -> ToolServerError {
    match err {
        McpClientError::Transport(e) => connection_error(e),
        other => ToolServerError::Protocol(other.to_string()),
    }
}

#[async_trait]
impl ToolServer for McpServer {
    fn id(&self) -> &str {
        &self.id
    }

    fn actions(&self) -> Vec<Arc<dyn Action>> {
        self.actions.clone()
    }

    async fn close(&self) -> Result<(), ToolServerError> {
        self.client.close().await.map_err(client_error)
    }
}
