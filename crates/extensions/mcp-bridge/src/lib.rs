//! MCP (Model Context Protocol) bridge for webhands.
//!
//! Connects to external MCP servers over stdio or SSE and exposes each of
//! their tools as an agent action.

mod action;
mod client;
mod protocol;
mod server;
mod sse_transport;
mod transport;

#[cfg(test)]
mod test_support;

pub use action::McpToolAction;
pub use client::{McpClient, McpClientError};
pub use protocol::{McpMethod, McpRequest, McpResponse, McpToolDefinition, McpToolResult};
pub use server::{ConnectionType, McpServer, McpServerConfig, parse_server_configs};
pub use sse_transport::{SseTransport, SseTransportConfig};
pub use transport::{StdioTransport, Transport, TransportError};
