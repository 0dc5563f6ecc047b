//! Transport layer for MCP communication.

use std::collections::HashMap;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::protocol::{McpNotification, McpRequest, McpResponse};

/// Transport trait for MCP communication.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and receive its response.
    async fn send(&self, request: McpRequest) -> Result<McpResponse, TransportError>;

    /// Send a notification; nothing comes back.
    async fn notify(&self, notification: McpNotification) -> Result<(), TransportError>;

    /// Close the transport.
    async fn close(&self) -> Result<(), TransportError>;
}

/// Transport errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Process error: {0}")]
    Process(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Connection closed")]
    Closed,
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

/// Stdio transport for subprocess MCP servers.
///
/// Messages are newline-delimited JSON. Lines that are not the response to
/// the pending request (server notifications, stray output) are skipped.
pub struct StdioTransport {
    child: Mutex<Option<Child>>,
    io: Mutex<Option<(ChildStdin, BufReader<ChildStdout>)>>,
}

impl StdioTransport {
    /// Spawn `command` with `args`, adding `env` to the inherited environment.
    pub async fn spawn(
        command: &str,
        args: &[String],
        env: &HashMap<String, String>,
        inherit_stderr: bool,
    ) -> Result<Self, TransportError> {
        let stderr = if inherit_stderr {
            Stdio::inherit()
        } else {
            Stdio::null()
        };
        let mut child = Command::new(command)
            .args(args)
            .envs(env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(stderr)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TransportError::Process(format!("failed to start {}: {}", command, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TransportError::Process("Failed to capture stdin".to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TransportError::Process("Failed to capture stdout".to_string()))?;

        debug!("Spawned MCP server: {} {:?}", command, args);
        Ok(Self {
            child: Mutex::new(Some(child)),
            io: Mutex::new(Some((stdin, BufReader::new(stdout)))),
        })
    }

    async fn write_line(stdin: &mut ChildStdin, json: &str) -> Result<(), TransportError> {
        stdin.write_all(json.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Transport for StdioTransport {
    async fn send(&self, request: McpRequest) -> Result<McpResponse, TransportError> {
        let mut guard = self.io.lock().await;
        let (stdin, stdout) = guard.as_mut().ok_or(TransportError::Closed)?;

        Self::write_line(stdin, &serde_json::to_string(&request)?).await?;

        loop {
            let mut line = String::new();
            if stdout.read_line(&mut line).await? == 0 {
                return Err(TransportError::Closed);
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<McpResponse>(line) {
                Ok(response) if response.id == request.id => return Ok(response),
                _ => trace!("Skipping MCP line: {}", line),
            }
        }
    }

    async fn notify(&self, notification: McpNotification) -> Result<(), TransportError> {
        let mut guard = self.io.lock().await;
        let (stdin, _) = guard.as_mut().ok_or(TransportError::Closed)?;
        Self::write_line(stdin, &serde_json::to_string(&notification)?).await
    }

    async fn close(&self) -> Result<(), TransportError> {
        *self.io.lock().await = None;

        if let Some(mut child) = self.child.lock().await.take() {
            child.kill().await?;
        }

        Ok(())
    }
}
