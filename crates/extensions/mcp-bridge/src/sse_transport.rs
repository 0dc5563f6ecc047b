//! SSE (Server-Sent Events) transport for MCP communication.
//!
//! The client opens an event stream on `sse_url`; the server answers with an
//! `endpoint` event naming where requests are POSTed. Responses then arrive as
//! `message` events on the stream.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::{Client, RequestBuilder, header};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::protocol::{McpNotification, McpRequest, McpResponse};
use crate::transport::{Transport, TransportError};

/// SSE transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SseTransportConfig {
    /// Event stream URL.
    pub sse_url: String,
    /// Extra headers sent with every request.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl SseTransportConfig {
    pub fn new(sse_url: impl Into<String>) -> Self {
        Self {
            sse_url: sse_url.into(),
            headers: HashMap::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Incremental parser for the `text/event-stream` format.
#[derive(Debug, Default)]
pub(crate) struct SseParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseParser {
    /// Feed a chunk and return every event it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if self.event.is_some() || !self.data.is_empty() {
                    events.push(SseEvent {
                        event: self.event.take().unwrap_or_else(|| "message".to_string()),
                        data: self.data.join("\n"),
                    });
                    self.data.clear();
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };
            match field {
                "event" => self.event = Some(value.to_string()),
                "data" => self.data.push(value.to_string()),
                _ => {}
            }
        }

        events
    }
}

type Pending = Arc<Mutex<HashMap<String, oneshot::Sender<McpResponse>>>>;

/// SSE transport for remote MCP servers.
pub struct SseTransport {
    client: Client,
    endpoint: String,
    headers: HashMap<String, String>,
    timeout: Duration,
    pending: Pending,
    closed: Arc<AtomicBool>,
    listener: JoinHandle<()>,
}

impl SseTransport {
    /// Open the event stream and wait for the server to announce its endpoint.
    pub async fn connect(config: SseTransportConfig) -> Result<Self, TransportError> {
        let client = Client::new();
        let timeout = Duration::from_secs(config.timeout_seconds);

        let request = with_headers(client.get(&config.sse_url), &config.headers)
            .header(header::ACCEPT, "text/event-stream");
        let response = tokio::time::timeout(timeout, request.send())
            .await
            .map_err(|_| TransportError::Timeout)??;
        if !response.status().is_success() {
            return Err(TransportError::Http(format!(
                "SSE connection failed: {}",
                response.status()
            )));
        }

        let mut stream = Box::pin(response.bytes_stream());
        let mut parser = SseParser::default();
        let (path, backlog) = tokio::time::timeout(timeout, wait_for_endpoint(&mut stream, &mut parser))
            .await
            .map_err(|_| TransportError::Timeout)??;

        let endpoint = url::Url::parse(&config.sse_url)
            .and_then(|base| base.join(&path))
            .map_err(|e| TransportError::Http(format!("invalid endpoint {}: {}", path, e)))?
            .to_string();
        debug!("SSE endpoint: {}", endpoint);

        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let listener = tokio::spawn(listen(
            stream,
            parser,
            backlog,
            pending.clone(),
            closed.clone(),
        ));

        Ok(Self {
            client,
            endpoint,
            headers: config.headers,
            timeout,
            pending,
            closed,
            listener,
        })
    }

    /// URL requests are POSTed to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, body: &impl Serialize) -> Result<(), TransportError> {
        let response = with_headers(self.client.post(&self.endpoint), &self.headers)
            .header(header::CONTENT_TYPE, "application/json")
            .timeout(self.timeout)
            .json(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TransportError::Http(format!(
                "POST {} returned {}",
                self.endpoint,
                response.status()
            )));
        }
        Ok(())
    }
}

fn with_headers(mut request: RequestBuilder, headers: &HashMap<String, String>) -> RequestBuilder {
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }
    request
}

async fn wait_for_endpoint<S, B>(
    stream: &mut S,
    parser: &mut SseParser,
) -> Result<(String, Vec<SseEvent>), TransportError>
where
    S: Stream<Item = Result<B, reqwest::Error>> + Unpin,
    B: AsRef<[u8]>,
{
    while let Some(chunk) = stream.next().await {
        let mut events = parser.feed(chunk?.as_ref()).into_iter();
        while let Some(event) = events.next() {
            if event.event == "endpoint" {
                return Ok((event.data.trim().to_string(), events.collect()));
            }
            trace!("Ignoring SSE event before endpoint: {}", event.event);
        }
    }
    Err(TransportError::Closed)
}

async fn listen<S, B>(
    mut stream: S,
    mut parser: SseParser,
    backlog: Vec<SseEvent>,
    pending: Pending,
    closed: Arc<AtomicBool>,
) where
    S: Stream<Item = Result<B, reqwest::Error>> + Unpin,
    B: AsRef<[u8]>,
{
    for event in backlog {
        dispatch(&event, &pending).await;
    }

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => {
                for event in parser.feed(bytes.as_ref()) {
                    dispatch(&event, &pending).await;
                }
            }
            Err(e) => {
                warn!("SSE stream error: {}", e);
                break;
            }
        }
    }

    debug!("SSE stream ended");
    closed.store(true, Ordering::SeqCst);
    pending.lock().await.clear();
}

async fn dispatch(event: &SseEvent, pending: &Pending) {
    if event.event != "message" {
        trace!("Ignoring SSE event: {}", event.event);
        return;
    }
    match serde_json::from_str::<McpResponse>(&event.data) {
        Ok(response) => {
            if let Some(sender) = pending.lock().await.remove(&response.id.to_string()) {
                let _ = sender.send(response);
            }
        }
        Err(_) => trace!("Skipping SSE message: {}", event.data),
    }
}

#[async_trait]
impl Transport for SseTransport {
    async fn send(&self, request: McpRequest) -> Result<McpResponse, TransportError> {
        let id = request.id.to_string();
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), tx);

        if self.closed.load(Ordering::SeqCst) {
            self.pending.lock().await.remove(&id);
            return Err(TransportError::Closed);
        }

        if let Err(e) = self.post(&request).await {
            self.pending.lock().await.remove(&id);
            return Err(e);
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(TransportError::Closed),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(TransportError::Timeout)
            }
        }
    }

    async fn notify(&self, notification: McpNotification) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        self.post(&notification).await
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        self.listener.abort();
        self.pending.lock().await.clear();
        Ok(())
    }
}

impl Drop for SseTransport {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

#[cfg(test)]
#[path = "sse_transport_tests.rs"]
mod tests;
