use async_trait::async_trait;
use std::sync::Mutex;

use crate::protocol::{McpNotification, McpRequest, McpResponse};
use crate::transport::{Transport, TransportError};

/// Replays canned responses in order and records what was sent.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<Vec<McpResponse>>,
    pub requests: Mutex<Vec<McpRequest>>,
    pub notifications: Mutex<Vec<String>>,
    pub closed: Mutex<bool>,
}

impl MockTransport {
    pub fn new(responses: Vec<McpResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: McpRequest) -> Result<McpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(TransportError::Closed);
        }
        Ok(responses.remove(0))
    }

    async fn notify(&self, notification: McpNotification) -> Result<(), TransportError> {
        self.notifications
            .lock()
            .unwrap()
            .push(notification.method);
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}
