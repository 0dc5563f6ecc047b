//! CDP page session for interacting with a single page.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{Value, json};
use tracing::debug;

use super::client::Connection;
use super::error::CdpError;
use super::protocol::{KeyEventType, MouseButton, MouseEventType};

const LOAD_TIMEOUT: Duration = Duration::from_secs(30);
const LOAD_POLL: Duration = Duration::from_millis(100);

/// A flattened session attached to one page target.
pub struct PageSession {
    target_id: String,
    session_id: String,
    conn: Arc<Connection>,
}

impl PageSession {
    pub(crate) fn new(target_id: String, session_id: String, conn: Arc<Connection>) -> Self {
        Self {
            target_id,
            session_id,
            conn,
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.conn.send(method, params, Some(&self.session_id)).await
    }

    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("DOM.enable", None).await?;
        self.call("Runtime.enable", None).await?;

        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub async fn navigate(&self, url: &str) -> Result<(), CdpError> {
        let result = self
            .call("Page.navigate", Some(json!({"url": url})))
            .await?;

        if let Some(error) = result.get("errorText").and_then(Value::as_str) {
            return Err(CdpError::NavigationFailed(format!("{}: {}", url, error)));
        }

        self.wait_for_load().await?;
        debug!("Navigated to {}", url);
        Ok(())
    }

    /// Poll `document.readyState` until the document is at least interactive.
    pub async fn wait_for_load(&self) -> Result<(), CdpError> {
        let start = Instant::now();

        loop {
            // Evaluations race the document swap during navigation; retry those.
            if let Ok(state) = self.evaluate("document.readyState").await {
                if matches!(state.as_str(), Some("complete" | "interactive")) {
                    return Ok(());
                }
            }

            if start.elapsed() > LOAD_TIMEOUT {
                return Err(CdpError::Timeout("Page load timeout".to_string()));
            }

            tokio::time::sleep(LOAD_POLL).await;
        }
    }

    pub async fn reload(&self) -> Result<(), CdpError> {
        self.call("Page.reload", None).await?;
        self.wait_for_load().await
    }

    pub async fn go_back(&self) -> Result<(), CdpError> {
        self.navigate_history(-1).await
    }

    pub async fn go_forward(&self) -> Result<(), CdpError> {
        self.navigate_history(1).await
    }

    /// Move through session history. No-op at either end.
    async fn navigate_history(&self, delta: i64) -> Result<(), CdpError> {
        let history = self.call("Page.getNavigationHistory", None).await?;
        let current = history["currentIndex"].as_i64().unwrap_or(0);
        let target = current + delta;

        let entry_id = history["entries"]
            .as_array()
            .and_then(|entries| usize::try_from(target).ok().and_then(|i| entries.get(i)))
            .and_then(|entry| entry["id"].as_i64());

        if let Some(entry_id) = entry_id {
            self.call(
                "Page.navigateToHistoryEntry",
                Some(json!({"entryId": entry_id})),
            )
            .await?;
            self.wait_for_load().await?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Scripts
    // ------------------------------------------------------------------

    /// Evaluate an expression, awaiting promises, and return its JSON value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["exception"]["description"]
                .as_str()
                .or_else(|| exception["text"].as_str())
                .unwrap_or("Unknown error");
            return Err(CdpError::JavaScript(text.to_string()));
        }

        Ok(result["result"]["value"].clone())
    }

    pub async fn add_script_on_new_document(&self, source: &str) -> Result<String, CdpError> {
        let result = self
            .call(
                "Page.addScriptToEvaluateOnNewDocument",
                Some(json!({"source": source})),
            )
            .await?;
        Ok(result["identifier"].as_str().unwrap_or_default().to_string())
    }

    /// Base64 PNG of the current viewport.
    pub async fn screenshot(&self) -> Result<String, CdpError> {
        let result = self
            .call("Page.captureScreenshot", Some(json!({"format": "png"})))
            .await?;

        result["data"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| CdpError::InvalidResponse("Missing screenshot data".to_string()))
    }

    pub async fn set_viewport(&self, width: u32, height: u32) -> Result<(), CdpError> {
        self.call(
            "Emulation.setDeviceMetricsOverride",
            Some(json!({
                "width": width,
                "height": height,
                "deviceScaleFactor": 0,
                "mobile": false,
            })),
        )
        .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Left click at viewport coordinates.
    pub async fn click(&self, x: f64, y: f64) -> Result<(), CdpError> {
        self.call(
            "Input.dispatchMouseEvent",
            Some(json!({"type": MouseEventType::MouseMoved, "x": x, "y": y})),
        )
        .await?;

        for event in [MouseEventType::MousePressed, MouseEventType::MouseReleased] {
            self.call(
                "Input.dispatchMouseEvent",
                Some(json!({
                    "type": event,
                    "x": x,
                    "y": y,
                    "button": MouseButton::Left,
                    "clickCount": 1,
                })),
            )
            .await?;
        }

        debug!("Clicked at ({}, {})", x, y);
        Ok(())
    }

    /// Dispatch a raw key event. `text` is set for keys that insert characters.
    pub async fn key_event(
        &self,
        event: KeyEventType,
        key: &str,
        code: Option<i64>,
        text: Option<&str>,
        modifiers: i32,
    ) -> Result<(), CdpError> {
        let mut params = json!({
            "type": event,
            "key": key,
            "modifiers": modifiers,
        });
        if let Some(code) = code {
            params["windowsVirtualKeyCode"] = json!(code);
        }
        if let Some(text) = text {
            params["text"] = json!(text);
        }

        self.call("Input.dispatchKeyEvent", Some(params)).await?;
        Ok(())
    }
}
