//! [`BrowserPage`] over a CDP page session.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;
use webhands_protocols::{BrowserPage, Locator, LocatorInfo, PageError};

use crate::cdp::{CdpClient, KeyEventType, PageSession};
use crate::keys::{key_text, modifier_bit, virtual_key_code};
use crate::locator::{LocatorOp, locator_expression, parse_info, parse_mutation};

const ACTIONABLE_POLL: Duration = Duration::from_millis(100);

/// One browser tab.
pub struct CdpPage {
    client: Arc<CdpClient>,
    session: PageSession,
    /// Modifier bits of keys currently held down.
    modifiers: Mutex<i32>,
}

impl CdpPage {
    pub fn new(client: Arc<CdpClient>, session: PageSession) -> Self {
        Self {
            client,
            session,
            modifiers: Mutex::new(0),
        }
    }

    pub fn session(&self) -> &PageSession {
        &self.session
    }

    async fn run_locator(
        &self,
        locator: &Locator,
        op: LocatorOp,
        arg: Option<&str>,
    ) -> Result<Value, PageError> {
        let expression = locator_expression(locator, op, arg)?;
        Ok(self.session.evaluate(&expression).await?)
    }

    /// Wait until the first match is visible and enabled.
    async fn wait_actionable(&self, locator: &Locator, timeout: Duration) -> Result<(), PageError> {
        let start = Instant::now();
        loop {
            let info = self.inspect(locator).await?;
            if info.count > 0 && info.visible && info.enabled {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(PageError::Timeout(format!(
                    "{}ms exceeded waiting for {} to be visible and enabled",
                    timeout.as_millis(),
                    locator
                )));
            }
            tokio::time::sleep(ACTIONABLE_POLL).await;
        }
    }

    async fn key_event(&self, event: KeyEventType, key: &str) -> Result<(), PageError> {
        let modifiers = {
            let mut held = self.modifiers.lock();
            if let Some(bit) = modifier_bit(key) {
                match event {
                    KeyEventType::KeyUp => *held &= !bit,
                    _ => *held |= bit,
                }
            }
            *held
        };

        let text = match event {
            KeyEventType::KeyUp => None,
            _ => key_text(key, modifiers),
        };
        // Keys without text are sent as raw key downs so no keypress fires.
        let event = match (event, &text) {
            (KeyEventType::KeyDown, None) => KeyEventType::RawKeyDown,
            (event, _) => event,
        };

        self.session
            .key_event(event, key, virtual_key_code(key), text.as_deref(), modifiers)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl BrowserPage for CdpPage {
    async fn url(&self) -> Result<String, PageError> {
        let url = self.session.evaluate("window.location.href").await?;
        Ok(url.as_str().unwrap_or_default().to_string())
    }

    async fn goto(&self, url: &str) -> Result<(), PageError> {
        Ok(self.session.navigate(url).await?)
    }

    async fn go_back(&self) -> Result<(), PageError> {
        Ok(self.session.go_back().await?)
    }

    async fn go_forward(&self) -> Result<(), PageError> {
        Ok(self.session.go_forward().await?)
    }

    async fn reload(&self) -> Result<(), PageError> {
        Ok(self.session.reload().await?)
    }

    async fn evaluate(&self, expression: &str) -> Result<Value, PageError> {
        Ok(self.session.evaluate(expression).await?)
    }

    async fn screenshot(&self) -> Result<String, PageError> {
        Ok(self.session.screenshot().await?)
    }

    async fn inspect(&self, locator: &Locator) -> Result<LocatorInfo, PageError> {
        let value = self.run_locator(locator, LocatorOp::Inspect, None).await?;
        parse_info(value, locator)
    }

    async fn click(&self, locator: &Locator) -> Result<(), PageError> {
        let value = self
            .run_locator(locator, LocatorOp::ScrollIntoView, None)
            .await?;
        let info = parse_info(value, locator)?;
        let rect = info
            .rect
            .ok_or_else(|| PageError::ElementNotFound(locator.to_string()))?;
        let (x, y) = rect.center();
        debug!("Clicking {} at ({:.1}, {:.1})", locator, x, y);
        Ok(self.session.click(x, y).await?)
    }

    async fn fill(&self, locator: &Locator, text: &str, timeout: Duration) -> Result<(), PageError> {
        self.wait_actionable(locator, timeout).await?;
        let value = self.run_locator(locator, LocatorOp::Fill, Some(text)).await?;
        parse_mutation(value, locator)
    }

    async fn select_option(
        &self,
        locator: &Locator,
        label: &str,
        timeout: Duration,
    ) -> Result<(), PageError> {
        self.wait_actionable(locator, timeout).await?;
        let value = self
            .run_locator(locator, LocatorOp::Select, Some(label))
            .await?;
        parse_mutation(value, locator)
    }

    async fn key_down(&self, key: &str) -> Result<(), PageError> {
        self.key_event(KeyEventType::KeyDown, key).await
    }

    async fn key_up(&self, key: &str) -> Result<(), PageError> {
        self.key_event(KeyEventType::KeyUp, key).await
    }

    async fn add_init_script(&self, script: &str) -> Result<(), PageError> {
        self.session.add_script_on_new_document(script).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), PageError> {
        Ok(self.client.close_page(self.session.target_id()).await?)
    }
}
