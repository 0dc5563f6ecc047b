//! Browser page and provider traits.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::{Locator, LocatorInfo};
use crate::error::PageError;

/// A single browser tab.
///
/// Key names follow the DOM `KeyboardEvent.key` convention (`Enter`,
/// `Control`, `ArrowDown`, `a`).
#[async_trait]
pub trait BrowserPage: Send + Sync {
    async fn url(&self) -> Result<String, PageError>;

    /// Navigate and wait for the load to finish.
    async fn goto(&self, url: &str) -> Result<(), PageError>;

    async fn go_back(&self) -> Result<(), PageError>;

    async fn go_forward(&self) -> Result<(), PageError>;

    async fn reload(&self) -> Result<(), PageError>;

    /// Evaluate an expression in the main frame and return its JSON value.
    async fn evaluate(&self, expression: &str) -> Result<Value, PageError>;

    /// PNG screenshot of the viewport, base64 encoded.
    async fn screenshot(&self) -> Result<String, PageError>;

    /// Count, tag, visibility, enabled state and box of a locator's matches.
    async fn inspect(&self, locator: &Locator) -> Result<LocatorInfo, PageError>;

    /// Click the center of the first match without actionability checks.
    async fn click(&self, locator: &Locator) -> Result<(), PageError>;

    /// Replace the value of an input-like element.
    async fn fill(&self, locator: &Locator, text: &str, timeout: Duration) -> Result<(), PageError>;

    /// Select the `<option>` whose label (or value) matches.
    async fn select_option(
        &self,
        locator: &Locator,
        label: &str,
        timeout: Duration,
    ) -> Result<(), PageError>;

    async fn key_down(&self, key: &str) -> Result<(), PageError>;

    async fn key_up(&self, key: &str) -> Result<(), PageError>;

    async fn press_key(&self, key: &str) -> Result<(), PageError> {
        self.key_down(key).await?;
        self.key_up(key).await
    }

    /// Register a script that runs before any page script on every navigation.
    async fn add_init_script(&self, script: &str) -> Result<(), PageError>;

    async fn close(&self) -> Result<(), PageError>;
}

/// Source of browser pages.
#[async_trait]
pub trait BrowserProvider: Send + Sync {
    fn id(&self) -> &str;

    async fn new_page(&self) -> Result<Arc<dyn BrowserPage>, PageError>;

    async fn close(&self) -> Result<(), PageError>;
}
