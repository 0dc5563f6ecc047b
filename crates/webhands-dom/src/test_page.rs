//! Scripted page used by the engine, resolver and actionability tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::time::Duration;

use webhands_protocols::error::PageError;
use webhands_protocols::page::{BrowserPage, Locator, LocatorInfo};

#[derive(Default)]
pub struct ScriptedPage {
    /// Returned by `evaluate` for the capture script.
    pub capture: Mutex<Option<Value>>,
    /// Consumed by `inspect`; the last entry repeats.
    pub inspections: Mutex<VecDeque<LocatorInfo>>,
    pub evaluated: Mutex<Vec<String>>,
    pub screenshots: Mutex<u32>,
}

impl ScriptedPage {
    pub fn with_capture(capture: Value) -> Self {
        let page = Self::default();
        *page.capture.lock() = Some(capture);
        page
    }

    pub fn with_inspections(infos: Vec<LocatorInfo>) -> Self {
        let page = Self::default();
        *page.inspections.lock() = infos.into();
        page
    }
}

#[async_trait]
impl BrowserPage for ScriptedPage {
    async fn url(&self) -> Result<String, PageError> {
        Ok("https://example.com/".to_string())
    }
    async fn goto(&self, _url: &str) -> Result<(), PageError> {
        Ok(())
    }
    async fn go_back(&self) -> Result<(), PageError> {
        Ok(())
    }
    async fn go_forward(&self) -> Result<(), PageError> {
        Ok(())
    }
    async fn reload(&self) -> Result<(), PageError> {
        Ok(())
    }
    async fn evaluate(&self, expression: &str) -> Result<Value, PageError> {
        self.evaluated.lock().push(expression.to_string());
        if expression.contains("viewportWidth") {
            return Ok(self.capture.lock().clone().unwrap_or(Value::Null));
        }
        Ok(Value::from(1))
    }
    async fn screenshot(&self) -> Result<String, PageError> {
        *self.screenshots.lock() += 1;
        Ok("iVBORw0KGgo=".to_string())
    }
    async fn inspect(&self, _locator: &Locator) -> Result<LocatorInfo, PageError> {
        let mut queue = self.inspections.lock();
        if queue.len() > 1 {
            Ok(queue.pop_front().unwrap_or_default())
        } else {
            Ok(queue.front().cloned().unwrap_or_default())
        }
    }
    async fn click(&self, _locator: &Locator) -> Result<(), PageError> {
        Ok(())
    }
    async fn fill(&self, _l: &Locator, _t: &str, _d: Duration) -> Result<(), PageError> {
        Ok(())
    }
    async fn select_option(&self, _l: &Locator, _v: &str, _d: Duration) -> Result<(), PageError> {
        Ok(())
    }
    async fn key_down(&self, _key: &str) -> Result<(), PageError> {
        Ok(())
    }
    async fn key_up(&self, _key: &str) -> Result<(), PageError> {
        Ok(())
    }
    async fn add_init_script(&self, _script: &str) -> Result<(), PageError> {
        Ok(())
    }
    async fn close(&self) -> Result<(), PageError> {
        Ok(())
    }
}
