//! Page capture: evaluate the capture script, index, highlight, screenshot.

use tracing::debug;

use webhands_protocols::dom::DomState;
use webhands_protocols::error::PageError;
use webhands_protocols::page::BrowserPage;

use crate::error::SnapshotError;
use crate::highlight;
use crate::raw::RawSnapshot;
use crate::snapshot::{SnapshotOptions, build_dom_state};

/// Serializes every document and shadow root reachable from the page.
pub const CAPTURE_JS: &str = include_str!("js/capture.js");

/// Init script marking elements that register pointer listeners.
pub const LISTENER_TRACKER_JS: &str = include_str!("js/listener_tracker.js");

#[derive(Debug, Clone, Default)]
pub struct DomEngine {
    options: SnapshotOptions,
}

impl DomEngine {
    pub fn new(options: SnapshotOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SnapshotOptions {
        &self.options
    }

    /// Take a snapshot. `Ok(None)` means the page produced nothing usable
    /// (mid-navigation, empty document) and the caller should try again.
    pub async fn capture(&self, page: &dyn BrowserPage) -> Result<Option<DomState>, SnapshotError> {
        let value = page.evaluate(CAPTURE_JS).await?;
        if value.is_null() {
            return Ok(None);
        }

        let raw: RawSnapshot = serde_json::from_value(value)?;
        if raw.nodes.is_empty() {
            return Ok(None);
        }

        let mut state = build_dom_state(&raw, &self.options);
        debug!(
            "Captured {} nodes, {} interactive elements at {}",
            raw.nodes.len(),
            state.elements.len(),
            state.metrics.url
        );

        if self.options.highlight {
            let plan = highlight::plan(
                state.elements.values(),
                state.metrics.viewport_width,
                state.metrics.viewport_height,
            );
            page.evaluate(&highlight::render_script(&plan)?).await?;
        }

        if self.options.screenshot {
            state.screenshot = Some(page.screenshot().await?);
        }

        Ok(Some(state))
    }

    pub async fn remove_highlights(&self, page: &dyn BrowserPage) -> Result<(), PageError> {
        page.evaluate(&highlight::remove_script()).await?;
        Ok(())
    }
}
