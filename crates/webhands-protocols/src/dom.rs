//! Page snapshot types shared between the DOM engine and actions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::page::{ElementFingerprint, Locator, Rect};

/// An element the model may act on, valid only for the snapshot that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractiveElement {
    /// 1-based index within the snapshot.
    pub highlight_index: u32,

    /// Lowercase tag name.
    pub tag: String,

    pub attributes: Vec<(String, String)>,

    /// Whitespace-collapsed text content.
    pub text: String,

    pub rect: Rect,

    /// Why the element was classified as interactive.
    pub reason: String,

    pub css_path: String,
    pub xpath: String,
    pub is_under_shadow_root: bool,

    /// CSS path of the innermost shadow host, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_host: Option<String>,

    /// Locator of the owning iframe, for elements in nested documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<Locator>,

    /// Identity checked again when the element is resolved on the live page.
    #[serde(default)]
    pub fingerprint: ElementFingerprint,
}

impl InteractiveElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Scroll and viewport measurements of the top-level page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetrics {
    pub url: String,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub scroll_width: f64,
    pub scroll_height: f64,
    pub device_pixel_ratio: f64,
}

impl PageMetrics {
    pub fn pixels_above(&self) -> i64 {
        self.scroll_y.round() as i64
    }

    pub fn pixels_below(&self) -> i64 {
        (self.scroll_height - (self.scroll_y + self.viewport_height)).round() as i64
    }
}

/// One observation of the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomState {
    /// Interactive elements keyed by highlight index.
    pub elements: BTreeMap<u32, InteractiveElement>,

    /// Text view of the elements as shown to the model.
    pub dom_text: String,

    pub metrics: PageMetrics,

    /// Base64 PNG taken with the highlight overlay drawn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

impl DomState {
    pub fn element(&self, index: u32) -> Option<&InteractiveElement> {
        self.elements.get(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
