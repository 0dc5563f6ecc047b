//! Element locators and geometry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a locator finds its element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Selector {
    /// CSS selector. `>>` separates shadow-root hops.
    Css(String),
    XPath(String),
}

/// A selector, optionally scoped to the document of an iframe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    pub selector: Selector,

    /// Locator of the `<iframe>` whose document this selector runs in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<Box<Locator>>,
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            selector: Selector::Css(selector.into()),
            frame: None,
        }
    }

    pub fn xpath(xpath: impl Into<String>) -> Self {
        Self {
            selector: Selector::XPath(xpath.into()),
            frame: None,
        }
    }

    pub fn within_frame(mut self, frame: Locator) -> Self {
        self.frame = Some(Box::new(frame));
        self
    }

    /// Number of iframe documents between the top page and the target.
    pub fn frame_depth(&self) -> usize {
        match &self.frame {
            Some(frame) => 1 + frame.frame_depth(),
            None => 0,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(frame) = &self.frame {
            write!(f, "{} |> ", frame)?;
        }
        match &self.selector {
            Selector::Css(css) => write!(f, "css={}", css),
            Selector::XPath(xpath) => write!(f, "xpath={}", xpath),
        }
    }
}

/// Bounding box in top-level viewport CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Whether any part of the box lies inside a viewport of the given size.
    pub fn is_partially_visible(&self, viewport_width: f64, viewport_height: f64) -> bool {
        self.bottom() > 0.0
            && self.right() > 0.0
            && self.y < viewport_height
            && self.x < viewport_width
    }
}

/// Live state of the element(s) a locator matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocatorInfo {
    /// Number of matching elements.
    pub count: usize,

    /// Lowercase tag name of the first match.
    #[serde(default)]
    pub tag: Option<String>,

    #[serde(default)]
    pub visible: bool,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub rect: Option<Rect>,

    /// Identity of the first match, when the page reports it.
    #[serde(default)]
    pub fingerprint: Option<ElementFingerprint>,
}

/// Characters of text kept in an [`ElementFingerprint`].
pub const FINGERPRINT_TEXT_LEN: usize = 64;

/// What tells two elements on the same path apart: the id attribute and the
/// start of the whitespace-collapsed text content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementFingerprint {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub text: String,
}

impl ElementFingerprint {
    pub fn new(id: Option<&str>, text: &str) -> Self {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        Self {
            id: id.filter(|id| !id.is_empty()).map(str::to_string),
            text: collapsed.chars().take(FINGERPRINT_TEXT_LEN).collect(),
        }
    }

    /// Re-normalize a fingerprint reported by the page.
    pub fn normalized(&self) -> Self {
        Self::new(self.id.as_deref(), &self.text)
    }
}
