//! Numbered overlay drawn over indexed elements before the screenshot.

use serde::Serialize;

use webhands_protocols::dom::InteractiveElement;
use webhands_protocols::page::Rect;

pub const HIGHLIGHT_CONTAINER_ID: &str = "hb-highlight-container";

pub const PALETTE: [&str; 12] = [
    "#FF0000", "#00FF00", "#0000FF", "#FFA500", "#800080", "#008080", "#FF69B4", "#4B0082",
    "#FF4500", "#2E8B57", "#DC143C", "#4682B4",
];

const HIGHLIGHT_JS: &str = include_str!("js/highlight.js");

const LABEL_PADDING: f64 = 4.0;

/// Border colour and translucent fill for an index.
pub fn highlight_color(index: u32) -> (String, String) {
    let base = PALETTE[index as usize % PALETTE.len()];
    (base.to_string(), format!("{}1A", base))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelBox {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightBox {
    pub index: u32,
    pub rect: Rect,
    pub color: String,
    pub background: String,
    pub font_size: f64,
    pub label: LabelBox,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightPlan {
    pub container_id: &'static str,
    pub boxes: Vec<HighlightBox>,
}

/// Font size and label dimensions for an index on an element box.
pub fn label_size(index: u32, rect: &Rect) -> (f64, f64, f64) {
    let font_size = (rect.height * 0.3).clamp(9.0, 12.0);
    let height = font_size + LABEL_PADDING;
    let text_width = index.to_string().len() as f64 * font_size * 0.6;
    let width = height.max(text_width + LABEL_PADDING * 2.0);
    (font_size, width, height)
}

/// Label origin: above the top-right corner, or below the bottom-right
/// corner when that would cover the element. Always inside the canvas.
pub fn label_position(
    rect: &Rect,
    width: f64,
    height: f64,
    canvas_width: f64,
    canvas_height: f64,
) -> (f64, f64) {
    let clamp = |top: f64, left: f64| {
        (
            top.min(canvas_height - height).max(0.0),
            left.min(canvas_width - width).max(0.0),
        )
    };

    let (top, left) = clamp(rect.y - height, rect.right() - width);
    let label = Rect::new(left, top, width, height);
    if label.intersects(rect) {
        clamp(rect.bottom(), rect.right() - width)
    } else {
        (top, left)
    }
}

/// Boxes for every element that is at least partly on screen.
pub fn plan<'a>(
    elements: impl IntoIterator<Item = &'a InteractiveElement>,
    viewport_width: f64,
    viewport_height: f64,
) -> HighlightPlan {
    let boxes = elements
        .into_iter()
        .filter(|e| !e.rect.is_empty() && e.rect.is_partially_visible(viewport_width, viewport_height))
        .map(|e| {
            let index = e.highlight_index;
            let (color, background) = highlight_color(index);
            let (font_size, width, height) = label_size(index, &e.rect);
            let (top, left) =
                label_position(&e.rect, width, height, viewport_width, viewport_height);
            HighlightBox {
                index,
                rect: e.rect,
                color,
                background,
                font_size,
                label: LabelBox {
                    top,
                    left,
                    width,
                    height,
                },
            }
        })
        .collect();

    HighlightPlan {
        container_id: HIGHLIGHT_CONTAINER_ID,
        boxes,
    }
}

/// Expression that draws the plan and evaluates to the number of boxes.
pub fn render_script(plan: &HighlightPlan) -> Result<String, serde_json::Error> {
    Ok(format!("({})({})", HIGHLIGHT_JS.trim(), serde_json::to_string(plan)?))
}

/// Expression that removes the overlay if present.
pub fn remove_script() -> String {
    format!(
        "(() => {{ const c = document.getElementById(\"{}\"); if (c) c.remove(); return true; }})()",
        HIGHLIGHT_CONTAINER_ID
    )
}
