//! Text view of a snapshot's interactive elements.

use webhands_protocols::dom::InteractiveElement;

use crate::classify::CONTEXT_ATTRIBUTES;
use crate::raw::{ChildRef, RawSnapshot};
use crate::snapshot::IndexedElement;

pub const MAX_TEXT_CHARS: usize = 1000;

fn truncate(text: &str) -> String {
    if text.chars().count() > MAX_TEXT_CHARS {
        let head: String = text.chars().take(MAX_TEXT_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// `[i]<tag a="v">text</tag>` for one element.
pub fn element_line(element: &InteractiveElement) -> String {
    let attributes: String = element
        .attributes
        .iter()
        .filter(|(name, _)| CONTEXT_ATTRIBUTES.contains(&name.as_str()))
        .map(|(name, value)| format!(" {}=\"{}\"", name, value))
        .collect();
    let text = element.text.split_whitespace().collect::<Vec<_>>().join(" ");

    format!(
        "[{}]<{}{}>{}</{}>",
        element.highlight_index,
        element.tag,
        attributes,
        truncate(&text),
        element.tag
    )
}

/// Text nodes following `node` among its siblings, up to `next`.
fn text_between(snap: &RawSnapshot, node: usize, next: Option<usize>) -> String {
    let Some(raw) = snap.node(node) else {
        return String::new();
    };
    let siblings = snap.sibling_refs(raw);
    let Some(start) = siblings
        .iter()
        .position(|c| matches!(c, ChildRef::Element { e } if *e == node))
    else {
        return String::new();
    };

    let mut texts = Vec::new();
    for child in &siblings[start + 1..] {
        match child {
            ChildRef::Element { e } if Some(*e) == next => break,
            ChildRef::Element { .. } => {}
            ChildRef::Text { t } => {
                let t = t.trim();
                if !t.is_empty() {
                    texts.push(t);
                }
            }
        }
    }
    texts.join(" ")
}

/// One line per element, each followed by the loose text after it.
pub fn serialize_elements(snap: &RawSnapshot, indexed: &[IndexedElement]) -> String {
    let mut lines = Vec::with_capacity(indexed.len());
    for (i, item) in indexed.iter().enumerate() {
        lines.push(element_line(&item.element));
        let next = indexed.get(i + 1).map(|n| n.node);
        let between = text_between(snap, item.node, next);
        if !between.is_empty() {
            lines.push(between);
        }
    }
    lines.join("\n")
}
