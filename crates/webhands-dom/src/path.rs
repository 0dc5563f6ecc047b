//! CSS path and XPath generation over a captured tree.

use crate::raw::{RawNode, RawSnapshot, RootKind};

/// `CSS.escape` as specified by CSSOM.
pub fn css_escape(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());

    for (i, &c) in chars.iter().enumerate() {
        let code = c as u32;
        if c == '\0' {
            out.push('\u{FFFD}');
        } else if (0x01..=0x1F).contains(&code)
            || code == 0x7F
            || (i == 0 && c.is_ascii_digit())
            || (i == 1 && c.is_ascii_digit() && chars[0] == '-')
        {
            out.push_str(&format!("\\{:x} ", code));
        } else if i == 0 && c == '-' && chars.len() == 1 {
            out.push_str("\\-");
        } else if code >= 0x80 || c == '-' || c == '_' || c.is_ascii_alphanumeric() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

/// Selector segment distinguishing a node from its siblings.
fn css_segment(snap: &RawSnapshot, node: &RawNode) -> String {
    if let Some(id) = node.element_id() {
        return format!("#{}", css_escape(id));
    }

    let siblings = snap.element_siblings(node);
    let classes = node.classes();
    if !classes.is_empty() && node.parent.is_some() {
        let matching = siblings
            .iter()
            .filter(|s| {
                s.tag == node.tag && {
                    let theirs = s.classes();
                    classes.iter().all(|c| theirs.contains(c))
                }
            })
            .count();
        if matching == 1 {
            let escaped: Vec<String> = classes.iter().map(|c| css_escape(c)).collect();
            return format!("{}.{}", node.tag, escaped.join("."));
        }
    }

    let same_tag: Vec<&&RawNode> = siblings.iter().filter(|s| s.tag == node.tag).collect();
    if same_tag.len() > 1 {
        let position = same_tag
            .iter()
            .position(|s| s.id == node.id)
            .map(|p| p + 1)
            .unwrap_or(1);
        format!("{}:nth-of-type({})", node.tag, position)
    } else {
        node.tag.clone()
    }
}

/// Path from the node's document or shadow root down to the node.
fn relative_css_path(snap: &RawSnapshot, node: &RawNode) -> String {
    let mut segments = Vec::new();
    let mut current = Some(node);
    while let Some(n) = current {
        segments.push(css_segment(snap, n));
        current = n.parent.and_then(|p| snap.node(p));
    }
    segments.reverse();
    segments.join(" > ")
}

/// Full CSS path, with one `>>` per shadow root crossed.
pub fn css_path(snap: &RawSnapshot, node: &RawNode) -> String {
    let relative = relative_css_path(snap, node);
    if snap.root_kind(node) != RootKind::Shadow {
        return relative;
    }

    let host = snap
        .root(node.root)
        .and_then(|r| r.host)
        .and_then(|h| snap.node(h));
    match host {
        Some(host) => {
            let host_path = css_path(snap, host);
            if host_path.is_empty() || relative.is_empty() {
                String::new()
            } else {
                format!("{} >> {}", host_path, relative)
            }
        }
        None => String::new(),
    }
}

/// Quote `value` as an XPath 1.0 string literal, which has no escapes.
fn xpath_literal(value: &str) -> String {
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    let parts: Vec<String> = value
        .split('"')
        .map(|part| format!("\"{}\"", part))
        .collect();
    format!("concat({})", parts.join(", '\"', "))
}

/// XPath from the top of the node's root, relative to the document node.
pub fn xpath(snap: &RawSnapshot, node: &RawNode) -> String {
    let mut segments = Vec::new();
    let mut current = Some(node);
    while let Some(n) = current {
        let segment = match n.element_id() {
            Some(id) => format!("{}[@id={}]", n.tag, xpath_literal(id)),
            None => {
                let same_tag: Vec<&RawNode> = snap
                    .element_siblings(n)
                    .into_iter()
                    .filter(|s| s.tag == n.tag)
                    .collect();
                if same_tag.len() > 1 {
                    let position = same_tag
                        .iter()
                        .position(|s| s.id == n.id)
                        .map(|p| p + 1)
                        .unwrap_or(1);
                    format!("{}[{}]", n.tag, position)
                } else {
                    n.tag.clone()
                }
            }
        };
        segments.push(segment);
        current = n.parent.and_then(|p| snap.node(p));
    }
    segments.reverse();
    segments.join("/")
}
