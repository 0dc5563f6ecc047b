//! Interactivity predicate.

use crate::raw::RawNode;

pub const INTERACTIVE_TAGS: &[&str] = &[
    "a", "input", "button", "select", "menu", "menuitem", "textarea", "canvas", "embed",
];

pub const INTERACTIVE_ROLES: &[&str] = &[
    "button",
    "link",
    "checkbox",
    "radio",
    "textbox",
    "menuitem",
    "tab",
    "tabpanel",
    "tooltip",
    "slider",
    "progressbar",
    "switch",
    "listbox",
    "option",
    "combobox",
    "menu",
    "treeitem",
    "tree",
    "spinbutton",
    "scrollbar",
    "menuitemcheckbox",
    "menuitemradio",
    "action",
];

pub const CLICK_ATTRIBUTES: &[&str] = &["onclick", "ng-click", "@click", "v-on:click"];

pub const INTERACTIVE_ARIA_PROPS: &[&str] = &[
    "aria-expanded",
    "aria-pressed",
    "aria-selected",
    "aria-checked",
];

/// Attributes kept in the text view.
pub const CONTEXT_ATTRIBUTES: &[&str] = &[
    "title",
    "type",
    "name",
    "role",
    "aria-label",
    "placeholder",
    "value",
    "alt",
    "aria-expanded",
];

/// Set by the listener tracker init script.
pub const LISTENER_MARKER: &str = "data-has-interactive-listener";

/// Reason the element is interactive, or `None` if it is not.
///
/// Rules are checked in priority order; the first match wins.
pub fn interactive_reason(node: &RawNode) -> Option<String> {
    let tag = node.tag.as_str();
    if INTERACTIVE_TAGS.contains(&tag) {
        return Some(format!("Interactive HTML element: <{}>", tag));
    }
    if let Some(role) = node.attr("role").filter(|r| INTERACTIVE_ROLES.contains(r)) {
        return Some(format!("Interactive role: {}", role));
    }
    if let Some(role) = node
        .attr("aria-role")
        .filter(|r| INTERACTIVE_ROLES.contains(r))
    {
        return Some(format!("Interactive aria-role: {}", role));
    }

    if node.onclick || CLICK_ATTRIBUTES.iter().any(|a| node.has_attr(a)) {
        return Some("Has click handler".to_string());
    }

    if node.has_attr(LISTENER_MARKER) {
        return Some("Has interactive event listener (tracked)".to_string());
    }

    let aria: Vec<&str> = INTERACTIVE_ARIA_PROPS
        .iter()
        .copied()
        .filter(|p| node.has_attr(p))
        .collect();
    if !aria.is_empty() {
        return Some(format!("Has interactive ARIA properties: {}", aria.join(", ")));
    }

    if node.editable || node.attr("contenteditable") == Some("true") {
        return Some("Is content editable".to_string());
    }

    if node.draggable || node.attr("draggable") == Some("true") {
        return Some("Is draggable".to_string());
    }

    None
}

/// Elements never indexed regardless of interactivity.
pub fn is_ignored(node: &RawNode) -> bool {
    node.tag == "html"
        || node.tag == "body"
        || node.rect.width == 0.0
        || node.rect.height == 0.0
        || node.has_attr("disabled")
        || node.attr("aria-disabled") == Some("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::fixture::{At, Fixture};

    fn reason(tag: &str, attrs: &[(&str, &str)]) -> Option<String> {
        let mut fx = Fixture::new();
        let id = fx.el(At::Root(0), tag, attrs);
        interactive_reason(&fx.snap.nodes[id])
    }

    #[test]
    fn test_interactive_tags() {
        assert_eq!(
            reason("button", &[]).as_deref(),
            Some("Interactive HTML element: <button>")
        );
        assert_eq!(
            reason("canvas", &[]).as_deref(),
            Some("Interactive HTML element: <canvas>")
        );
        assert!(reason("div", &[]).is_none());
        assert!(reason("span", &[("class", "btn")]).is_none());
    }

    #[test]
    fn test_tag_wins_over_role() {
        assert_eq!(
            reason("a", &[("role", "button")]).as_deref(),
            Some("Interactive HTML element: <a>")
        );
    }

    #[test]
    fn test_roles() {
        assert_eq!(
            reason("div", &[("role", "tab")]).as_deref(),
            Some("Interactive role: tab")
        );
        assert_eq!(
            reason("div", &[("aria-role", "slider")]).as_deref(),
            Some("Interactive aria-role: slider")
        );
        assert!(reason("div", &[("role", "presentation")]).is_none());
    }

    #[test]
    fn test_click_handlers() {
        for attr in CLICK_ATTRIBUTES {
            assert_eq!(
                reason("div", &[(*attr, "go()")]).as_deref(),
                Some("Has click handler")
            );
        }

        let mut fx = Fixture::new();
        let id = fx.el(At::Root(0), "div", &[]);
        fx.node(id).onclick = true;
        assert_eq!(
            interactive_reason(&fx.snap.nodes[id]).as_deref(),
            Some("Has click handler")
        );
    }

    #[test]
    fn test_tracked_listener() {
        assert_eq!(
            reason("div", &[(LISTENER_MARKER, "true")]).as_deref(),
            Some("Has interactive event listener (tracked)")
        );
    }

    #[test]
    fn test_aria_props_listed_in_order() {
        assert_eq!(
            reason("li", &[("aria-selected", "false"), ("aria-expanded", "true")]).as_deref(),
            Some("Has interactive ARIA properties: aria-expanded, aria-selected")
        );
    }

    #[test]
    fn test_editable_and_draggable() {
        assert_eq!(
            reason("div", &[("contenteditable", "true")]).as_deref(),
            Some("Is content editable")
        );
        assert_eq!(
            reason("div", &[("draggable", "true")]).as_deref(),
            Some("Is draggable")
        );

        let mut fx = Fixture::new();
        let id = fx.el(At::Root(0), "img", &[]);
        fx.node(id).draggable = true;
        assert_eq!(
            interactive_reason(&fx.snap.nodes[id]).as_deref(),
            Some("Is draggable")
        );
    }

    #[test]
    fn test_ignored() {
        let mut fx = Fixture::new();
        let html = fx.el(At::Root(0), "html", &[]);
        let body = fx.el(At::Node(html), "body", &[]);
        let disabled = fx.el(At::Node(body), "button", &[("disabled", "")]);
        let aria_disabled = fx.el(At::Node(body), "button", &[("aria-disabled", "true")]);
        let aria_enabled = fx.el(At::Node(body), "button", &[("aria-disabled", "false")]);
        let zero = fx.el(At::Node(body), "button", &[]);
        fx.node(zero).rect.height = 0.0;

        assert!(is_ignored(&fx.snap.nodes[html]));
        assert!(is_ignored(&fx.snap.nodes[body]));
        assert!(is_ignored(&fx.snap.nodes[disabled]));
        assert!(is_ignored(&fx.snap.nodes[aria_disabled]));
        assert!(!is_ignored(&fx.snap.nodes[aria_enabled]));
        assert!(is_ignored(&fx.snap.nodes[zero]));
    }
}
