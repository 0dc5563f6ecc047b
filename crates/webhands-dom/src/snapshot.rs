//! Traversal, classification and indexing of a captured page.

use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

use webhands_protocols::dom::{DomState, InteractiveElement, PageMetrics};
use webhands_protocols::page::{ElementFingerprint, Locator};

use crate::classify::{interactive_reason, is_ignored};
use crate::path::{css_path, xpath};
use crate::raw::{RawSnapshot, RootKind};
use crate::serialize::serialize_elements;

/// Knobs of the snapshot engine.
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    /// Only index elements at least partially inside the viewport.
    pub viewport_only: bool,

    /// Draw the overlay before taking the screenshot.
    pub highlight: bool,

    pub screenshot: bool,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            viewport_only: false,
            highlight: true,
            screenshot: true,
        }
    }
}

impl SnapshotOptions {
    pub fn with_viewport_only(mut self, viewport_only: bool) -> Self {
        self.viewport_only = viewport_only;
        self
    }

    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    pub fn with_screenshot(mut self, screenshot: bool) -> Self {
        self.screenshot = screenshot;
        self
    }
}

/// An indexed element together with the capture node it came from.
#[derive(Debug, Clone)]
pub struct IndexedElement {
    pub node: usize,
    pub element: InteractiveElement,
}

#[derive(Clone, Default)]
struct RootContext {
    frame: Option<Locator>,
    shadow_host: Option<String>,
}

struct Candidate {
    node: usize,
    reason: String,
    ctx: RootContext,
}

struct Walker<'a> {
    snap: &'a RawSnapshot,
    visited: HashSet<usize>,
    out: Vec<Candidate>,
}

impl<'a> Walker<'a> {
    fn walk_root(&mut self, root: usize, ctx: &RootContext) {
        let snap = self.snap;
        for id in snap.preorder(root) {
            if !self.visited.insert(id) {
                continue;
            }
            let Some(node) = snap.node(id) else {
                continue;
            };

            // shadow content precedes its host
            if let Some(shadow) = node.shadow_root {
                let shadow_ctx = RootContext {
                    frame: ctx.frame.clone(),
                    shadow_host: Some(css_path(snap, node)),
                };
                self.walk_root(shadow, &shadow_ctx);
            }

            if is_ignored(node) {
                continue;
            }
            if let Some(reason) = interactive_reason(node) {
                self.out.push(Candidate {
                    node: id,
                    reason,
                    ctx: ctx.clone(),
                });
            }
        }
    }

    fn walk_frames(&mut self) {
        let snap = self.snap;
        for id in snap.preorder(0) {
            let Some(node) = snap.node(id) else {
                continue;
            };
            if node.tag != "iframe" {
                continue;
            }
            match node.frame_root {
                Some(frame_root) => {
                    let ctx = RootContext {
                        frame: Some(Locator::xpath(xpath(snap, node))),
                        shadow_host: None,
                    };
                    self.walk_root(frame_root, &ctx);
                }
                None if node.cross_origin => {
                    warn!(
                        "Skipping cross-origin iframe {}",
                        node.attr("src").unwrap_or("<no src>")
                    );
                }
                None => {}
            }
        }
    }
}

/// Classify and index every interactive element of a capture.
pub fn index_elements(snap: &RawSnapshot, options: &SnapshotOptions) -> Vec<IndexedElement> {
    let mut walker = Walker {
        snap,
        visited: HashSet::new(),
        out: Vec::new(),
    };
    walker.walk_root(0, &RootContext::default());
    walker.walk_frames();

    let viewport_width = snap.metrics.viewport_width;
    let viewport_height = snap.metrics.viewport_height;
    let mut next_index = 1u32;
    let mut indexed = Vec::new();

    for candidate in walker.out {
        let Some(node) = snap.node(candidate.node) else {
            continue;
        };
        if options.viewport_only && !node.rect.is_partially_visible(viewport_width, viewport_height)
        {
            continue;
        }

        let text = match (node.tag.as_str(), &node.label) {
            ("input", Some(label)) if !label.is_empty() => label.clone(),
            _ => node.text.clone(),
        };

        let element = InteractiveElement {
            highlight_index: next_index,
            tag: node.tag.clone(),
            attributes: node.attrs.clone(),
            text,
            rect: node.rect,
            reason: candidate.reason,
            css_path: css_path(snap, node),
            xpath: xpath(snap, node),
            is_under_shadow_root: snap.root_kind(node) == RootKind::Shadow,
            shadow_host: candidate.ctx.shadow_host,
            frame: candidate.ctx.frame,
            fingerprint: ElementFingerprint::new(node.attr("id"), &node.text),
        };
        indexed.push(IndexedElement {
            node: candidate.node,
            element,
        });
        next_index += 1;
    }

    debug!("Indexed {} interactive elements", indexed.len());
    indexed
}

/// Build the model-facing state of a capture, without the screenshot.
pub fn build_dom_state(snap: &RawSnapshot, options: &SnapshotOptions) -> DomState {
    let indexed = index_elements(snap, options);
    let dom_text = serialize_elements(snap, &indexed);

    let elements: BTreeMap<u32, InteractiveElement> = indexed
        .into_iter()
        .map(|i| (i.element.highlight_index, i.element))
        .collect();

    DomState {
        elements,
        dom_text,
        metrics: PageMetrics::from(&snap.metrics),
        screenshot: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::fixture::{At, Fixture};

    #[test]
    fn test_indices_are_one_based_in_document_order() {
        let mut fx = Fixture::new();
        let body = fx.skeleton(0);
        let nav = fx.el(At::Node(body), "nav", &[]);
        fx.el(At::Node(nav), "a", &[("href", "/home")]);
        fx.el(At::Node(body), "p", &[]);
        fx.el(At::Node(body), "button", &[]);
        fx.el(At::Node(body), "div", &[("role", "checkbox")]);

        let indexed = index_elements(&fx.snap, &SnapshotOptions::default());
        let summary: Vec<(u32, &str)> = indexed
            .iter()
            .map(|i| (i.element.highlight_index, i.element.tag.as_str()))
            .collect();
        assert_eq!(summary, vec![(1, "a"), (2, "button"), (3, "div")]);
        assert_eq!(indexed[2].element.reason, "Interactive role: checkbox");
    }

    #[test]
    fn test_ignored_elements_are_skipped() {
        let mut fx = Fixture::new();
        let body = fx.skeleton(0);
        fx.el(At::Node(body), "button", &[("disabled", "")]);
        let hidden = fx.el(At::Node(body), "a", &[]);
        fx.node(hidden).rect.width = 0.0;
        fx.el(At::Node(body), "input", &[("type", "text")]);

        let indexed = index_elements(&fx.snap, &SnapshotOptions::default());
        assert_eq!(indexed.len(), 1);
        assert_eq!(indexed[0].element.tag, "input");
        assert_eq!(indexed[0].element.highlight_index, 1);
    }

    #[test]
    fn test_shadow_root_precedes_host() {
        let mut fx = Fixture::new();
        let body = fx.skeleton(0);
        let host = fx.el(At::Node(body), "fancy-button", &[("role", "button")]);
        let shadow = fx.shadow(host);
        fx.el(At::Root(shadow), "button", &[("class", "inner")]);
        fx.el(At::Node(body), "a", &[]);

        let indexed = index_elements(&fx.snap, &SnapshotOptions::default());
        let tags: Vec<&str> = indexed.iter().map(|i| i.element.tag.as_str()).collect();
        assert_eq!(tags, vec!["button", "fancy-button", "a"]);

        let inner = &indexed[0].element;
        assert!(inner.is_under_shadow_root);
        assert_eq!(inner.shadow_host.as_deref(), Some("html > body > fancy-button"));
        assert_eq!(inner.css_path, "html > body > fancy-button >> button");

        assert!(!indexed[1].element.is_under_shadow_root);
        assert!(indexed[1].element.shadow_host.is_none());
    }

    #[test]
    fn test_iframes_after_main_document() {
        let mut fx = Fixture::new();
        let body = fx.skeleton(0);
        let iframe = fx.el(At::Node(body), "iframe", &[("src", "/embed")]);
        let frame = fx.frame(iframe);
        let frame_body = fx.skeleton(frame);
        fx.el(At::Node(frame_body), "button", &[]);
        fx.el(At::Node(body), "a", &[]);

        let indexed = index_elements(&fx.snap, &SnapshotOptions::default());
        assert_eq!(indexed.len(), 2);
        assert_eq!(indexed[0].element.tag, "a");
        assert!(indexed[0].element.frame.is_none());

        let framed = &indexed[1].element;
        assert_eq!(framed.tag, "button");
        assert_eq!(framed.highlight_index, 2);
        assert_eq!(framed.frame, Some(Locator::xpath("html/body/iframe")));
        assert_eq!(framed.xpath, "html/body/button");
    }

    #[test]
    fn test_cross_origin_iframe_skipped() {
        let mut fx = Fixture::new();
        let body = fx.skeleton(0);
        let iframe = fx.el(At::Node(body), "iframe", &[("src", "https://ads.example")]);
        fx.node(iframe).cross_origin = true;

        assert!(index_elements(&fx.snap, &SnapshotOptions::default()).is_empty());
    }

    #[test]
    fn test_viewport_only() {
        let mut fx = Fixture::new();
        let body = fx.skeleton(0);
        fx.el(At::Node(body), "button", &[]);
        let below = fx.el(At::Node(body), "a", &[]);
        fx.node(below).rect.y = 5000.0;
        fx.el(At::Node(body), "input", &[]);

        let all = index_elements(&fx.snap, &SnapshotOptions::default());
        assert_eq!(all.len(), 3);

        let visible = index_elements(
            &fx.snap,
            &SnapshotOptions::default().with_viewport_only(true),
        );
        let summary: Vec<(u32, &str)> = visible
            .iter()
            .map(|i| (i.element.highlight_index, i.element.tag.as_str()))
            .collect();
        assert_eq!(summary, vec![(1, "button"), (2, "input")]);
    }

    #[test]
    fn test_input_prefers_label_text() {
        let mut fx = Fixture::new();
        let body = fx.skeleton(0);
        let input = fx.el(At::Node(body), "input", &[("id", "email")]);
        fx.node(input).label = Some("Email address".to_string());

        let state = build_dom_state(&fx.snap, &SnapshotOptions::default());
        assert_eq!(state.element(1).unwrap().text, "Email address");
        assert_eq!(state.dom_text, "[1]<input>Email address</input>");
        assert_eq!(
            state.element(1).unwrap().fingerprint,
            ElementFingerprint::new(Some("email"), "")
        );
    }
}
