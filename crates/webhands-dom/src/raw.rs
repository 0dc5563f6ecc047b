//! Wire format of the in-page capture script.

use serde::Deserialize;

use webhands_protocols::dom::PageMetrics;
use webhands_protocols::page::Rect;

/// Whole-page capture: every element of every reachable document and shadow
/// root, as a flat node table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSnapshot {
    #[serde(default)]
    pub metrics: RawMetrics,

    /// Root 0 is the top-level document.
    #[serde(default)]
    pub roots: Vec<RawRoot>,

    /// Indexed by [`RawNode::id`].
    #[serde(default)]
    pub nodes: Vec<RawNode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMetrics {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub viewport_width: f64,
    #[serde(default)]
    pub viewport_height: f64,
    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
    #[serde(default)]
    pub scroll_width: f64,
    #[serde(default)]
    pub scroll_height: f64,
    #[serde(default)]
    pub device_pixel_ratio: f64,
}

impl From<&RawMetrics> for PageMetrics {
    fn from(raw: &RawMetrics) -> Self {
        PageMetrics {
            url: raw.url.clone(),
            viewport_width: raw.viewport_width,
            viewport_height: raw.viewport_height,
            scroll_x: raw.scroll_x,
            scroll_y: raw.scroll_y,
            scroll_width: raw.scroll_width,
            scroll_height: raw.scroll_height,
            device_pixel_ratio: raw.device_pixel_ratio,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootKind {
    Document,
    Shadow,
}

/// A document or shadow root.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRoot {
    pub id: usize,
    pub kind: RootKind,

    /// Shadow host, or the `<iframe>` owning a nested document.
    #[serde(default)]
    pub host: Option<usize>,

    #[serde(default)]
    pub children: Vec<ChildRef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ChildRef {
    Element { e: usize },
    Text { t: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub id: usize,
    pub tag: String,

    #[serde(default)]
    pub attrs: Vec<(String, String)>,

    /// Parent element within the same root, `None` at the top of a root.
    #[serde(default)]
    pub parent: Option<usize>,

    pub root: usize,

    #[serde(default)]
    pub children: Vec<ChildRef>,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub rect: Rect,

    #[serde(default)]
    pub onclick: bool,
    #[serde(default)]
    pub editable: bool,
    #[serde(default)]
    pub draggable: bool,

    /// Text of the `<label for>` pointing at this input.
    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub shadow_root: Option<usize>,

    /// Nested document of a same-origin `<iframe>`.
    #[serde(default)]
    pub frame_root: Option<usize>,

    #[serde(default)]
    pub cross_origin: bool,
}

impl RawNode {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(k, _)| k == name)
    }

    /// Non-empty `id` attribute.
    pub fn element_id(&self) -> Option<&str> {
        self.attr("id").filter(|id| !id.trim().is_empty())
    }

    /// Class list, de-duplicated in source order.
    pub fn classes(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for class in self.attr("class").unwrap_or("").split_whitespace() {
            if !out.contains(&class) {
                out.push(class);
            }
        }
        out
    }
}

impl RawSnapshot {
    pub fn node(&self, id: usize) -> Option<&RawNode> {
        self.nodes.get(id)
    }

    pub fn root(&self, id: usize) -> Option<&RawRoot> {
        self.roots.get(id)
    }

    pub fn root_kind(&self, node: &RawNode) -> RootKind {
        self.root(node.root)
            .map(|r| r.kind)
            .unwrap_or(RootKind::Document)
    }

    /// Child list of a node's parent (or of its root when at the top).
    pub fn sibling_refs(&self, node: &RawNode) -> &[ChildRef] {
        match node.parent {
            Some(parent) => self
                .node(parent)
                .map(|p| p.children.as_slice())
                .unwrap_or(&[]),
            None => self
                .root(node.root)
                .map(|r| r.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    /// Element siblings of a node, the node itself included.
    pub fn element_siblings(&self, node: &RawNode) -> Vec<&RawNode> {
        self.sibling_refs(node)
            .iter()
            .filter_map(|c| match c {
                ChildRef::Element { e } => self.node(*e),
                ChildRef::Text { .. } => None,
            })
            .collect()
    }

    /// Elements of a root in document order, not entering shadow roots or
    /// nested documents.
    pub fn preorder(&self, root: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let Some(root) = self.root(root) else {
            return out;
        };

        let mut stack: Vec<usize> = element_ids(&root.children).rev().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            out.push(id);
            stack.extend(element_ids(&node.children).rev());
        }
        out
    }
}

fn element_ids(children: &[ChildRef]) -> impl DoubleEndedIterator<Item = usize> + '_ {
    children.iter().filter_map(|c| match c {
        ChildRef::Element { e } => Some(*e),
        ChildRef::Text { .. } => None,
    })
}
