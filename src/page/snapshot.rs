use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{BoundingBox, NodeId, PageQuery, Selector};

/// Error type for loading page snapshots
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("could not read page snapshot {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse page snapshot: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// A captured page: its location plus the element tree as rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default)]
    pub location: String,
    pub root: ElementSpec,
}

/// One element of a captured page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementSpec {
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub attrs: IndexMap<String, String>,
    /// Text directly inside this element (before its children)
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub rect: BoundingBox,
    #[serde(default)]
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        ElementSpec {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_rect(mut self, top: f64, left: f64, width: f64, height: f64) -> Self {
        self.rect = BoundingBox {
            top,
            left,
            width,
            height,
        };
        self
    }

    pub fn with_child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = ElementSpec>) -> Self {
        self.children.extend(children);
        self
    }
}

#[derive(Debug)]
struct Node {
    tag: String,
    attrs: IndexMap<String, String>,
    text: Option<String>,
    rect: BoundingBox,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory page built from a snapshot.
///
/// Nodes are stored in document (pre-)order, so `NodeId` order is document order.
#[derive(Debug)]
pub struct Page {
    nodes: Vec<Node>,
    location: String,
}

impl Page {
    pub fn from_snapshot(snapshot: PageSnapshot) -> Self {
        let mut nodes = Vec::new();
        push_element(&mut nodes, snapshot.root, None);
        Page {
            nodes,
            location: snapshot.location,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: PageSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Read and parse a snapshot file.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let text = fs::read_to_string(path).map_err(|e| SnapshotError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&text)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node behind a handle; `None` for a handle issued by a larger page.
    fn node(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node.0)
    }

    pub fn tag(&self, node: NodeId) -> &str {
        self.node(node).map_or("", |n| n.tag.as_str())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    /// Topmost element under the point: the last one in document order whose box contains it.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, n)| n.rect.contains(x, y))
            .map(|(i, _)| NodeId(i))
    }

    /// Element whose `id` attribute equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.attrs.get("id").is_some_and(|v| v == id))
            .map(NodeId)
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.node(node) else {
            return;
        };
        if let Some(ref text) = n.text {
            out.push_str(text);
        }
        for &child in &n.children {
            self.collect_text(child, out);
        }
    }
}

fn push_element(nodes: &mut Vec<Node>, spec: ElementSpec, parent: Option<NodeId>) -> NodeId {
    let id = NodeId(nodes.len());
    nodes.push(Node {
        tag: spec.tag,
        attrs: spec.attrs,
        text: spec.text,
        rect: spec.rect,
        parent,
        children: Vec::with_capacity(spec.children.len()),
    });
    for child in spec.children {
        let child_id = push_element(nodes, child, Some(id));
        nodes[id.0].children.push(child_id);
    }
    id
}

impl PageQuery for Page {
    fn find_by_attribute(&self, name: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.attrs.contains_key(name))
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    fn find_by_role(&self, role: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.attrs.get("role").is_some_and(|r| r == role))
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    fn bounding_box(&self, node: NodeId) -> BoundingBox {
        self.node(node).map(|n| n.rect).unwrap_or_default()
    }

    fn closest_ancestor(&self, node: NodeId, selector: &Selector<'_>) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(n) = current {
            if selector.matches(self, n) {
                return Some(n);
            }
            current = self.parent(n);
        }
        None
    }

    fn ordinal_index_in_parent(&self, node: NodeId) -> usize {
        self.parent(node)
            .and_then(|parent| self.node(parent))
            .and_then(|parent| parent.children.iter().position(|&c| c == node))
            .unwrap_or(0)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)?.attrs.get(name).map(|s| s.as_str())
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn location(&self) -> &str {
        &self.location
    }
}
