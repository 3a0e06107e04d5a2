//! The read-only view of a rendered calendar page that recognition works against.
//!
//! Recognition never touches rendering directly; everything it knows about
//! the page comes through [`PageQuery`]. Positions are re-read on every call
//! because the layout may have scrolled or changed between interactions.

pub mod snapshot;

pub use snapshot::{ElementSpec, Page, PageSnapshot, SnapshotError};

use serde::{Deserialize, Serialize};

/// Opaque handle to an element of a page. Handles order by document position.
///
/// A handle is scoped to the page that issued it. Queries with a handle the
/// page does not know answer as for a bare, empty element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Viewport-relative box of a rendered element, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.left + self.width && y >= self.top && y < self.top + self.height
    }
}

/// Element matcher for [`PageQuery::closest_ancestor`].
#[derive(Debug, Clone, Copy)]
pub enum Selector<'a> {
    /// `[role="..."]`
    Role(&'a str),
    /// `[name]`
    HasAttribute(&'a str),
    /// `[name="value"]`
    AttributeEquals(&'a str, &'a str),
    /// Any of the listed selectors
    AnyOf(&'a [Selector<'a>]),
}

impl Selector<'_> {
    pub fn matches(&self, page: &dyn PageQuery, node: NodeId) -> bool {
        match *self {
            Selector::Role(role) => page.attribute(node, "role") == Some(role),
            Selector::HasAttribute(name) => page.attribute(node, name).is_some(),
            Selector::AttributeEquals(name, value) => page.attribute(node, name) == Some(value),
            Selector::AnyOf(selectors) => selectors.iter().any(|s| s.matches(page, node)),
        }
    }
}

/// Query capability over a rendered page.
///
/// Element lists are returned in document order.
pub trait PageQuery {
    /// All elements carrying the attribute `name`
    fn find_by_attribute(&self, name: &str) -> Vec<NodeId>;

    /// All elements whose `role` attribute equals `role`
    fn find_by_role(&self, role: &str) -> Vec<NodeId>;

    fn bounding_box(&self, node: NodeId) -> BoundingBox;

    /// Nearest element matching `selector`, starting with `node` itself
    fn closest_ancestor(&self, node: NodeId, selector: &Selector<'_>) -> Option<NodeId>;

    /// Position of `node` among its parent's children (0 for the root)
    fn ordinal_index_in_parent(&self, node: NodeId) -> usize;

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    /// Concatenated text of the element and its descendants
    fn text_content(&self, node: NodeId) -> String;

    /// Current navigable location of the page (its URL)
    fn location(&self) -> &str;
}
