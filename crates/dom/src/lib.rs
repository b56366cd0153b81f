//! Host DOM capability surface for the pin engine.
//!
//! The engine never touches a concrete document. Everything it needs, from
//! geometry queries to tree mutation and listener registration, goes through
//! [`HostDom`]. [`MemoryDom`] is an in-memory implementation with a small
//! layout model, used for headless embedding and for tests.

#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::assertions_on_result_states,
        clippy::float_cmp,
        reason = "tests compare exact layout values and fail loudly"
    )
)]

use anyhow::Result;
use core::fmt::Debug;
use core::hash::Hash;
use std::borrow::Cow;

pub mod events;
pub mod geometry;
pub mod memory;
pub mod selector;
pub mod style;

pub use events::{EventKind, EventTarget, ListenerId};
pub use geometry::{BoxEdges, Edges, Point, Rect};
pub use memory::{ElementData, MemoryDom};
pub use selector::{
    AttrMatcher, AttrOperator, SelectorList, closest, matches_selector_list, parse_selector_list,
};
pub use style::{Position, StyleProperty, StyleValue};

/// Everything the pin engine asks of the page it runs in.
///
/// Queries take `&self` and have no side effects. Mutations that can fail on
/// an invalid tree operation return `anyhow::Result`; the rest are
/// infallible from the caller's point of view.
pub trait HostDom {
    /// Stable identity of a node.
    type Node: Copy + Eq + Hash + Debug;

    // ---- tree queries ----

    /// The document body, the default bounding container.
    fn body(&self) -> Self::Node;

    /// Parent node, `None` for the root and for detached nodes.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Child nodes in document order.
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Previous element sibling.
    fn previous_sibling_element(&self, node: Self::Node) -> Option<Self::Node>;

    /// Tag name in ASCII lowercase.
    fn tag_name(&self, node: Self::Node) -> &str;

    /// Value of the `id` attribute.
    fn element_id(&self, node: Self::Node) -> Option<&str>;

    /// Whether `class` is one of the node's class tokens.
    fn has_class(&self, node: Self::Node, class: &str) -> bool;

    /// Attribute value, if present. `class` reflects the class tokens
    /// joined by single spaces.
    fn attr(&self, node: Self::Node, name: &str) -> Option<Cow<'_, str>>;

    /// Descendants (excluding `node`) with the given lowercase tag, in document order.
    fn descendants_with_tag(&self, node: Self::Node, tag: &str) -> Vec<Self::Node>;

    // ---- geometry queries ----

    /// Border box relative to the viewport (`getBoundingClientRect`).
    fn bounding_client_rect(&self, node: Self::Node) -> Rect;

    /// Computed border and padding widths.
    fn box_edges(&self, node: Self::Node) -> BoxEdges;

    /// `clientWidth`: padding box width.
    fn client_width(&self, node: Self::Node) -> f64;

    /// `clientHeight`: padding box height.
    fn client_height(&self, node: Self::Node) -> f64;

    /// `offsetHeight`: border box height.
    fn offset_height(&self, node: Self::Node) -> f64;

    /// Nearest positioned ancestor (`offsetParent`). `None` for fixed boxes,
    /// the body and detached nodes.
    fn offset_parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Computed `position`.
    fn computed_position(&self, node: Self::Node) -> Position;

    /// Current inline declaration for `property`.
    fn inline_style(&self, node: Self::Node, property: StyleProperty) -> StyleValue;

    /// `window.pageXOffset` / `window.pageYOffset`.
    fn page_offset(&self) -> Point;

    /// `documentElement.clientLeft` / `documentElement.clientTop`.
    fn client_origin(&self) -> Point;

    /// Vertical scroll offset of the document.
    fn scroll_top(&self) -> f64;

    /// `window.innerWidth`.
    fn viewport_width(&self) -> f64;

    // ---- mutation ----

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> Self::Node;

    /// Insert `node` into `parent` before `reference`, or at the end when
    /// `reference` is `None`. An attached `node` is moved.
    fn insert_before(
        &mut self,
        parent: Self::Node,
        node: Self::Node,
        reference: Option<Self::Node>,
    ) -> Result<()>;

    /// Detach `child` from `parent`.
    fn remove_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<()>;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Assign an inline style declaration. `StyleValue::Unset` removes it.
    fn set_style(&mut self, node: Self::Node, property: StyleProperty, value: StyleValue);

    /// Add a class token.
    fn add_class(&mut self, node: Self::Node, class: &str);

    /// Remove a class token.
    fn remove_class(&mut self, node: Self::Node, class: &str);

    /// Register a listener and return its handle.
    fn add_event_listener(
        &mut self,
        target: EventTarget<Self::Node>,
        kind: EventKind,
    ) -> ListenerId;

    /// Drop a listener. Unknown handles are ignored.
    fn remove_event_listener(&mut self, listener: ListenerId);

    // ---- derived queries ----

    /// Document-relative offset of the border box.
    fn offset(&self, node: Self::Node) -> Point {
        let rect = self.bounding_client_rect(node);
        let page = self.page_offset();
        let origin = self.client_origin();
        Point::new(rect.x + page.x - origin.x, rect.y + page.y - origin.y)
    }

    /// Content box height: `offsetHeight` minus vertical borders and padding.
    fn content_height(&self, node: Self::Node) -> f64 {
        let edges = self.box_edges(node);
        self.offset_height(node) - edges.border.vertical() - edges.padding.vertical()
    }
}
