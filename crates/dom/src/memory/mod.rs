//! In-memory document implementing [`HostDom`].
//!
//! Nodes live in an `indextree` arena. Every node is an element; the arena
//! root is the `html` element and `body` is its only initial child. Geometry
//! comes from a deliberately small layout model, see [`layout`].

mod layout;

use crate::{
    BoxEdges, EventKind, EventTarget, HostDom, ListenerId, Point, Position, Rect, StyleProperty,
    StyleValue,
};
use anyhow::{Result, anyhow, bail};
use indextree::{Arena, Node as ArenaNode, NodeId};
use log::trace;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Default `window.innerWidth` of a fresh document.
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1024.0;

/// Per-element state: attributes, style sheet values and inline declarations.
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    /// Lowercase tag name.
    pub tag: String,
    pub id: Option<String>,
    pub classes: SmallVec<String, 4>,
    pub attrs: SmallVec<(String, String), 4>,
    /// Flow box in document coordinates. `None` shrink-wraps the children.
    pub flow: Option<Rect>,
    pub edges: BoxEdges,
    /// `position` from the style sheet. An inline `position` overrides it.
    pub position: Position,
    inline: SmallVec<(StyleProperty, StyleValue), 5>,
}

impl ElementData {
    /// A bare element with the given tag.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_owned());
        self
    }

    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        if !self.classes.iter().any(|existing| existing == class) {
            self.classes.push(class.to_owned());
        }
        self
    }

    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs
            .push((name.to_ascii_lowercase(), value.to_owned()));
        self
    }

    #[must_use]
    pub const fn with_flow(mut self, flow: Rect) -> Self {
        self.flow = Some(flow);
        self
    }

    #[must_use]
    pub const fn with_edges(mut self, edges: BoxEdges) -> Self {
        self.edges = edges;
        self
    }

    #[must_use]
    pub const fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Inline declaration for `property`, `Unset` if absent.
    #[must_use]
    pub fn inline(&self, property: StyleProperty) -> StyleValue {
        self.inline
            .iter()
            .find(|(candidate, _)| *candidate == property)
            .map_or(StyleValue::Unset, |&(_, value)| value)
    }

    fn set_inline(&mut self, property: StyleProperty, value: StyleValue) {
        if value.is_unset() {
            self.inline.retain(|(candidate, _)| *candidate != property);
        } else if let Some(slot) = self
            .inline
            .iter_mut()
            .find(|(candidate, _)| *candidate == property)
        {
            slot.1 = value;
        } else {
            self.inline.push((property, value));
        }
    }

    /// Inline `position` if declared, else the style sheet value.
    #[must_use]
    pub fn computed_position(&self) -> Position {
        match self.inline(StyleProperty::Position) {
            StyleValue::Position(position) => position,
            StyleValue::Unset | StyleValue::Px(_) => self.position,
        }
    }
}

/// Registered listener bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ListenerEntry {
    target: EventTarget<NodeId>,
    kind: EventKind,
}

/// An in-memory document with scroll, viewport and listener state.
#[derive(Debug)]
pub struct MemoryDom {
    arena: Arena<ElementData>,
    root: NodeId,
    body: NodeId,
    scroll: Point,
    viewport_width: f64,
    client_origin: Point,
    listeners: BTreeMap<ListenerId, ListenerEntry>,
    next_listener: u64,
}

impl MemoryDom {
    /// A document containing `html > body`, scrolled to the top.
    #[must_use]
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(ElementData::new("html"));
        let body = arena.new_node(ElementData::new("body"));
        root.append(body, &mut arena);
        Self {
            arena,
            root,
            body,
            scroll: Point::default(),
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            client_origin: Point::default(),
            listeners: BTreeMap::new(),
            next_listener: 1,
        }
    }

    /// The `html` element.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Append a new element under `parent`.
    ///
    /// # Errors
    /// Fails if `parent` is not a live node of this document.
    pub fn insert(&mut self, parent: NodeId, data: ElementData) -> Result<NodeId> {
        self.ensure_live(parent)?;
        let node = self.arena.new_node(data);
        parent
            .checked_append(node, &mut self.arena)
            .map_err(|err| anyhow!("cannot append {node:?} to {parent:?}: {err:?}"))?;
        Ok(node)
    }

    /// Element state of `node`.
    #[must_use]
    pub fn data(&self, node: NodeId) -> Option<&ElementData> {
        self.arena
            .get(node)
            .filter(|entry| !entry.is_removed())
            .map(ArenaNode::get)
    }

    /// Mutable element state of `node`.
    pub fn data_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        self.arena
            .get_mut(node)
            .filter(|entry| !entry.is_removed())
            .map(ArenaNode::get_mut)
    }

    /// Set the vertical scroll offset. Negative offsets clamp to zero.
    pub fn scroll_to(&mut self, top: f64) {
        self.scroll.y = top.max(0.0);
    }

    /// Set both scroll offsets.
    pub fn set_scroll(&mut self, scroll: Point) {
        self.scroll = Point::new(scroll.x.max(0.0), scroll.y.max(0.0));
    }

    /// Set `window.innerWidth`.
    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
    }

    /// Set `documentElement.clientLeft/clientTop`.
    pub fn set_client_origin(&mut self, origin: Point) {
        self.client_origin = origin;
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Whether any listener is registered for `(target, kind)`.
    #[must_use]
    pub fn has_listener(&self, target: EventTarget<NodeId>, kind: EventKind) -> bool {
        self.listeners
            .values()
            .any(|entry| entry.target == target && entry.kind == kind)
    }

    /// Inline declarations of `node`, sorted by property name.
    #[must_use]
    pub fn inline_styles(&self, node: NodeId) -> Vec<(StyleProperty, StyleValue)> {
        let mut styles: Vec<_> = self
            .data(node)
            .map(|data| data.inline.iter().copied().collect())
            .unwrap_or_default();
        styles.sort_by_key(|(property, _)| property.as_str());
        styles
    }

    fn ensure_live(&self, node: NodeId) -> Result<()> {
        if self.data(node).is_none() {
            bail!("node {node:?} does not belong to this document");
        }
        Ok(())
    }

    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.parent()
    }
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl HostDom for MemoryDom {
    type Node = NodeId;

    fn body(&self) -> NodeId {
        self.body
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parent_of(node)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        if self.data(node).is_none() {
            return Vec::new();
        }
        node.children(&self.arena).collect()
    }

    fn previous_sibling_element(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.previous_sibling()
    }

    fn tag_name(&self, node: NodeId) -> &str {
        self.data(node).map_or("", |data| data.tag.as_str())
    }

    fn element_id(&self, node: NodeId) -> Option<&str> {
        self.data(node)?.id.as_deref()
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.data(node)
            .is_some_and(|data| data.classes.iter().any(|existing| existing == class))
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<Cow<'_, str>> {
        let data = self.data(node)?;
        if name.eq_ignore_ascii_case("id") {
            return data.id.as_deref().map(Cow::Borrowed);
        }
        if name.eq_ignore_ascii_case("class") {
            return (!data.classes.is_empty()).then(|| Cow::Owned(data.classes.join(" ")));
        }
        data.attrs
            .iter()
            .find(|(attr_name, _)| attr_name.eq_ignore_ascii_case(name))
            .map(|(_, value)| Cow::Borrowed(value.as_str()))
    }

    fn descendants_with_tag(&self, node: NodeId, tag: &str) -> Vec<NodeId> {
        if self.data(node).is_none() {
            return Vec::new();
        }
        node.descendants(&self.arena)
            .skip(1)
            .filter(|&descendant| self.tag_name(descendant).eq_ignore_ascii_case(tag))
            .collect()
    }

    fn bounding_client_rect(&self, node: NodeId) -> Rect {
        self.document_rect(node).shifted_back(self.scroll)
    }

    fn box_edges(&self, node: NodeId) -> BoxEdges {
        self.data(node).map(|data| data.edges).unwrap_or_default()
    }

    fn client_width(&self, node: NodeId) -> f64 {
        let border = self.box_edges(node).border;
        (self.document_rect(node).width - border.horizontal()).max(0.0)
    }

    fn client_height(&self, node: NodeId) -> f64 {
        let border = self.box_edges(node).border;
        (self.document_rect(node).height - border.vertical()).max(0.0)
    }

    fn offset_height(&self, node: NodeId) -> f64 {
        self.document_rect(node).height
    }

    fn offset_parent(&self, node: NodeId) -> Option<NodeId> {
        self.offset_parent_of(node)
    }

    fn computed_position(&self, node: NodeId) -> Position {
        self.data(node)
            .map(ElementData::computed_position)
            .unwrap_or_default()
    }

    fn inline_style(&self, node: NodeId, property: StyleProperty) -> StyleValue {
        self.data(node)
            .map(|data| data.inline(property))
            .unwrap_or_default()
    }

    fn page_offset(&self) -> Point {
        self.scroll
    }

    fn client_origin(&self) -> Point {
        self.client_origin
    }

    fn scroll_top(&self) -> f64 {
        self.scroll.y
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena.new_node(ElementData::new(tag))
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        self.ensure_live(parent)?;
        self.ensure_live(node)?;
        if parent.ancestors(&self.arena).any(|ancestor| ancestor == node) {
            bail!("inserting {node:?} under {parent:?} would create a cycle");
        }
        if reference == Some(node) {
            return Ok(());
        }
        match reference {
            Some(reference) => {
                if self.parent_of(reference) != Some(parent) {
                    bail!("{reference:?} is not a child of {parent:?}");
                }
                node.detach(&mut self.arena);
                reference
                    .checked_insert_before(node, &mut self.arena)
                    .map_err(|err| {
                        anyhow!("cannot insert {node:?} before {reference:?}: {err:?}")
                    })?;
            }
            None => {
                node.detach(&mut self.arena);
                parent
                    .checked_append(node, &mut self.arena)
                    .map_err(|err| anyhow!("cannot append {node:?} to {parent:?}: {err:?}"))?;
            }
        }
        Ok(())
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.parent_of(child) != Some(parent) {
            bail!("{child:?} is not a child of {parent:?}");
        }
        child.detach(&mut self.arena);
        Ok(())
    }

    fn set_style(&mut self, node: NodeId, property: StyleProperty, value: StyleValue) {
        if let Some(data) = self.data_mut(node) {
            data.set_inline(property, value);
        }
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(data) = self.data_mut(node)
            && !data.classes.iter().any(|existing| existing == class)
        {
            data.classes.push(class.to_owned());
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(data) = self.data_mut(node) {
            data.classes.retain(|existing| existing.as_str() != class);
        }
    }

    fn add_event_listener(&mut self, target: EventTarget<NodeId>, kind: EventKind) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener = self.next_listener.saturating_add(1);
        self.listeners.insert(id, ListenerEntry { target, kind });
        trace!(target: "pin_dom", "listener {id:?} added for {kind} on {target:?}");
        id
    }

    fn remove_event_listener(&mut self, listener: ListenerId) {
        if self.listeners.remove(&listener).is_some() {
            trace!(target: "pin_dom", "listener {listener:?} removed");
        }
    }
}
