//! Layout model of [`MemoryDom`].
//!
//! Flow boxes are supplied by the caller rather than computed. Elements
//! without one shrink-wrap their children, which is what a block wrapper
//! around a single child does in a real document. Inline `width`/`height`
//! override the flow size. Inline `left`/`top` only take effect for
//! positioned boxes:
//! - `fixed`: relative to the viewport (document offset = scroll + inset).
//! - `absolute`: relative to the border box of the offset parent.
//! - `relative`: shift from the flow position.
//!
//! Out-of-flow children still contribute their flow box to a shrink-wrapping
//! parent; callers that care about that (the pin wrapper does) pin the
//! parent's height inline.

use super::MemoryDom;
use crate::{Position, Rect, StyleProperty};
use indextree::NodeId;

impl MemoryDom {
    /// Flow box of `node` in document coordinates, before positioning.
    pub(crate) fn flow_rect(&self, node: NodeId) -> Rect {
        let Some(data) = self.data(node) else {
            return Rect::default();
        };
        let mut rect = data.flow.unwrap_or_else(|| self.shrink_wrap(node));
        if let Some(width) = data.inline(StyleProperty::Width).px() {
            rect.width = width;
        }
        if let Some(height) = data.inline(StyleProperty::Height).px() {
            rect.height = height;
        }
        rect
    }

    fn shrink_wrap(&self, node: NodeId) -> Rect {
        node.children(&self.arena)
            .map(|child| self.flow_rect(child))
            .reduce(|covered, rect| covered.union(&rect))
            .unwrap_or_default()
    }

    /// Border box of `node` in document coordinates, after positioning.
    pub(crate) fn document_rect(&self, node: NodeId) -> Rect {
        let flow = self.flow_rect(node);
        let Some(data) = self.data(node) else {
            return flow;
        };
        let left = data.inline(StyleProperty::Left).px();
        let top = data.inline(StyleProperty::Top).px();
        match data.computed_position() {
            Position::Fixed => Rect {
                x: left.map_or(flow.x, |inset| inset + self.scroll.x),
                y: top.map_or(flow.y, |inset| inset + self.scroll.y),
                ..flow
            },
            Position::Absolute => {
                let origin = self
                    .offset_parent_of(node)
                    .map(|parent| self.document_rect(parent).origin())
                    .unwrap_or_default();
                Rect {
                    x: left.map_or(flow.x, |inset| origin.x + inset),
                    y: top.map_or(flow.y, |inset| origin.y + inset),
                    ..flow
                }
            }
            Position::Relative => Rect {
                x: flow.x + left.unwrap_or_default(),
                y: flow.y + top.unwrap_or_default(),
                ..flow
            },
            Position::Static | Position::Sticky => flow,
        }
    }

    /// `offsetParent`: nearest positioned ancestor, else the body.
    pub(crate) fn offset_parent_of(&self, node: NodeId) -> Option<NodeId> {
        let data = self.data(node)?;
        if data.computed_position() == Position::Fixed || node == self.body || node == self.root {
            return None;
        }
        let mut current = self.parent_of(node);
        while let Some(ancestor) = current {
            if ancestor == self.body
                || self
                    .data(ancestor)
                    .is_some_and(|entry| entry.computed_position().is_positioned())
            {
                return Some(ancestor);
            }
            current = self.parent_of(ancestor);
        }
        None
    }
}
