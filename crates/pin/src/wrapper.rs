//! Placeholder node that keeps the element's slot in flow while it is pinned.

use anyhow::{Context as _, Result};
use pin_dom::HostDom;

/// Class carried by every placeholder node.
pub const WRAPPER_CLASS: &str = "pin-wrapper";

/// The placeholder around `element`, if it is currently wrapped.
pub fn wrapper_of<D: HostDom + ?Sized>(dom: &D, element: D::Node) -> Option<D::Node> {
    dom.parent(element)
        .filter(|&parent| dom.has_class(parent, WRAPPER_CLASS))
}

/// Wrap `element` in a new `div.pin-wrapper` at its current position.
///
/// # Errors
/// Fails when `element` is detached or the host rejects the tree mutation.
pub fn wrap<D: HostDom + ?Sized>(dom: &mut D, element: D::Node) -> Result<D::Node> {
    let parent = dom
        .parent(element)
        .with_context(|| format!("cannot wrap detached element {element:?}"))?;
    let wrapper = dom.create_element("div");
    dom.add_class(wrapper, WRAPPER_CLASS);
    dom.insert_before(parent, wrapper, Some(element))?;
    dom.remove_child(parent, element)?;
    dom.append_child(wrapper, element)?;
    Ok(wrapper)
}

/// Move every child of `wrapper` in front of it, then detach it.
///
/// # Errors
/// Fails when `wrapper` is detached or the host rejects the tree mutation.
pub fn unwrap<D: HostDom + ?Sized>(dom: &mut D, wrapper: D::Node) -> Result<()> {
    let parent = dom
        .parent(wrapper)
        .with_context(|| format!("cannot unwrap detached wrapper {wrapper:?}"))?;
    for child in dom.children(wrapper) {
        dom.insert_before(parent, child, Some(wrapper))?;
    }
    dom.remove_child(parent, wrapper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pin_dom::{ElementData, MemoryDom};

    #[test]
    fn wrap_then_unwrap_restores_order() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let before = dom.insert(body, ElementData::new("header")).unwrap();
        let element = dom.insert(body, ElementData::new("aside")).unwrap();
        let after = dom.insert(body, ElementData::new("footer")).unwrap();

        let wrapper = wrap(&mut dom, element).unwrap();
        assert_eq!(dom.children(body), vec![before, wrapper, after]);
        assert_eq!(dom.children(wrapper), vec![element]);
        assert_eq!(wrapper_of(&dom, element), Some(wrapper));

        unwrap(&mut dom, wrapper).unwrap();
        assert_eq!(dom.children(body), vec![before, element, after]);
        assert_eq!(wrapper_of(&dom, element), None);
        assert_eq!(dom.parent(wrapper), None);
    }

    #[test]
    fn detached_elements_cannot_be_wrapped() {
        let mut dom = MemoryDom::new();
        let loose = dom.create_element("aside");
        assert!(wrap(&mut dom, loose).is_err());
    }
}
