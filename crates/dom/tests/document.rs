//! `MemoryDom` driven purely through the `HostDom` surface.

#![allow(
    clippy::unwrap_used,
    clippy::tests_outside_test_module,
    clippy::let_underscore_must_use,
    clippy::assertions_on_result_states,
    clippy::float_cmp,
    reason = "integration tests compare exact layout values and fail loudly"
)]

use pin_dom::{
    BoxEdges, Edges, ElementData, EventKind, EventTarget, HostDom, MemoryDom, Point, Position,
    Rect, StyleProperty, StyleValue, closest, parse_selector_list,
};

/// Generic helper: only sees the trait.
fn ancestor_tags<D: HostDom>(dom: &D, node: D::Node) -> Vec<String> {
    let mut tags = Vec::new();
    let mut current = dom.parent(node);
    while let Some(ancestor) = current {
        tags.push(dom.tag_name(ancestor).to_owned());
        current = dom.parent(ancestor);
    }
    tags
}

#[test]
fn trait_surface_reflects_tree_and_geometry() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut dom = MemoryDom::new();
    let body = dom.body();
    dom.set_client_origin(Point::new(2.0, 2.0));
    let article = dom
        .insert(
            body,
            ElementData::new("article")
                .with_id("post")
                .with_attr("data-kind", "long")
                .with_flow(Rect::new(10.0, 100.0, 600.0, 2000.0))
                .with_edges(BoxEdges {
                    border: Edges::uniform(1.0),
                    padding: Edges {
                        top: 20.0,
                        right: 0.0,
                        bottom: 20.0,
                        left: 0.0,
                    },
                }),
        )
        .unwrap();
    let aside = dom
        .insert(
            article,
            ElementData::new("aside").with_flow(Rect::new(410.0, 120.0, 200.0, 300.0)),
        )
        .unwrap();

    assert_eq!(ancestor_tags(&dom, aside), ["article", "body", "html"]);
    assert_eq!(dom.attr(article, "data-kind").as_deref(), Some("long"));
    assert_eq!(dom.attr(article, "id").as_deref(), Some("post"));
    assert_eq!(dom.attr(article, "class"), None);
    dom.add_class(article, "wide");
    dom.add_class(article, "dark");
    assert_eq!(dom.attr(article, "class").as_deref(), Some("wide dark"));

    dom.scroll_to(500.0);
    assert_eq!(dom.bounding_client_rect(aside).y, -380.0);
    // offset = client rect + page offset - client origin
    assert_eq!(dom.offset(aside), Point::new(408.0, 118.0));
    assert_eq!(dom.content_height(article), 1958.0);

    let selector = parse_selector_list("main, article[data-kind=long][class~=dark]").unwrap();
    assert_eq!(closest(&dom, aside, &selector), Some(article));
}

#[test]
fn wrapping_round_trip_through_trait() {
    let mut dom = MemoryDom::new();
    let body = dom.body();
    let aside = dom
        .insert(body, ElementData::new("aside").with_flow(Rect::new(0.0, 50.0, 100.0, 40.0)))
        .unwrap();

    let wrapper = dom.create_element("div");
    dom.insert_before(body, wrapper, Some(aside)).unwrap();
    dom.remove_child(body, aside).unwrap();
    dom.append_child(wrapper, aside).unwrap();
    assert_eq!(dom.children(body), vec![wrapper]);
    assert_eq!(dom.offset(wrapper).y, 50.0);

    dom.set_style(aside, StyleProperty::Position, StyleValue::Position(Position::Fixed));
    dom.set_style(aside, StyleProperty::Top, StyleValue::Px(0.0));
    dom.set_style(wrapper, StyleProperty::Height, StyleValue::Px(40.0));
    dom.scroll_to(200.0);
    assert_eq!(dom.offset(aside).y, 200.0);
    assert_eq!(dom.offset(wrapper).y, 50.0);
    assert_eq!(dom.offset_height(wrapper), 40.0);

    // Removing a node from the wrong parent is an error, not a panic.
    assert!(dom.remove_child(wrapper, body).is_err());
}

#[test]
fn listeners_are_tracked_per_target() {
    let mut dom = MemoryDom::new();
    let body = dom.body();
    let image = dom.insert(body, ElementData::new("img")).unwrap();

    let scroll = dom.add_event_listener(EventTarget::Window, EventKind::Scroll);
    let load = dom.add_event_listener(EventTarget::Node(image), EventKind::Load);
    assert_ne!(scroll, load);
    assert_eq!(dom.descendants_with_tag(body, "IMG"), vec![image]);
    assert!(dom.has_listener(EventTarget::Node(image), EventKind::Load));
    assert!(!dom.has_listener(EventTarget::Window, EventKind::Load));

    dom.remove_event_listener(load);
    dom.remove_event_listener(load);
    assert_eq!(dom.listener_count(), 1);
}
