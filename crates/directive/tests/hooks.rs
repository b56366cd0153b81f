#![allow(
    clippy::unwrap_used,
    clippy::tests_outside_test_module,
    clippy::let_underscore_must_use,
    clippy::assertions_on_result_states,
    clippy::float_cmp,
    reason = "integration tests compare exact layout values and fail loudly"
)]

use core::time::Duration;
use indextree::NodeId;
use pin::{Padding, PinMode, wrapper_of};
use pin_directive::{DirectiveConfig, PinDirective};
use pin_dom::{ElementData, EventKind, EventTarget, HostDom as _, MemoryDom, Rect};
use serde_json::json;
use std::time::Instant;

fn page() -> (MemoryDom, NodeId) {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut dom = MemoryDom::new();
    let body = dom.body();
    dom.data_mut(body).unwrap().flow = Some(Rect::new(0.0, 0.0, 800.0, 1000.0));
    let aside = dom
        .insert(body, ElementData::new("aside").with_flow(Rect::new(0.0, 40.0, 200.0, 100.0)))
        .unwrap();
    (dom, aside)
}

#[test]
fn registered_under_pin() {
    assert_eq!(PinDirective::<NodeId>::NAME, "pin");
}

#[test]
fn inserted_parses_binding() {
    let (mut dom, aside) = page();
    let mut directive = PinDirective::default();

    let handle = directive
        .inserted(
            &mut dom,
            aside,
            &json!({ "padding": { "top": 10, "bottom": 10 }, "activeClass": "is-pinned" }),
        )
        .unwrap();

    assert_eq!(handle.element(), aside);
    let engine = directive.registry().get(aside).unwrap();
    assert_eq!(engine.options().padding, Padding::new(10.0, 10.0));
    assert_eq!(engine.limits().unwrap().from, 30.0);

    dom.scroll_to(50.0);
    assert_eq!(
        directive.dispatch(&mut dom, EventTarget::Window, EventKind::Scroll),
        1
    );
    assert!(dom.has_class(aside, "is-pinned"));
}

#[test]
fn inserted_rejects_malformed_binding() {
    let (mut dom, aside) = page();
    let mut directive = PinDirective::default();

    assert!(
        directive
            .inserted(&mut dom, aside, &json!({ "padding": "lots" }))
            .is_err()
    );
    assert!(directive.registry().is_empty());
    assert_eq!(dom.listener_count(), 0);
}

#[test]
fn component_updates_are_deferred_and_coalesced() {
    let (mut dom, aside) = page();
    let mut directive = PinDirective::new(DirectiveConfig::new(500));
    directive.inserted(&mut dom, aside, &json!(null)).unwrap();

    let start = Instant::now();
    assert!(directive.component_updated(aside, &json!(null), start).unwrap());
    assert!(
        directive
            .component_updated(aside, &json!(null), start + Duration::from_millis(300))
            .unwrap()
    );
    assert_eq!(
        directive.next_deadline(),
        Some(start + Duration::from_millis(800))
    );

    // Content above the pin grew while the component re-rendered.
    dom.data_mut(aside).unwrap().flow = Some(Rect::new(0.0, 240.0, 200.0, 100.0));
    dom.scroll_to(300.0);

    assert_eq!(directive.tick(&mut dom, start + Duration::from_millis(600)), 0);
    assert!(directive.is_pending(aside));
    assert_eq!(directive.registry().get(aside).unwrap().limits().unwrap().from, 40.0);

    assert_eq!(directive.tick(&mut dom, start + Duration::from_millis(800)), 1);
    assert!(!directive.is_pending(aside));
    let engine = directive.registry().get(aside).unwrap();
    assert_eq!(engine.limits().unwrap().from, 240.0);
    assert_eq!(engine.mode(&dom), PinMode::Fixed);

    assert_eq!(directive.tick(&mut dom, start + Duration::from_secs(5)), 0);
}

#[test]
fn zero_delay_runs_on_next_tick() {
    let (mut dom, aside) = page();
    let mut directive = PinDirective::new(DirectiveConfig::new(0));
    directive.inserted(&mut dom, aside, &json!({})).unwrap();

    let now = Instant::now();
    directive.component_updated(aside, &json!({}), now).unwrap();
    assert_eq!(directive.tick(&mut dom, now), 1);
}

#[test]
fn updates_for_unknown_elements_are_ignored() {
    let (mut dom, aside) = page();
    let mut directive = PinDirective::default();

    assert!(
        !directive
            .component_updated(aside, &json!({}), Instant::now())
            .unwrap()
    );
    assert_eq!(directive.next_deadline(), None);
    assert_eq!(directive.tick(&mut dom, Instant::now()), 0);
}

#[test]
fn unbind_cancels_pending_and_disposes() {
    let (mut dom, aside) = page();
    let mut directive = PinDirective::default();
    directive.inserted(&mut dom, aside, &json!({})).unwrap();

    let now = Instant::now();
    directive.component_updated(aside, &json!({}), now).unwrap();
    assert!(directive.unbind(&mut dom, aside).unwrap());

    assert!(!directive.is_pending(aside));
    assert!(directive.registry().is_empty());
    assert_eq!(dom.listener_count(), 0);
    assert_eq!(wrapper_of(&dom, aside), None);
    assert_eq!(directive.tick(&mut dom, now + Duration::from_secs(1)), 0);
    assert!(!directive.unbind(&mut dom, aside).unwrap());
}

#[test]
fn updated_binding_reaches_the_engine() {
    let (mut dom, aside) = page();
    let mut directive = PinDirective::new(DirectiveConfig::new(0));
    directive.inserted(&mut dom, aside, &json!({})).unwrap();

    let now = Instant::now();
    let binding = json!({ "activeClass": "is-pinned", "padding": { "top": 10, "bottom": 10 } });
    assert!(directive.component_updated(aside, &binding, now).unwrap());
    assert_eq!(directive.tick(&mut dom, now), 1);

    let engine = directive.registry().get(aside).unwrap();
    assert_eq!(engine.options().active(), Some("is-pinned"));
    assert_eq!(engine.limits().unwrap().from, 30.0);
    assert_eq!(directive.registry().len(), 1);
    assert_eq!(dom.listener_count(), 3);

    dom.scroll_to(50.0);
    directive.dispatch(&mut dom, EventTarget::Window, EventKind::Scroll);
    assert!(dom.has_class(aside, "is-pinned"));
}

#[test]
fn corrected_selector_pins_after_update() {
    let (mut dom, aside) = page();
    let body = dom.body();
    dom.data_mut(body).unwrap().classes.push("page".to_owned());
    let mut directive = PinDirective::new(DirectiveConfig::new(0));

    directive
        .inserted(&mut dom, aside, &json!({ "containerSelector": "body:not(.x)" }))
        .unwrap();
    assert!(directive.registry().get(aside).unwrap().limits().is_none());
    assert_eq!(wrapper_of(&dom, aside), None);

    let now = Instant::now();
    directive
        .component_updated(aside, &json!({ "containerSelector": "body.page" }), now)
        .unwrap();
    directive.tick(&mut dom, now);

    dom.scroll_to(50.0);
    directive.dispatch(&mut dom, EventTarget::Window, EventKind::Scroll);
    assert_eq!(
        directive.registry().get(aside).unwrap().mode(&dom),
        PinMode::Fixed
    );
}

#[test]
fn malformed_updated_binding_schedules_nothing() {
    let (mut dom, aside) = page();
    let mut directive = PinDirective::default();
    directive.inserted(&mut dom, aside, &json!({})).unwrap();

    let result = directive.component_updated(aside, &json!({ "minWidth": "wide" }), Instant::now());
    assert!(result.is_err());
    assert!(!directive.is_pending(aside));
}

#[test]
fn from_env_uses_environment_config() {
    let directive = PinDirective::<NodeId>::from_env();
    assert_eq!(directive.config(), &DirectiveConfig::from_env());
}
