#![allow(clippy::unwrap_used, reason = "benchmark setup fails loudly")]

use criterion::{Criterion, criterion_group, criterion_main};
use indextree::NodeId;
use pin::{Padding, PinEngine, PinOptions};
use pin_dom::{ElementData, HostDom as _, MemoryDom, Rect};
use std::hint::black_box;

/// A long page with a pinned aside inside a tall `.layout` container.
fn build_page() -> (MemoryDom, PinEngine<NodeId>) {
    let mut dom = MemoryDom::new();
    let body = dom.body();
    if let Some(data) = dom.data_mut(body) {
        data.flow = Some(Rect::new(0.0, 0.0, 1200.0, 20_000.0));
    }
    let layout = dom
        .insert(
            body,
            ElementData::new("div")
                .with_class("layout")
                .with_flow(Rect::new(0.0, 300.0, 1200.0, 15_000.0)),
        )
        .unwrap();
    let aside = dom
        .insert(
            layout,
            ElementData::new("aside").with_flow(Rect::new(900.0, 320.0, 300.0, 600.0)),
        )
        .unwrap();
    let options = PinOptions::default()
        .with_container_selector(".layout")
        .with_padding(Padding::new(16.0, 16.0))
        .with_active_class("is-pinned");
    let engine = PinEngine::attach(&mut dom, aside, options).unwrap();
    (dom, engine)
}

fn bench_on_scroll(c: &mut Criterion) {
    let (mut dom, mut engine) = build_page();
    c.bench_function("pin_on_scroll_sweep", |b| {
        b.iter(|| {
            for step in 0..200 {
                dom.scroll_to(f64::from(step) * 100.0);
                engine.on_scroll(&mut dom);
            }
            black_box(engine.mode(&dom));
        });
    });
}

fn bench_recalculate(c: &mut Criterion) {
    let (mut dom, mut engine) = build_page();
    c.bench_function("pin_recalculate_limits", |b| {
        b.iter(|| {
            engine.recalculate_limits(&mut dom).unwrap();
            black_box(engine.limits().copied());
        });
    });
}

criterion_group!(pin_benches, bench_on_scroll, bench_recalculate);
criterion_main!(pin_benches);
