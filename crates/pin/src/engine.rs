//! The positioning engine: one instance per pinned element.

use crate::wrapper::{unwrap, wrap, wrapper_of};
use crate::{Limits, PinMode, PinOptions};
use anyhow::{Context as _, Result};
use core::fmt::Debug;
use log::{debug, trace, warn};
use pin_dom::{
    EventKind, EventTarget, HostDom, ListenerId, Position, SelectorList, StyleProperty,
    StyleValue, closest, parse_selector_list,
};

/// What a listener does when its event fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ListenerAction {
    /// Repositioning step only.
    Reposition,
    /// Limit recalculation only.
    Recalculate,
    /// Recalculation followed by repositioning.
    Update,
}

#[derive(Clone, Copy, Debug)]
struct Listener<N> {
    id: ListenerId,
    target: EventTarget<N>,
    kind: EventKind,
    action: ListenerAction,
    /// Removed after the first delivery.
    once: bool,
}

/// Where the bounding container comes from.
#[derive(Clone, Debug)]
enum ContainerQuery {
    /// No selector configured.
    Body,
    /// Nearest ancestor (or the element itself) matching the list.
    Closest(SelectorList),
    /// A selector the matcher cannot evaluate. Never resolves.
    Unsupported,
}

/// Pin state of one element.
///
/// The engine is host agnostic: every read and write goes through the
/// [`HostDom`] passed to each call. Events reach it through
/// [`PinEngine::handle_event`].
#[derive(Debug)]
pub struct PinEngine<N> {
    element: N,
    options: PinOptions,
    container: ContainerQuery,
    limits: Option<Limits>,
    disabled: bool,
    listeners: Vec<Listener<N>>,
}

impl<N: Copy + Eq + Debug> PinEngine<N> {
    /// Attach to `element`: register listeners on descendant images and the
    /// window, then compute the initial limits.
    ///
    /// A container selector outside the supported syntax is logged and
    /// treated like one that matches nothing: the element stays in flow.
    ///
    /// # Errors
    /// Fails when the host rejects the wrapper insertion. Nothing stays
    /// registered on failure.
    pub fn attach<D>(dom: &mut D, element: N, options: PinOptions) -> Result<Self>
    where
        D: HostDom<Node = N> + ?Sized,
    {
        let container = match options.container().map(parse_selector_list) {
            None => ContainerQuery::Body,
            Some(Ok(list)) => ContainerQuery::Closest(list),
            Some(Err(err)) => {
                warn!(target: "pin", "container selector ignored for {element:?}: {err:#}");
                ContainerQuery::Unsupported
            }
        };
        let mut engine = Self {
            element,
            options,
            container,
            limits: None,
            disabled: false,
            listeners: Vec::new(),
        };

        for image in dom.descendants_with_tag(element, "img") {
            engine.listen(
                dom,
                EventTarget::Node(image),
                EventKind::Load,
                ListenerAction::Recalculate,
                true,
            );
        }
        engine.listen(
            dom,
            EventTarget::Window,
            EventKind::Scroll,
            ListenerAction::Reposition,
            false,
        );
        engine.listen(
            dom,
            EventTarget::Window,
            EventKind::Resize,
            ListenerAction::Recalculate,
            false,
        );
        engine.listen(
            dom,
            EventTarget::Window,
            EventKind::Load,
            ListenerAction::Update,
            false,
        );

        if let Err(err) = engine.recalculate_limits(dom) {
            engine.release_listeners(dom);
            return Err(err).with_context(|| format!("cannot attach pin to {element:?}"));
        }
        debug!(target: "pin", "attached to {element:?} with {} listeners", engine.listeners.len());
        Ok(engine)
    }

    /// The managed element.
    #[must_use]
    pub const fn element(&self) -> N {
        self.element
    }

    #[must_use]
    pub const fn options(&self) -> &PinOptions {
        &self.options
    }

    /// Limits from the last recalculation. `None` while disabled or while no
    /// container matches.
    #[must_use]
    pub const fn limits(&self) -> Option<&Limits> {
        self.limits.as_ref()
    }

    /// Whether the viewport is at or below the configured breakpoint.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Handles of every listener currently registered by this engine.
    pub fn listener_ids(&self) -> impl Iterator<Item = ListenerId> + '_ {
        self.listeners.iter().map(|listener| listener.id)
    }

    /// Current mode, read back from the element's inline `position`.
    pub fn mode<D>(&self, dom: &D) -> PinMode
    where
        D: HostDom<Node = N> + ?Sized,
    {
        match dom.inline_style(self.element, StyleProperty::Position) {
            StyleValue::Position(Position::Fixed) => PinMode::Fixed,
            StyleValue::Position(Position::Absolute) => PinMode::Absolute,
            StyleValue::Unset | StyleValue::Px(_) | StyleValue::Position(_) => PinMode::Normal,
        }
    }

    /// Recompute limits, then reposition.
    ///
    /// # Errors
    /// Propagates host tree mutation failures.
    pub fn update<D>(&mut self, dom: &mut D) -> Result<()>
    where
        D: HostDom<Node = N> + ?Sized,
    {
        self.recalculate_limits(dom)?;
        self.on_scroll(dom);
        Ok(())
    }

    /// Deliver an event. Returns whether one of this engine's listeners
    /// matched `(target, kind)`.
    ///
    /// # Errors
    /// Propagates failures of the triggered recalculation.
    pub fn handle_event<D>(
        &mut self,
        dom: &mut D,
        target: EventTarget<N>,
        kind: EventKind,
    ) -> Result<bool>
    where
        D: HostDom<Node = N> + ?Sized,
    {
        let Some(index) = self
            .listeners
            .iter()
            .position(|listener| listener.target == target && listener.kind == kind)
        else {
            return Ok(false);
        };
        let Some(listener) = self.listeners.get(index).copied() else {
            return Ok(false);
        };
        if listener.once {
            self.listeners.remove(index);
            dom.remove_event_listener(listener.id);
        }
        trace!(target: "pin", "{kind} on {target:?} -> {:?}", listener.action);
        match listener.action {
            ListenerAction::Reposition => self.on_scroll(dom),
            ListenerAction::Recalculate => self.recalculate_limits(dom)?,
            ListenerAction::Update => self.update(dom)?,
        }
        Ok(true)
    }

    /// Recompute the limits from current geometry.
    ///
    /// Below the breakpoint, or when the container selector matches no
    /// ancestor, the element is returned to normal flow and left unwrapped.
    ///
    /// # Errors
    /// Propagates host tree mutation failures while (un)wrapping.
    pub fn recalculate_limits<D>(&mut self, dom: &mut D) -> Result<()>
    where
        D: HostDom<Node = N> + ?Sized,
    {
        let element = self.element;

        if let Some(breakpoint) = self.options.breakpoint() {
            let viewport = dom.viewport_width();
            if viewport <= breakpoint {
                if !self.disabled {
                    debug!(target: "pin", "viewport {viewport} <= {breakpoint}, pin disabled for {element:?}");
                }
                self.release_layout(dom)?;
                self.disabled = true;
                return Ok(());
            }
        }
        self.disabled = false;

        let resolved = match &self.container {
            ContainerQuery::Body => Some(dom.body()),
            ContainerQuery::Closest(list) => closest(&*dom, element, list),
            ContainerQuery::Unsupported => None,
        };
        let Some(container) = resolved else {
            debug!(
                target: "pin",
                "no container matching {:?} around {element:?}",
                self.options.container()
            );
            self.release_layout(dom)?;
            return Ok(());
        };

        let wrapper = wrapper_of(dom, element).map_or_else(|| wrap(dom, element), Ok)?;

        // The wrapper stays in flow, so this does not depend on the current mode.
        let offset = dom.offset(wrapper);
        let container_offset = dom.offset(container);
        let parent_top = dom
            .offset_parent(wrapper)
            .map_or(0.0, |parent| dom.offset(parent).y);

        let padding = self.options.padding;
        let container_height = dom.content_height(container);
        let element_height = dom.client_height(element);
        let top = if matches!(self.container, ContainerQuery::Closest(_)) {
            container_offset.y
        } else {
            offset.y
        };
        let limits = Limits {
            from: top - padding.top,
            to: container_offset.y + container_height - element_height - padding.bottom,
            end: container_offset.y + container_height,
            parent_top,
            padding,
        };
        trace!(target: "pin", "limits for {element:?}: {limits:?}");
        self.limits = Some(limits);

        let width = dom.client_width(element);
        dom.set_style(element, StyleProperty::Width, StyleValue::Px(width));
        dom.set_style(wrapper, StyleProperty::Height, StyleValue::Px(element_height));
        Ok(())
    }

    /// Repositioning step: pick the mode for the current scroll offset and
    /// apply its declarations. Reads the scroll offset from the host on
    /// every call.
    pub fn on_scroll<D>(&mut self, dom: &mut D)
    where
        D: HostDom<Node = N> + ?Sized,
    {
        if self.disabled {
            return;
        }
        let Some(limits) = self.limits else {
            return;
        };
        let element = self.element;
        let scroll = dom.scroll_top();
        let mode = limits.resolve(scroll, dom.client_height(element));

        match mode {
            PinMode::Fixed => {
                if dom.computed_position(element) != Position::Fixed {
                    let left = dom.offset(element).x;
                    dom.set_style(element, StyleProperty::Left, StyleValue::Px(left));
                    dom.set_style(
                        element,
                        StyleProperty::Top,
                        StyleValue::Px(limits.padding.top),
                    );
                    dom.set_style(
                        element,
                        StyleProperty::Position,
                        StyleValue::Position(Position::Fixed),
                    );
                }
            }
            PinMode::Absolute => {
                dom.set_style(element, StyleProperty::Left, StyleValue::Unset);
                dom.set_style(
                    element,
                    StyleProperty::Top,
                    StyleValue::Px(limits.absolute_top()),
                );
                dom.set_style(
                    element,
                    StyleProperty::Position,
                    StyleValue::Position(Position::Absolute),
                );
            }
            PinMode::Normal => clear_position(dom, element),
        }
        self.set_active(dom, mode.is_active());
    }

    /// Detach: release every listener, unwrap the element and clear the
    /// declarations the engine wrote.
    ///
    /// # Errors
    /// Propagates host tree mutation failures while unwrapping. Listeners are
    /// released before unwrapping, so they are gone even on failure.
    pub fn dispose<D>(mut self, dom: &mut D) -> Result<()>
    where
        D: HostDom<Node = N> + ?Sized,
    {
        self.release_listeners(dom);
        self.release_layout(dom)?;
        debug!(target: "pin", "disposed pin on {:?}", self.element);
        Ok(())
    }

    fn listen<D>(
        &mut self,
        dom: &mut D,
        target: EventTarget<N>,
        kind: EventKind,
        action: ListenerAction,
        once: bool,
    ) where
        D: HostDom<Node = N> + ?Sized,
    {
        let id = dom.add_event_listener(target, kind);
        self.listeners.push(Listener {
            id,
            target,
            kind,
            action,
            once,
        });
    }

    fn release_listeners<D>(&mut self, dom: &mut D)
    where
        D: HostDom<Node = N> + ?Sized,
    {
        for listener in self.listeners.drain(..) {
            dom.remove_event_listener(listener.id);
        }
    }

    /// Back to normal flow: unwrap, clear width and position, drop the
    /// active class and the limits.
    fn release_layout<D>(&mut self, dom: &mut D) -> Result<()>
    where
        D: HostDom<Node = N> + ?Sized,
    {
        let element = self.element;
        if let Some(wrapper) = wrapper_of(dom, element) {
            unwrap(dom, wrapper)?;
        }
        dom.set_style(element, StyleProperty::Width, StyleValue::Unset);
        clear_position(dom, element);
        self.set_active(dom, false);
        self.limits = None;
        Ok(())
    }

    fn set_active<D>(&self, dom: &mut D, active: bool)
    where
        D: HostDom<Node = N> + ?Sized,
    {
        if let Some(class) = self.options.active() {
            if active {
                dom.add_class(self.element, class);
            } else {
                dom.remove_class(self.element, class);
            }
        }
    }
}

fn clear_position<D: HostDom + ?Sized>(dom: &mut D, element: D::Node) {
    dom.set_style(element, StyleProperty::Left, StyleValue::Unset);
    dom.set_style(element, StyleProperty::Top, StyleValue::Unset);
    dom.set_style(element, StyleProperty::Position, StyleValue::Unset);
}
