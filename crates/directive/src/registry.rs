//! Element identity -> attached engine.

use anyhow::Result;
use core::fmt::Debug;
use core::hash::Hash;
use pin::{PinEngine, PinOptions};
use pin_dom::{EventKind, EventTarget, HostDom};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, warn};

/// Handle returned for an attached element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PinHandle<N> {
    element: N,
}

impl<N: Copy> PinHandle<N> {
    /// The pinned element.
    #[inline]
    #[must_use]
    pub const fn element(&self) -> N {
        self.element
    }
}

/// Every engine attached through the adapter, keyed by element.
///
/// At most one engine exists per element; attaching twice never leaves two
/// sets of listeners or two wrappers behind.
#[derive(Debug)]
pub struct PinRegistry<N> {
    engines: HashMap<N, PinEngine<N>>,
}

impl<N> Default for PinRegistry<N> {
    fn default() -> Self {
        Self {
            engines: HashMap::new(),
        }
    }
}

impl<N: Copy + Eq + Hash + Debug> PinRegistry<N> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an engine to `element`.
    ///
    /// An element that is already attached with the same options is updated
    /// in place. Different options replace the engine: the old one is
    /// disposed before the new one attaches.
    ///
    /// # Errors
    /// Propagates attach, update and dispose failures. A failed attach leaves
    /// the element unregistered.
    pub fn create<D>(
        &mut self,
        dom: &mut D,
        element: N,
        options: PinOptions,
    ) -> Result<PinHandle<N>>
    where
        D: HostDom<Node = N> + ?Sized,
    {
        match self.engines.entry(element) {
            Entry::Occupied(mut entry) if entry.get().options() == &options => {
                debug!(?element, "pin already attached, updating");
                entry.get_mut().update(dom)?;
            }
            Entry::Occupied(entry) => {
                debug!(?element, "pin options changed, re-attaching");
                let (_, previous) = entry.remove_entry();
                previous.dispose(dom)?;
                let engine = PinEngine::attach(dom, element, options)?;
                self.engines.insert(element, engine);
            }
            Entry::Vacant(entry) => {
                entry.insert(PinEngine::attach(dom, element, options)?);
            }
        }
        Ok(PinHandle { element })
    }

    /// Re-run `update()` on the engine of `element`. Returns whether one was
    /// attached.
    ///
    /// # Errors
    /// Propagates the engine's update failure.
    pub fn update<D>(&mut self, dom: &mut D, element: N) -> Result<bool>
    where
        D: HostDom<Node = N> + ?Sized,
    {
        let Some(engine) = self.engines.get_mut(&element) else {
            return Ok(false);
        };
        engine.update(dom)?;
        Ok(true)
    }

    /// Detach and drop the engine of `element`. Returns whether one was
    /// attached.
    ///
    /// # Errors
    /// Propagates the engine's dispose failure. The engine is unregistered
    /// either way.
    pub fn dispose<D>(&mut self, dom: &mut D, element: N) -> Result<bool>
    where
        D: HostDom<Node = N> + ?Sized,
    {
        let Some(engine) = self.engines.remove(&element) else {
            return Ok(false);
        };
        engine.dispose(dom)?;
        Ok(true)
    }

    /// Deliver a host event to every engine. Returns how many engines owned a
    /// listener for it. A failing engine is logged and skipped.
    pub fn dispatch<D>(&mut self, dom: &mut D, target: EventTarget<N>, kind: EventKind) -> usize
    where
        D: HostDom<Node = N> + ?Sized,
    {
        let mut handled = 0usize;
        for (element, engine) in &mut self.engines {
            match engine.handle_event(dom, target, kind) {
                Ok(true) => handled = handled.saturating_add(1),
                Ok(false) => {}
                Err(err) => warn!(?element, %kind, "pin event handling failed: {err:#}"),
            }
        }
        handled
    }

    #[must_use]
    pub fn get(&self, element: N) -> Option<&PinEngine<N>> {
        self.engines.get(&element)
    }

    #[must_use]
    pub fn contains(&self, element: N) -> bool {
        self.engines.contains_key(&element)
    }

    /// Attached elements, in no particular order.
    pub fn elements(&self) -> impl Iterator<Item = N> + '_ {
        self.engines.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}
