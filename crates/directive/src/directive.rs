//! Directive hooks: `inserted`, `component_updated`, `unbind`.

use crate::{DirectiveConfig, PinHandle, PinRegistry};
use anyhow::Result;
use core::fmt::Debug;
use core::hash::Hash;
use pin::PinOptions;
use pin_dom::{EventKind, EventTarget, HostDom};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info_span, trace, warn};

/// The `pin` directive.
///
/// The host calls the hooks as the framework mounts, re-renders and unmounts
/// bound elements, forwards window/element events to [`Self::dispatch`] and
/// calls [`Self::tick`] from its event loop so deferred updates run.
#[derive(Debug)]
pub struct PinDirective<N> {
    config: DirectiveConfig,
    registry: PinRegistry<N>,
    /// Element -> when its deferred update is due, with the options from the
    /// latest binding value.
    pending: HashMap<N, (Instant, PinOptions)>,
}

impl<N> Default for PinDirective<N> {
    fn default() -> Self {
        Self {
            config: DirectiveConfig::default(),
            registry: PinRegistry::default(),
            pending: HashMap::new(),
        }
    }
}

impl<N: Copy + Eq + Hash + Debug> PinDirective<N> {
    /// Name the directive is registered under.
    pub const NAME: &'static str = "pin";

    #[must_use]
    pub fn new(config: DirectiveConfig) -> Self {
        Self {
            config,
            registry: PinRegistry::new(),
            pending: HashMap::new(),
        }
    }

    /// Directive configured from the environment, see
    /// [`DirectiveConfig::from_env`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(DirectiveConfig::from_env())
    }

    #[must_use]
    pub const fn config(&self) -> &DirectiveConfig {
        &self.config
    }

    #[must_use]
    pub const fn registry(&self) -> &PinRegistry<N> {
        &self.registry
    }

    /// Element inserted: parse the binding value and attach.
    ///
    /// # Errors
    /// Fails on a malformed binding value or when attaching fails.
    pub fn inserted<D>(&mut self, dom: &mut D, element: N, binding: &Value) -> Result<PinHandle<N>>
    where
        D: HostDom<Node = N> + ?Sized,
    {
        let _span = info_span!("pin.inserted", ?element).entered();
        let options = PinOptions::from_binding(binding)?;
        self.registry.create(dom, element, options)
    }

    /// Component re-rendered: parse the fresh binding value and schedule a
    /// re-create with it once the configured delay has passed. Unchanged
    /// options only update the engine; changed options re-attach it. A later
    /// call for the same element replaces both the deadline and the options.
    /// Returns whether an update was scheduled.
    ///
    /// # Errors
    /// Fails on a malformed binding value. Nothing is scheduled then.
    pub fn component_updated(&mut self, element: N, binding: &Value, now: Instant) -> Result<bool> {
        if !self.registry.contains(element) {
            trace!(?element, "component updated without an attached pin");
            return Ok(false);
        }
        let options = PinOptions::from_binding(binding)?;
        let due = now
            .checked_add(self.config.update_delay())
            .unwrap_or(now);
        self.pending.insert(element, (due, options));
        Ok(true)
    }

    /// Whether `element` has a deferred update waiting.
    #[must_use]
    pub fn is_pending(&self, element: N) -> bool {
        self.pending.contains_key(&element)
    }

    /// Earliest pending deadline, for hosts that sleep until the next tick.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|&(deadline, _)| deadline).min()
    }

    /// Run every deferred update due at `now`. Returns how many ran. A
    /// failing update is logged and does not stop the others.
    pub fn tick<D>(&mut self, dom: &mut D, now: Instant) -> usize
    where
        D: HostDom<Node = N> + ?Sized,
    {
        let due: Vec<N> = self
            .pending
            .iter()
            .filter(|&(_, &(deadline, _))| deadline <= now)
            .map(|(&element, _)| element)
            .collect();
        if due.is_empty() {
            return 0;
        }
        let _span = info_span!("pin.tick", due = due.len()).entered();
        let mut ran = 0usize;
        for element in due {
            let Some((_, options)) = self.pending.remove(&element) else {
                continue;
            };
            if !self.registry.contains(element) {
                debug!(?element, "deferred update for a detached pin");
                continue;
            }
            match self.registry.create(dom, element, options) {
                Ok(_) => ran = ran.saturating_add(1),
                Err(err) => warn!(?element, "deferred pin update failed: {err:#}"),
            }
        }
        ran
    }

    /// Forward a host event to the attached engines.
    pub fn dispatch<D>(&mut self, dom: &mut D, target: EventTarget<N>, kind: EventKind) -> usize
    where
        D: HostDom<Node = N> + ?Sized,
    {
        self.registry.dispatch(dom, target, kind)
    }

    /// Element removed: drop any pending update and dispose the engine.
    /// Returns whether an engine was attached.
    ///
    /// # Errors
    /// Propagates the engine's dispose failure.
    pub fn unbind<D>(&mut self, dom: &mut D, element: N) -> Result<bool>
    where
        D: HostDom<Node = N> + ?Sized,
    {
        let _span = info_span!("pin.unbind", ?element).entered();
        self.pending.remove(&element);
        self.registry.dispose(dom, element)
    }
}
