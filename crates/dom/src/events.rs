//! Event targets and listener handles.
//!
//! The host owns the real callbacks. The engine only keeps the `ListenerId`
//! it was given and is told about events through `(target, kind)` pairs, so
//! no closure ever needs to borrow the engine and the DOM at the same time.

use core::fmt;

/// Events the pin engine subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Scroll,
    Resize,
    Load,
}

impl EventKind {
    /// DOM event type name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Resize => "resize",
            Self::Load => "load",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a listener is attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventTarget<N> {
    /// The global `window`.
    Window,
    /// A specific node.
    Node(N),
}

/// Opaque handle returned by the host for a registered listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);
