//! Pin limits and the scroll-offset -> mode decision.

use crate::Padding;

/// How the element is currently positioned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PinMode {
    /// Normal flow, no positioning declarations.
    #[default]
    Normal,
    /// Held to the viewport while inside the pin window.
    Fixed,
    /// Parked at the bottom of the container once scrolled past it.
    Absolute,
}

impl PinMode {
    /// Whether the active class belongs on the element in this mode.
    #[inline]
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

/// Scroll offsets bounding the fixed state. The element is fixed while
/// `start < scroll < stop`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinWindow {
    pub start: f64,
    pub stop: f64,
}

/// Geometry derived from the element and its container, in document pixels.
/// Recomputed on resize/load, read on every scroll.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Limits {
    /// Scroll offset where pinning begins (padding.top already removed).
    pub from: f64,
    /// Scroll offset where pinning ends (padding.bottom already removed).
    pub to: f64,
    /// Bottom of the container's content box.
    pub end: f64,
    /// Top of the element's offset parent.
    pub parent_top: f64,
    pub padding: Padding,
}

impl Limits {
    /// The pin window. This is the only place padding is applied to the
    /// `from`/`to` limits at scroll time.
    #[inline]
    #[must_use]
    pub fn window(&self) -> PinWindow {
        PinWindow {
            start: self.from - self.padding.bottom,
            stop: self.to - self.padding.top,
        }
    }

    /// Whether an element of `element_height` can be pinned at all: it has to
    /// fit between the window start and the container end, and the window
    /// must not be empty (`to < from` when the container is too short).
    #[inline]
    #[must_use]
    pub fn fits(&self, element_height: f64) -> bool {
        let window = self.window();
        window.start + element_height <= self.end && window.start < window.stop
    }

    /// Mode for a scroll offset.
    #[must_use]
    pub fn resolve(&self, scroll: f64, element_height: f64) -> PinMode {
        if !self.fits(element_height) {
            return PinMode::Normal;
        }
        let window = self.window();
        if scroll > window.start && scroll < window.stop {
            PinMode::Fixed
        } else if scroll >= window.stop {
            PinMode::Absolute
        } else {
            PinMode::Normal
        }
    }

    /// `top` (relative to the offset parent) of the parked element. Chosen so
    /// the element sits exactly where the fixed element was at `scroll = stop`.
    #[inline]
    #[must_use]
    pub fn absolute_top(&self) -> f64 {
        self.window().stop - self.parent_top + self.padding.top
    }
}
