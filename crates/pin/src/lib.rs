//! Scroll-driven element pinning.
//!
//! A [`PinEngine`] keeps one element inside its bounding container while the
//! page scrolls. Within the pin window the element is `position: fixed`;
//! past it the element is parked `position: absolute` at the bottom of the
//! container; otherwise it stays in normal flow. A `div.pin-wrapper`
//! placeholder holds the element's slot in flow while it is pinned.
//!
//! All page access goes through [`pin_dom::HostDom`].

#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::assertions_on_result_states,
        clippy::float_cmp,
        reason = "tests compare exact layout values and fail loudly"
    )
)]

pub mod engine;
pub mod limits;
pub mod options;
pub mod wrapper;

pub use engine::PinEngine;
pub use limits::{Limits, PinMode, PinWindow};
pub use options::{Padding, PinOptions};
pub use wrapper::{WRAPPER_CLASS, wrapper_of};
