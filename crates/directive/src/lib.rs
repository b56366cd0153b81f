//! Framework glue for the pin engine.
//!
//! [`PinRegistry`] maps element identity to its attached engine and routes
//! host events to it. [`PinDirective`] binds that registry to a UI
//! framework's directive hooks, including the deferred update that follows a
//! component re-render.

#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::assertions_on_result_states,
        clippy::float_cmp,
        reason = "tests compare exact layout values and fail loudly"
    )
)]

pub mod config;
pub mod directive;
pub mod registry;

pub use config::{DEFAULT_UPDATE_DELAY_MS, DirectiveConfig};
pub use directive::PinDirective;
pub use registry::{PinHandle, PinRegistry};
