//! Runtime configuration of the directive adapter.
//!
//! Constructed programmatically or loaded from the environment.

use core::time::Duration;
use std::env;

/// Delay before a deferred update when nothing else is configured.
pub const DEFAULT_UPDATE_DELAY_MS: u64 = 500;

/// Settings for [`crate::PinDirective`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirectiveConfig {
    /// Milliseconds between a component update and the pin update it
    /// triggers. Zero runs it on the next tick.
    pub update_delay_ms: u64,
}

impl DirectiveConfig {
    #[inline]
    #[must_use]
    pub const fn new(update_delay_ms: u64) -> Self {
        Self { update_delay_ms }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `PIN_UPDATE_DELAY_MS` (default: 500). Values that do not parse
    /// as a millisecond count fall back to the default.
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(parse_delay(env::var("PIN_UPDATE_DELAY_MS").ok().as_deref()))
    }

    /// The update delay as a `Duration`.
    #[inline]
    #[must_use]
    pub const fn update_delay(&self) -> Duration {
        Duration::from_millis(self.update_delay_ms)
    }
}

impl Default for DirectiveConfig {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_DELAY_MS)
    }
}

fn parse_delay(raw: Option<&str>) -> u64 {
    raw.and_then(|val| val.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_UPDATE_DELAY_MS)
}
