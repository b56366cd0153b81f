//! Options accepted by the pin engine.
//!
//! Options arrive as the directive binding value, so they deserialize from
//! camelCase JSON. Every field is optional.

use anyhow::{Context as _, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Insets applied to the pin window boundaries, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub top: f64,
    pub bottom: f64,
}

impl Padding {
    #[inline]
    #[must_use]
    pub const fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }
}

/// Per-element pin configuration. Immutable once an engine is attached.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PinOptions {
    /// Pinning is disabled while the viewport is at most this wide.
    pub min_width: Option<f64>,
    /// Selector of the bounding ancestor. The body bounds the element when absent.
    pub container_selector: Option<String>,
    /// `null` is accepted and means no padding.
    #[serde(deserialize_with = "nullable_padding")]
    pub padding: Padding,
    /// Class present on the element while it is fixed or absolute.
    pub active_class: Option<String>,
}

fn nullable_padding<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Padding, D::Error> {
    Ok(Option::<Padding>::deserialize(deserializer)?.unwrap_or_default())
}

impl PinOptions {
    /// Parse a directive binding value. `null` yields the defaults.
    ///
    /// # Errors
    /// Fails when the value is not an object or a field has the wrong type.
    pub fn from_binding(value: &Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Self::deserialize(value).context("invalid pin options")
    }

    #[must_use]
    pub const fn with_min_width(mut self, min_width: f64) -> Self {
        self.min_width = Some(min_width);
        self
    }

    #[must_use]
    pub fn with_container_selector(mut self, selector: &str) -> Self {
        self.container_selector = Some(selector.to_owned());
        self
    }

    #[must_use]
    pub const fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    #[must_use]
    pub fn with_active_class(mut self, class: &str) -> Self {
        self.active_class = Some(class.to_owned());
        self
    }

    /// The breakpoint, if one is in effect. Zero counts as unset.
    #[must_use]
    pub fn breakpoint(&self) -> Option<f64> {
        self.min_width.filter(|width| *width > 0.0)
    }

    /// The container selector, if one is in effect. Blank counts as unset.
    #[must_use]
    pub fn container(&self) -> Option<&str> {
        self.container_selector
            .as_deref()
            .map(str::trim)
            .filter(|selector| !selector.is_empty())
    }

    /// The active class, if one is in effect. Empty counts as unset.
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active_class
            .as_deref()
            .filter(|class| !class.is_empty())
    }
}
