//! Inline style properties touched by the pin engine.

use core::fmt;

/// CSS `position` keyword.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl Position {
    /// Whether this value makes the element a positioned box (and therefore
    /// a candidate offset parent).
    #[inline]
    #[must_use]
    pub const fn is_positioned(self) -> bool {
        !matches!(self, Self::Static)
    }

    /// CSS keyword text.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Relative => "relative",
            Self::Absolute => "absolute",
            Self::Fixed => "fixed",
            Self::Sticky => "sticky",
        }
    }
}

/// The subset of inline style properties the engine writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    Width,
    Height,
    Left,
    Top,
    Position,
}

impl StyleProperty {
    /// CSS property name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Height => "height",
            Self::Left => "left",
            Self::Top => "top",
            Self::Position => "position",
        }
    }
}

/// An inline style value. `Unset` corresponds to assigning the empty string,
/// which removes the declaration.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum StyleValue {
    #[default]
    Unset,
    Px(f64),
    Position(Position),
}

impl StyleValue {
    /// Pixel value if this is a length.
    #[inline]
    #[must_use]
    pub const fn px(self) -> Option<f64> {
        match self {
            Self::Px(value) => Some(value),
            Self::Unset | Self::Position(_) => None,
        }
    }

    /// Whether the declaration is absent.
    #[inline]
    #[must_use]
    pub const fn is_unset(self) -> bool {
        matches!(self, Self::Unset)
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => Ok(()),
            Self::Px(value) => write!(f, "{value}px"),
            Self::Position(position) => f.write_str(position.as_str()),
        }
    }
}
