//! Sizes, insets, and the sentinel values used for size negotiation.
//!
//! Every control carries explicit `min`, `pref`, and `max` width and height
//! values. An explicit value always wins; [`USE_COMPUTED_SIZE`] hands the
//! question to the installed skin, and [`USE_PREF_SIZE`] (valid for `min` and
//! `max` only) resolves to the preferred size.

use serde::{Deserialize, Serialize};

/// Ask the installed skin to compute the size.
pub const USE_COMPUTED_SIZE: f64 = -1.0;

/// Use the preferred size as the minimum or maximum.
pub const USE_PREF_SIZE: f64 = f64::NEG_INFINITY;

/// A width and height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// The width.
    pub width: f64,
    /// The height.
    pub height: f64,
}

impl Size {
    /// A zero size.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Create a new size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Space reserved around content.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Insets {
    /// Top inset.
    pub top: f64,
    /// Right inset.
    pub right: f64,
    /// Bottom inset.
    pub bottom: f64,
    /// Left inset.
    pub left: f64,
}

impl Insets {
    /// No insets.
    pub const ZERO: Self = Self::uniform(0.0);

    /// Create insets from each side.
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The same inset on every side.
    pub const fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// `vertical` on top and bottom, `horizontal` on left and right.
    pub const fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    /// Left plus right.
    #[inline]
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// Top plus bottom.
    #[inline]
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Resolve an explicit `min` or `max` value.
///
/// `computed` runs only for [`USE_COMPUTED_SIZE`] and `pref` only for
/// [`USE_PREF_SIZE`].
pub(crate) fn resolve_bound(
    explicit: f64,
    computed: impl FnOnce() -> f64,
    pref: impl FnOnce() -> f64,
) -> f64 {
    if explicit == USE_COMPUTED_SIZE {
        computed()
    } else if explicit == USE_PREF_SIZE {
        pref()
    } else {
        explicit
    }
}

/// Resolve an explicit `pref` value.
pub(crate) fn resolve_pref(explicit: f64, computed: impl FnOnce() -> f64) -> f64 {
    if explicit == USE_COMPUTED_SIZE {
        computed()
    } else {
        explicit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insets_sums() {
        let insets = Insets::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(insets.horizontal(), 6.0);
        assert_eq!(insets.vertical(), 4.0);
        assert_eq!(Insets::symmetric(4.0, 8.0).horizontal(), 16.0);
    }

    #[test]
    fn test_resolve_bound() {
        assert_eq!(resolve_bound(12.0, || 1.0, || 2.0), 12.0);
        assert_eq!(resolve_bound(USE_COMPUTED_SIZE, || 1.0, || 2.0), 1.0);
        assert_eq!(resolve_bound(USE_PREF_SIZE, || 1.0, || 2.0), 2.0);
    }

    #[test]
    fn test_resolve_pref() {
        assert_eq!(resolve_pref(500.0, || 1.0), 500.0);
        assert_eq!(resolve_pref(USE_COMPUTED_SIZE, || 1.0), 1.0);
    }
}
