//! Input events routed to a control's skin.
//!
//! Coordinates are relative to the top-left corner of the control's content
//! area, after padding. Virtualized views also exclude the table header.

/// A key with behavior attached by at least one skin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Escape,
    Space,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Backspace,
    Delete,
    Tab,
}

/// An event delivered through
/// [`SkinRegistry::dispatch`](crate::registry::SkinRegistry::dispatch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary button went down.
    MousePressed {
        /// Horizontal position.
        x: f64,
        /// Vertical position.
        y: f64,
    },
    /// Primary button went up.
    MouseReleased {
        /// Horizontal position.
        x: f64,
        /// Vertical position.
        y: f64,
    },
    /// A key went down.
    KeyPressed(Key),
    /// A character was typed.
    KeyTyped(char),
}
