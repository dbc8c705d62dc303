use std::fmt;

use crate::coords::Vec2;

/// Keyboard key identifier.
///
/// Covers the keys the demos bind; anything else maps to `Unknown` with the
/// platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    Unknown(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Wheel movement as reported by the platform.
///
/// Positive `y` means the content should move down, i.e. the wheel turned
/// away from the user.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    Line { x: f32, y: f32 },
    Pixel { x: f32, y: f32 },
}

impl MouseWheelDelta {
    /// Vertical delta with browser sign: positive scrolls down.
    pub fn scroll_down(&self) -> f32 {
        match *self {
            MouseWheelDelta::Line { y, .. } | MouseWheelDelta::Pixel { y, .. } => -y,
        }
    }
}

/// Platform-agnostic input events emitted by the runtime.
///
/// Positions are in logical pixels with the origin at the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    ModifiersChanged(Modifiers),

    Key {
        key: Key,
        state: KeyState,
        repeat: bool,
    },

    PointerMoved(Vec2),

    PointerButton {
        button: MouseButton,
        state: MouseButtonState,
        position: Vec2,
    },

    MouseWheel(MouseWheelDelta),

    /// Pointer left the window surface.
    PointerLeft,

    Focused(bool),
}

/// Pointer gestures derived from raw input by [`super::DragTracker`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GestureInput {
    /// Pointer moved while the primary button is held.
    DragMove { start: Vec2, current: Vec2 },
    /// Primary button released after a press inside the window.
    DragEnd { start: Vec2, end: Vec2 },
    /// A drag ended without a release, e.g. on focus loss.
    DragCancel,
    /// One wheel step; positive zooms out.
    Wheel { delta_y: f32 },
}
