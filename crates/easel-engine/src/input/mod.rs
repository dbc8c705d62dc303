//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! [`translate`] maps winit events into [`InputEvent`]s; [`DragTracker`]
//! derives drag and wheel gestures from them.

mod drag;
mod state;
pub(crate) mod translate;
mod types;

pub use drag::DragTracker;
pub use state::InputState;
pub use types::{
    GestureInput, InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState,
    MouseWheelDelta,
};
