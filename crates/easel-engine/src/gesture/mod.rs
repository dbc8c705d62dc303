//! Pan/zoom state driven by pointer drags and wheel steps.
//!
//! The coordinator is pure state: it returns the rectangle to draw, and the
//! caller regenerates and uploads geometry from it.

mod coordinator;

pub use coordinator::{GestureCoordinator, ZOOM_IN, ZOOM_OUT};
