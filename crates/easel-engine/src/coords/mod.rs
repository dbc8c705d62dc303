//! Coordinate types and pixel <-> clip-space conversion.
//!
//! Two spaces are in play:
//! - pixel space: `0..W` x `0..H` of the rendering surface, origin top-left
//! - clip space: `-1..1` per axis, as consumed by the rasterizer
//!
//! Conversions are plain functions over `f32`; nothing in here holds state.
//! Clip coordinates produced from pixel input keep the pixel y direction
//! (pixel 0 maps to -1), so image shaders flip y once in the vertex stage.

mod clip;
mod color;
mod rect;
mod vec2;
mod viewport;

pub use clip::{drag_delta, pixel_rect_to_unit, shift_positive, to_clip};
pub use color::ColorRgba;
pub use rect::Rectangle;
pub use vec2::Vec2;
pub use viewport::Viewport;
