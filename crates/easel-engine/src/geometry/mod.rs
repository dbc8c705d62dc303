//! Vertex array generation.
//!
//! Every generator returns flat `f32` data ready for [`crate::buffer::BufferStore`]:
//! two floats per vertex, vertices in draw order.

mod circle;
mod rect;

pub use circle::{circle_points, fan_triangles, flatten};
pub use rect::{RECT_FLOATS, RECT_VERTICES, prepare_rect, rect_vertices};
