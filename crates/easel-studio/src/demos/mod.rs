//! The three demos hosted by the studio binary.

mod clock;
mod image;

pub use clock::ClockDemo;
pub use image::{ImageDemo, ImageVariant};
