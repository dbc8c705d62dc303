//! Easel engine crate.
//!
//! Shared rendering utilities for small single-pass wgpu demos: shader
//! programs with reflected interfaces, vertex/uniform buffers, clip-space
//! math, aspect-preserving layout, pan/zoom gestures and filter modes,
//! plus the window runtime that drives them.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod error;
pub mod coords;
pub mod geometry;
pub mod layout;
pub mod gesture;
pub mod mode;
pub mod program;
pub mod buffer;
pub mod texture;
pub mod render;
pub mod session;

pub use error::{EngineError, EngineResult};
