//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single demo window, and wires them to
//! the GPU layer. Frames are drawn on demand or on a fixed interval.

mod runtime;

pub use runtime::{RedrawPolicy, Runtime, RuntimeConfig, RuntimeCtx};
