//! Per-frame rendering handles.
//!
//! Convention:
//! - geometry reaching the GPU is already in clip space
//! - passes are opened per draw group; programs and buffers are bound by the caller

mod ctx;

pub use ctx::{RenderCtx, RenderTarget};
