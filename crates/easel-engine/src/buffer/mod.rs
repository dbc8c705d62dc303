//! Vertex data on the GPU.
//!
//! [`BufferStore`] owns creation and disposal; [`AttributeBinder`] attaches a
//! buffer to a program attribute inside a render pass.

mod binder;
mod store;

pub use binder::AttributeBinder;
pub use store::{BufferId, BufferKind, BufferStore, GpuBuffer, UsageHint};
