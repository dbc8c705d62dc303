//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop)
//! and the demos, and the contexts handed to each callback.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{EventCtx, FrameCtx, WindowCtx};
