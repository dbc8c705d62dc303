//! Content placement inside a viewport.

mod aspect;

pub use aspect::{Fit, letterbox, letterbox_fit};
