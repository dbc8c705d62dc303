//! Time subsystem.
//!
//! Timer-driven demos redraw on an [`IntervalTimer`] instead of every frame.

mod interval;

pub use interval::IntervalTimer;
