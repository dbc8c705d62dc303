use crate::input::{GestureInput, InputEvent};

use super::ctx::{EventCtx, FrameCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by the demos.
///
/// Nothing is redrawn implicitly: a callback that changes what should be on
/// screen calls [`EventCtx::request_redraw`], and the drawing itself happens
/// in [`on_frame`](Self::on_frame).
pub trait App {
    /// Called once the window and GPU exist.
    fn on_start(&mut self, ctx: &mut EventCtx<'_, '_>) -> AppControl {
        ctx.request_redraw();
        AppControl::Continue
    }

    /// Called for every translated input event.
    fn on_input(&mut self, ctx: &mut EventCtx<'_, '_>, event: &InputEvent) -> AppControl {
        let _ = (ctx, event);
        AppControl::Continue
    }

    /// Called for drag and wheel gestures.
    fn on_gesture(&mut self, ctx: &mut EventCtx<'_, '_>, gesture: GestureInput) -> AppControl {
        let _ = (ctx, gesture);
        AppControl::Continue
    }

    /// Called on each tick of an interval redraw policy.
    fn on_tick(&mut self, ctx: &mut EventCtx<'_, '_>) -> AppControl {
        ctx.request_redraw();
        AppControl::Continue
    }

    /// While this returns `true` the runtime wakes periodically and calls
    /// [`on_poll`](Self::on_poll), e.g. to collect background work.
    fn needs_poll(&self) -> bool {
        false
    }

    fn on_poll(&mut self, ctx: &mut EventCtx<'_, '_>) -> AppControl {
        let _ = ctx;
        AppControl::Continue
    }

    /// Draws one frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
